//! The scheduler layer: the public surface the frontend computes against.
//!
//! A scheduler takes circuit operations over opaque [WireId] handles,
//! routes them through the engine / gate keeper / wire keeper, and hands
//! back new handles. Four variants implement the same traits:
//!
//! - [plaintext::PlaintextScheduler] — single party, no crypto, for tests;
//! - [network_plaintext::NetworkPlaintextScheduler] — multi-party but
//!   cleartext, for validating protocol plumbing;
//! - [eager::EagerScheduler] — every non-free operation pays its roundtrip
//!   immediately;
//! - [lazy::LazyScheduler] — defers gates into levels and batch-executes
//!   them, the production configuration.

use anyhow::Result;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::channel_utils::PartyId;

pub mod eager;
pub mod gate_keeper;
pub mod keeper;
pub mod lazy;
pub mod network_plaintext;
pub mod plaintext;
pub mod wire_keeper;

/// Marker for wires carrying XOR-shared bits.
pub enum Boolean {}

/// Marker for wires carrying additively shared 64-bit words.
pub enum Arithmetic {}

/// Opaque handle onto a value produced somewhere in the circuit.
///
/// The id indexes the wire keeper's arena for the given family; whether the
/// wire is scalar or batched is determined by which operation created it.
pub struct WireId<T> {
    id: u64,
    _family: PhantomData<T>,
}

impl<T> WireId<T> {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            _family: PhantomData,
        }
    }

    pub(crate) fn raw(&self) -> u64 {
        self.id
    }
}

impl<T> Clone for WireId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for WireId<T> {}

impl<T> PartialEq for WireId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for WireId<T> {}

impl<T> Hash for WireId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for WireId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WireId({})", self.id)
    }
}

/// The boolean scheduler surface.
///
/// Every operation that returns a wire hands the caller a counted handle;
/// the caller owes a matching `decrease_reference_count*` when it drops it.
/// All parties must submit exactly the same circuit in the same order.
pub trait Scheduler {
    // ---- input processing ----

    /// Private input bit owned by `party`. Other parties' `v` is ignored.
    fn private_boolean_input(&mut self, v: bool, party: PartyId) -> Result<WireId<Boolean>>;
    fn private_boolean_input_batch(
        &mut self,
        v: &[bool],
        party: PartyId,
    ) -> Result<WireId<Boolean>>;
    /// Public input bit, identical at every party.
    fn public_boolean_input(&mut self, v: bool) -> Result<WireId<Boolean>>;
    fn public_boolean_input_batch(&mut self, v: &[bool]) -> Result<WireId<Boolean>>;
    /// Rebuild a wire from a share previously produced by
    /// [Self::extract_boolean_secret_share].
    fn recover_boolean_wire(&mut self, share: bool) -> Result<WireId<Boolean>>;
    fn recover_boolean_wire_batch(&mut self, shares: &[bool]) -> Result<WireId<Boolean>>;

    // ---- output processing ----

    /// Wire that will hold the opened value at `party` (dummy elsewhere).
    fn open_boolean_value_to_party(
        &mut self,
        src: WireId<Boolean>,
        party: PartyId,
    ) -> Result<WireId<Boolean>>;
    fn open_boolean_value_to_party_batch(
        &mut self,
        src: WireId<Boolean>,
        party: PartyId,
    ) -> Result<WireId<Boolean>>;
    /// This party's share of the wire, for storage elsewhere.
    fn extract_boolean_secret_share(&mut self, id: WireId<Boolean>) -> Result<bool>;
    fn extract_boolean_secret_share_batch(&mut self, id: WireId<Boolean>) -> Result<Vec<bool>>;
    /// The raw value on the wire (plaintext for public/opened wires).
    fn get_boolean_value(&mut self, id: WireId<Boolean>) -> Result<bool>;
    fn get_boolean_value_batch(&mut self, id: WireId<Boolean>) -> Result<Vec<bool>>;

    // ---- AND gates ----

    fn private_and_private(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>>;
    fn private_and_private_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>>;
    fn private_and_public(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>>;
    fn private_and_public_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>>;
    fn public_and_public(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>>;
    fn public_and_public_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>>;

    // ---- composite AND gates ----

    /// AND one left bit against every right bit, one output per right.
    fn private_and_private_composite(
        &mut self,
        left: WireId<Boolean>,
        rights: &[WireId<Boolean>],
    ) -> Result<Vec<WireId<Boolean>>>;
    fn private_and_private_composite_batch(
        &mut self,
        left: WireId<Boolean>,
        rights: &[WireId<Boolean>],
    ) -> Result<Vec<WireId<Boolean>>>;
    fn private_and_public_composite(
        &mut self,
        left: WireId<Boolean>,
        rights: &[WireId<Boolean>],
    ) -> Result<Vec<WireId<Boolean>>>;
    fn private_and_public_composite_batch(
        &mut self,
        left: WireId<Boolean>,
        rights: &[WireId<Boolean>],
    ) -> Result<Vec<WireId<Boolean>>>;
    fn public_and_public_composite(
        &mut self,
        left: WireId<Boolean>,
        rights: &[WireId<Boolean>],
    ) -> Result<Vec<WireId<Boolean>>>;
    fn public_and_public_composite_batch(
        &mut self,
        left: WireId<Boolean>,
        rights: &[WireId<Boolean>],
    ) -> Result<Vec<WireId<Boolean>>>;

    // ---- XOR gates ----

    fn private_xor_private(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>>;
    fn private_xor_private_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>>;
    fn private_xor_public(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>>;
    fn private_xor_public_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>>;
    fn public_xor_public(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>>;
    fn public_xor_public_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>>;

    // ---- NOT gates ----

    fn not_private(&mut self, src: WireId<Boolean>) -> Result<WireId<Boolean>>;
    fn not_private_batch(&mut self, src: WireId<Boolean>) -> Result<WireId<Boolean>>;
    fn not_public(&mut self, src: WireId<Boolean>) -> Result<WireId<Boolean>>;
    fn not_public_batch(&mut self, src: WireId<Boolean>) -> Result<WireId<Boolean>>;

    // ---- wire management ----

    fn increase_reference_count(&mut self, id: WireId<Boolean>) -> Result<()>;
    fn increase_reference_count_batch(&mut self, id: WireId<Boolean>) -> Result<()>;
    fn decrease_reference_count(&mut self, id: WireId<Boolean>) -> Result<()>;
    fn decrease_reference_count_batch(&mut self, id: WireId<Boolean>) -> Result<()>;

    // ---- rebatching ----

    /// Band a number of batches into one batch.
    fn batching_up(&mut self, srcs: &[WireId<Boolean>]) -> Result<WireId<Boolean>>;
    /// Decompose a batch into smaller batches of the given sizes.
    fn unbatching(
        &mut self,
        src: WireId<Boolean>,
        strategy: &[u32],
    ) -> Result<Vec<WireId<Boolean>>>;

    // ---- telemetry ----

    /// (sent, received) bytes, online plus offline.
    fn traffic_statistics(&self) -> (u64, u64);
    /// (non-free, free) gates executed. The non-free count is the single
    /// number to look at for cost estimation.
    fn gate_statistics(&self) -> (u64, u64);
    /// (allocated, deallocated) wires; the difference is the live count.
    fn wire_statistics(&self) -> (u64, u64);
    /// Expected batch size of a batch wire.
    fn batch_size_of(&self, id: WireId<Boolean>) -> Result<usize>;
}

/// The arithmetic extension of the scheduler surface: additive shares mod
/// 2^64. Mirrors the boolean surface operation for operation.
pub trait ArithmeticScheduler: Scheduler {
    // ---- input processing ----

    fn private_integer_input(&mut self, v: u64, party: PartyId) -> Result<WireId<Arithmetic>>;
    fn private_integer_input_batch(
        &mut self,
        v: &[u64],
        party: PartyId,
    ) -> Result<WireId<Arithmetic>>;
    fn public_integer_input(&mut self, v: u64) -> Result<WireId<Arithmetic>>;
    fn public_integer_input_batch(&mut self, v: &[u64]) -> Result<WireId<Arithmetic>>;
    fn recover_integer_wire(&mut self, share: u64) -> Result<WireId<Arithmetic>>;
    fn recover_integer_wire_batch(&mut self, shares: &[u64]) -> Result<WireId<Arithmetic>>;

    // ---- output processing ----

    fn open_integer_value_to_party(
        &mut self,
        src: WireId<Arithmetic>,
        party: PartyId,
    ) -> Result<WireId<Arithmetic>>;
    fn open_integer_value_to_party_batch(
        &mut self,
        src: WireId<Arithmetic>,
        party: PartyId,
    ) -> Result<WireId<Arithmetic>>;
    fn extract_integer_secret_share(&mut self, id: WireId<Arithmetic>) -> Result<u64>;
    fn extract_integer_secret_share_batch(&mut self, id: WireId<Arithmetic>) -> Result<Vec<u64>>;
    fn get_integer_value(&mut self, id: WireId<Arithmetic>) -> Result<u64>;
    fn get_integer_value_batch(&mut self, id: WireId<Arithmetic>) -> Result<Vec<u64>>;

    // ---- Plus gates ----

    fn private_plus_private(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>>;
    fn private_plus_private_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>>;
    fn private_plus_public(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>>;
    fn private_plus_public_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>>;
    fn public_plus_public(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>>;
    fn public_plus_public_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>>;

    // ---- Mult gates ----

    fn private_mult_private(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>>;
    fn private_mult_private_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>>;
    fn private_mult_public(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>>;
    fn private_mult_public_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>>;
    fn public_mult_public(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>>;
    fn public_mult_public_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>>;

    // ---- Neg gates ----

    fn neg_private(&mut self, src: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;
    fn neg_private_batch(&mut self, src: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;
    fn neg_public(&mut self, src: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;
    fn neg_public_batch(&mut self, src: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;

    // ---- wire management ----

    fn increase_integer_reference_count(&mut self, id: WireId<Arithmetic>) -> Result<()>;
    fn increase_integer_reference_count_batch(&mut self, id: WireId<Arithmetic>) -> Result<()>;
    fn decrease_integer_reference_count(&mut self, id: WireId<Arithmetic>) -> Result<()>;
    fn decrease_integer_reference_count_batch(&mut self, id: WireId<Arithmetic>) -> Result<()>;

    /// Expected batch size of a batch integer wire.
    fn integer_batch_size_of(&self, id: WireId<Arithmetic>) -> Result<usize>;
}
