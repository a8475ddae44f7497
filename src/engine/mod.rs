//! The secret-share engine: the cryptographic layer of the runtime.
//!
//! Values live as XOR shares (bits) or additive shares mod 2^64 (words).
//! Free operations combine shares locally; non-free operations consume
//! Beaver tuples and go through a two-phase open-reveal-combine protocol.
//! Non-free work is queued via the `schedule_*` calls and executed in one
//! batch by [SecretShareEngine::execute_scheduled_operations], which costs
//! two network roundtrips no matter how many gates were queued.

use anyhow::{bail, Context, Result};
use log::debug;
use std::collections::BTreeMap;

use crate::channel_utils::{BoxedAgent, PartyId};
use crate::errors::RuntimeError;

pub mod communication;
pub mod dummy;
pub mod prg;
pub mod tuple_generator;

use communication::EngineCommunicationAgent;
use prg::{random_seed, Prg};
use tuple_generator::{BooleanTuple, CompositeBooleanTuple, IntegerTuple, TupleGenerator};

/// The engine API consumed by the schedulers.
///
/// `symmetric` operations are applied by every party to its share;
/// `asymmetric` ones only by party 0, which is how a public constant enters
/// a shared computation without breaking the share invariant.
pub trait SecretShareEngine {
    /// Produce this party's share of an input bit owned by party `id`.
    /// The owner must pass the value; everyone else passes `None`.
    fn set_input(&mut self, id: PartyId, v: Option<bool>) -> Result<bool>;

    /// Batch form of [Self::set_input]. Non-owners pass a vector of the
    /// same length whose values are ignored.
    fn set_batch_input(&mut self, id: PartyId, v: &[bool]) -> Result<Vec<bool>>;

    /// Produce this party's additive share of an input word owned by `id`.
    fn set_integer_input(&mut self, id: PartyId, v: Option<u64>) -> Result<u64>;

    fn set_batch_integer_input(&mut self, id: PartyId, v: &[u64]) -> Result<Vec<u64>>;

    fn compute_symmetric_xor(&self, left: bool, right: bool) -> bool;
    fn compute_batch_symmetric_xor(&self, left: &[bool], right: &[bool]) -> Result<Vec<bool>>;
    fn compute_asymmetric_xor(&self, private: bool, public: bool) -> bool;
    fn compute_batch_asymmetric_xor(&self, private: &[bool], public: &[bool])
        -> Result<Vec<bool>>;
    fn compute_symmetric_not(&self, input: bool) -> bool;
    fn compute_batch_symmetric_not(&self, input: &[bool]) -> Vec<bool>;
    fn compute_asymmetric_not(&self, input: bool) -> bool;
    fn compute_batch_asymmetric_not(&self, input: &[bool]) -> Vec<bool>;
    fn compute_free_and(&self, left: bool, right: bool) -> bool;
    fn compute_batch_free_and(&self, left: &[bool], right: &[bool]) -> Result<Vec<bool>>;

    fn compute_symmetric_plus(&self, left: u64, right: u64) -> u64;
    fn compute_batch_symmetric_plus(&self, left: &[u64], right: &[u64]) -> Result<Vec<u64>>;
    fn compute_asymmetric_plus(&self, private: u64, public: u64) -> u64;
    fn compute_batch_asymmetric_plus(&self, private: &[u64], public: &[u64]) -> Result<Vec<u64>>;
    fn compute_symmetric_neg(&self, input: u64) -> u64;
    fn compute_batch_symmetric_neg(&self, input: &[u64]) -> Vec<u64>;
    fn compute_free_mult(&self, left: u64, right: u64) -> u64;
    fn compute_batch_free_mult(&self, left: &[u64], right: &[u64]) -> Result<Vec<u64>>;

    /// Queue a non-free AND; returns its index into the AND result table.
    fn schedule_and(&mut self, left: bool, right: bool) -> usize;
    fn schedule_batch_and(&mut self, left: &[bool], right: &[bool]) -> Result<usize>;
    /// Queue one left share against `k` right shares, consuming one
    /// composite tuple instead of `k` scalar ones.
    fn schedule_composite_and(&mut self, left: bool, rights: Vec<bool>) -> usize;
    fn schedule_batch_composite_and(&mut self, left: &[bool], rights: Vec<Vec<bool>>)
        -> Result<usize>;
    fn schedule_mult(&mut self, left: u64, right: u64) -> usize;
    fn schedule_batch_mult(&mut self, left: &[u64], right: &[u64]) -> Result<usize>;

    /// Run every queued operation. Two roundtrips for the boolean queues
    /// plus two for the integer queues, independent of queue sizes.
    /// Results replace whatever the previous execution produced.
    fn execute_scheduled_operations(&mut self) -> Result<()>;

    /// Execute one batch of ANDs right now, bypassing the queues.
    fn compute_batch_and_immediately(&mut self, left: &[bool], right: &[bool])
        -> Result<Vec<bool>>;
    fn compute_batch_mult_immediately(&mut self, left: &[u64], right: &[u64])
        -> Result<Vec<u64>>;

    fn and_execution_result(&self, index: usize) -> Result<bool>;
    fn batch_and_execution_result(&self, index: usize) -> Result<&Vec<bool>>;
    fn composite_and_execution_result(&self, index: usize) -> Result<&Vec<bool>>;
    fn batch_composite_and_execution_result(&self, index: usize) -> Result<&Vec<Vec<bool>>>;
    fn mult_execution_result(&self, index: usize) -> Result<u64>;
    fn batch_mult_execution_result(&self, index: usize) -> Result<&Vec<u64>>;

    /// Fold shares to one recipient. Not Beaver-style: a plain open.
    /// Non-recipients get a zero vector back and must not read it.
    fn reveal_to_party_bool(&mut self, id: PartyId, shares: &[bool]) -> Result<Vec<bool>>;
    fn reveal_to_party_u64(&mut self, id: PartyId, shares: &[u64]) -> Result<Vec<u64>>;

    /// (sent, received) bytes, online plus offline.
    fn traffic_statistics(&self) -> (u64, u64);
}

struct ScheduledAnd {
    left: bool,
    right: bool,
}

struct ScheduledBatchAnd {
    left: Vec<bool>,
    right: Vec<bool>,
}

struct ScheduledCompositeAnd {
    left: bool,
    rights: Vec<bool>,
}

struct ScheduledBatchCompositeAnd {
    left: Vec<bool>,
    rights: Vec<Vec<bool>>,
}

struct ScheduledMult {
    left: u64,
    right: u64,
}

struct ScheduledBatchMult {
    left: Vec<u64>,
    right: Vec<u64>,
}

#[derive(Default)]
struct ExecutionResults {
    ands: Vec<bool>,
    batch_ands: Vec<Vec<bool>>,
    composite_ands: Vec<Vec<bool>>,
    batch_composite_ands: Vec<Vec<Vec<bool>>>,
    mults: Vec<u64>,
    batch_mults: Vec<Vec<u64>>,
}

/// The tuple(s) an operation will consume, pinned at opening time so the
/// combine pass walks exactly the same assignment.
enum CompositeJob {
    Correlated(CompositeBooleanTuple),
    Expanded(Vec<BooleanTuple>),
}

// z = c ^ X·b ^ Y·a, with the public X·Y folded in by party 0 only.
// That asymmetry is what keeps the XOR of all parties' z equal to x∧y.
fn combine_and(my_id: PartyId, x: bool, y: bool, t: &BooleanTuple) -> bool {
    let mut z = t.c ^ (x & t.b) ^ (y & t.a);
    if my_id == 0 {
        z ^= x & y;
    }
    z
}

fn combine_mult(my_id: PartyId, x: u64, y: u64, t: &IntegerTuple) -> u64 {
    let mut z = t
        .c
        .wrapping_add(x.wrapping_mul(t.b))
        .wrapping_add(y.wrapping_mul(t.a));
    if my_id == 0 {
        z = z.wrapping_add(x.wrapping_mul(y));
    }
    z
}

/// The production engine: XOR/additive shares plus Beaver tuples.
pub struct BeaverSecretShareEngine {
    my_id: PartyId,
    tuple_generator: Box<dyn TupleGenerator + Send>,
    communication_agent: EngineCommunicationAgent,

    // One PRG pair per peer. The first masks our own inputs, the second
    // regenerates the mask the peer applied to theirs. These seeds are
    // used for input masking and nothing else.
    input_prgs: BTreeMap<PartyId, (Prg, Prg)>,

    scheduled_ands: Vec<ScheduledAnd>,
    scheduled_batch_ands: Vec<ScheduledBatchAnd>,
    scheduled_composite_ands: Vec<ScheduledCompositeAnd>,
    scheduled_batch_composite_ands: Vec<ScheduledBatchCompositeAnd>,
    scheduled_mults: Vec<ScheduledMult>,
    scheduled_batch_mults: Vec<ScheduledBatchMult>,

    results: ExecutionResults,
}

impl BeaverSecretShareEngine {
    /// Set up the engine: picks one fresh 128-bit seed per peer, runs the
    /// key exchange, and derives the per-peer input-masking PRG pairs.
    pub fn new(
        tuple_generator: Box<dyn TupleGenerator + Send>,
        agents: BTreeMap<PartyId, BoxedAgent>,
        my_id: PartyId,
        num_parties: usize,
    ) -> Result<Self> {
        let mut communication_agent = EngineCommunicationAgent::new(my_id, agents);

        let mut my_keys = BTreeMap::new();
        for peer in 0..num_parties {
            if peer != my_id {
                my_keys.insert(peer, random_seed());
            }
        }
        let peer_keys = communication_agent.exchange_keys(&my_keys)?;

        let mut input_prgs = BTreeMap::new();
        for (peer, my_key) in &my_keys {
            let peer_key = peer_keys
                .get(peer)
                .with_context(|| format!("missing key from peer {}", peer))?;
            input_prgs.insert(*peer, (Prg::from_seed(*my_key), Prg::from_seed(*peer_key)));
        }
        debug!("party {}: engine ready, {} peers", my_id, input_prgs.len());

        Ok(Self {
            my_id,
            tuple_generator,
            communication_agent,
            input_prgs,
            scheduled_ands: vec![],
            scheduled_batch_ands: vec![],
            scheduled_composite_ands: vec![],
            scheduled_batch_composite_ands: vec![],
            scheduled_mults: vec![],
            scheduled_batch_mults: vec![],
            results: ExecutionResults::default(),
        })
    }

    fn execute_boolean_queues(&mut self) -> Result<()> {
        let supports_composite = self.tuple_generator.supports_composite_tuple_generation();

        let mut n_normal = self.scheduled_ands.len();
        for op in &self.scheduled_batch_ands {
            n_normal += op.left.len();
        }
        let mut widths: BTreeMap<usize, usize> = BTreeMap::new();
        for op in &self.scheduled_composite_ands {
            if supports_composite {
                *widths.entry(op.rights.len()).or_insert(0) += 1;
            } else {
                n_normal += op.rights.len();
            }
        }
        for op in &self.scheduled_batch_composite_ands {
            if supports_composite {
                *widths.entry(op.rights.len()).or_insert(0) += op.left.len();
            } else {
                n_normal += op.rights.len() * op.left.len();
            }
        }

        if n_normal == 0 && widths.is_empty() {
            return Ok(());
        }

        let (normals, mut composites) = if widths.is_empty() {
            (self.tuple_generator.get_boolean_tuples(n_normal)?, BTreeMap::new())
        } else {
            self.tuple_generator
                .get_normal_and_composite_boolean_tuples(n_normal, &widths)?
        };
        if normals.len() != n_normal {
            bail!(RuntimeError::Protocol(format!(
                "tuple generator returned {} normal tuples, needed {}",
                normals.len(),
                n_normal
            )));
        }

        let mut normal_iter = normals.into_iter();
        let mut take_normal = |n: usize| -> Vec<BooleanTuple> { normal_iter.by_ref().take(n).collect() };
        let mut take_composite = |width: usize| -> Result<CompositeBooleanTuple> {
            let bucket: &mut Vec<CompositeBooleanTuple> = composites
                .get_mut(&width)
                .with_context(|| format!("no composite tuples of width {}", width))?;
            bucket.pop().ok_or_else(|| {
                RuntimeError::Protocol(format!("ran out of width-{} composite tuples", width)).into()
            })
        };

        // Phase one: pin tuples to operations (queue order) and build the
        // single opening vector: scalar, batch, composite, batch-composite.
        let mut masked: Vec<bool> = vec![];

        let and_jobs: Vec<BooleanTuple> = self
            .scheduled_ands
            .iter()
            .map(|op| {
                let t = take_normal(1)[0];
                masked.push(op.left ^ t.a);
                masked.push(op.right ^ t.b);
                t
            })
            .collect();

        let batch_and_jobs: Vec<Vec<BooleanTuple>> = self
            .scheduled_batch_ands
            .iter()
            .map(|op| {
                let ts = take_normal(op.left.len());
                for (l, t) in op.left.iter().zip(&ts) {
                    masked.push(l ^ t.a);
                }
                for (r, t) in op.right.iter().zip(&ts) {
                    masked.push(r ^ t.b);
                }
                ts
            })
            .collect();

        let composite_jobs: Vec<CompositeJob> = self
            .scheduled_composite_ands
            .iter()
            .map(|op| {
                if supports_composite {
                    let t = take_composite(op.rights.len())?;
                    masked.push(op.left ^ t.a);
                    for (r, b) in op.rights.iter().zip(&t.b) {
                        masked.push(r ^ b);
                    }
                    Ok(CompositeJob::Correlated(t))
                } else {
                    let ts = take_normal(op.rights.len());
                    for (r, t) in op.rights.iter().zip(&ts) {
                        masked.push(op.left ^ t.a);
                        masked.push(r ^ t.b);
                    }
                    Ok(CompositeJob::Expanded(ts))
                }
            })
            .collect::<Result<_>>()?;

        let batch_composite_jobs: Vec<Vec<CompositeJob>> = self
            .scheduled_batch_composite_ands
            .iter()
            .map(|op| {
                // batch-major: every batch element carries its own tuple
                (0..op.left.len())
                    .map(|j| {
                        if supports_composite {
                            let t = take_composite(op.rights.len())?;
                            masked.push(op.left[j] ^ t.a);
                            for (right, b) in op.rights.iter().zip(&t.b) {
                                masked.push(right[j] ^ b);
                            }
                            Ok(CompositeJob::Correlated(t))
                        } else {
                            let ts = take_normal(op.rights.len());
                            for (right, t) in op.rights.iter().zip(&ts) {
                                masked.push(op.left[j] ^ t.a);
                                masked.push(right[j] ^ t.b);
                            }
                            Ok(CompositeJob::Expanded(ts))
                        }
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<_>>()?;

        let opened = self.communication_agent.open_secrets_to_all_bool(&masked)?;
        if opened.len() != masked.len() {
            bail!(RuntimeError::Protocol(format!(
                "opened {} secrets, expected {}",
                opened.len(),
                masked.len()
            )));
        }

        // Phase two: walk the queues again, consuming opened values in the
        // exact order phase one laid them out.
        let mut cursor = 0usize;

        let my_id = self.my_id;

        for t in &and_jobs {
            let (x, y) = (opened[cursor], opened[cursor + 1]);
            cursor += 2;
            self.results.ands.push(combine_and(my_id, x, y, t));
        }

        for (op, ts) in self.scheduled_batch_ands.iter().zip(&batch_and_jobs) {
            let n = op.left.len();
            let out = (0..n)
                .map(|i| combine_and(my_id, opened[cursor + i], opened[cursor + n + i], &ts[i]))
                .collect();
            cursor += 2 * n;
            self.results.batch_ands.push(out);
        }

        for (op, job) in self.scheduled_composite_ands.iter().zip(&composite_jobs) {
            let k = op.rights.len();
            let out = match job {
                CompositeJob::Correlated(t) => {
                    let x = opened[cursor];
                    let out = (0..k)
                        .map(|i| {
                            let y = opened[cursor + 1 + i];
                            let scalar = BooleanTuple {
                                a: t.a,
                                b: t.b[i],
                                c: t.c[i],
                            };
                            combine_and(my_id, x, y, &scalar)
                        })
                        .collect();
                    cursor += 1 + k;
                    out
                }
                CompositeJob::Expanded(ts) => {
                    let out = (0..k)
                        .map(|i| {
                            combine_and(my_id, opened[cursor + 2 * i], opened[cursor + 2 * i + 1], &ts[i])
                        })
                        .collect();
                    cursor += 2 * k;
                    out
                }
            };
            self.results.composite_ands.push(out);
        }

        for (op, jobs) in self
            .scheduled_batch_composite_ands
            .iter()
            .zip(&batch_composite_jobs)
        {
            let k = op.rights.len();
            let batch = op.left.len();
            let mut out = vec![vec![false; batch]; k];
            for (j, job) in jobs.iter().enumerate() {
                match job {
                    CompositeJob::Correlated(t) => {
                        let x = opened[cursor];
                        for (i, slot) in out.iter_mut().enumerate() {
                            let y = opened[cursor + 1 + i];
                            let scalar = BooleanTuple {
                                a: t.a,
                                b: t.b[i],
                                c: t.c[i],
                            };
                            slot[j] = combine_and(my_id, x, y, &scalar);
                        }
                        cursor += 1 + k;
                    }
                    CompositeJob::Expanded(ts) => {
                        for (i, slot) in out.iter_mut().enumerate() {
                            slot[j] = combine_and(
                                my_id,
                                opened[cursor + 2 * i],
                                opened[cursor + 2 * i + 1],
                                &ts[i],
                            );
                        }
                        cursor += 2 * k;
                    }
                }
            }
            self.results.batch_composite_ands.push(out);
        }

        Ok(())
    }

    fn execute_integer_queues(&mut self) -> Result<()> {
        let mut n = self.scheduled_mults.len();
        for op in &self.scheduled_batch_mults {
            n += op.left.len();
        }
        if n == 0 {
            return Ok(());
        }

        let tuples = self.tuple_generator.get_integer_tuples(n)?;
        if tuples.len() != n {
            bail!(RuntimeError::Protocol(format!(
                "tuple generator returned {} integer tuples, needed {}",
                tuples.len(),
                n
            )));
        }
        let mut tuple_iter = tuples.into_iter();
        let mut take = |n: usize| -> Vec<IntegerTuple> { tuple_iter.by_ref().take(n).collect() };

        let mut masked: Vec<u64> = vec![];

        let mult_jobs: Vec<IntegerTuple> = self
            .scheduled_mults
            .iter()
            .map(|op| {
                let t = take(1)[0];
                masked.push(op.left.wrapping_sub(t.a));
                masked.push(op.right.wrapping_sub(t.b));
                t
            })
            .collect();

        let batch_mult_jobs: Vec<Vec<IntegerTuple>> = self
            .scheduled_batch_mults
            .iter()
            .map(|op| {
                let ts = take(op.left.len());
                for (l, t) in op.left.iter().zip(&ts) {
                    masked.push(l.wrapping_sub(t.a));
                }
                for (r, t) in op.right.iter().zip(&ts) {
                    masked.push(r.wrapping_sub(t.b));
                }
                ts
            })
            .collect();

        let opened = self.communication_agent.open_secrets_to_all_u64(&masked)?;
        if opened.len() != masked.len() {
            bail!(RuntimeError::Protocol(format!(
                "opened {} integer secrets, expected {}",
                opened.len(),
                masked.len()
            )));
        }

        let my_id = self.my_id;
        let mut cursor = 0usize;
        for t in &mult_jobs {
            let (x, y) = (opened[cursor], opened[cursor + 1]);
            cursor += 2;
            self.results.mults.push(combine_mult(my_id, x, y, t));
        }
        for (op, ts) in self.scheduled_batch_mults.iter().zip(&batch_mult_jobs) {
            let n = op.left.len();
            let out = (0..n)
                .map(|i| combine_mult(my_id, opened[cursor + i], opened[cursor + n + i], &ts[i]))
                .collect();
            cursor += 2 * n;
            self.results.batch_mults.push(out);
        }

        Ok(())
    }
}

pub(crate) fn check_same_length<T>(left: &[T], right: &[T]) -> Result<()> {
    if left.len() != right.len() {
        bail!(RuntimeError::InvalidArgument(format!(
            "the input sizes are not the same: {} vs {}",
            left.len(),
            right.len()
        )));
    }
    Ok(())
}

impl SecretShareEngine for BeaverSecretShareEngine {
    fn set_input(&mut self, id: PartyId, v: Option<bool>) -> Result<bool> {
        if id == self.my_id {
            let mut share = v.ok_or_else(|| {
                RuntimeError::InvalidArgument("needs to provide input value".into())
            })?;
            for (out_prg, _) in self.input_prgs.values_mut() {
                share ^= out_prg.get_random_bits(1)[0];
            }
            Ok(share)
        } else {
            let (_, in_prg) = self.input_prgs.get_mut(&id).ok_or_else(|| {
                RuntimeError::InvalidArgument(format!("unknown input owner {}", id))
            })?;
            Ok(in_prg.get_random_bits(1)[0])
        }
    }

    fn set_batch_input(&mut self, id: PartyId, v: &[bool]) -> Result<Vec<bool>> {
        if id == self.my_id {
            let mut shares = v.to_vec();
            for (out_prg, _) in self.input_prgs.values_mut() {
                for (share, mask) in shares.iter_mut().zip(out_prg.get_random_bits(v.len())) {
                    *share ^= mask;
                }
            }
            Ok(shares)
        } else {
            let (_, in_prg) = self.input_prgs.get_mut(&id).ok_or_else(|| {
                RuntimeError::InvalidArgument(format!("unknown input owner {}", id))
            })?;
            Ok(in_prg.get_random_bits(v.len()))
        }
    }

    fn set_integer_input(&mut self, id: PartyId, v: Option<u64>) -> Result<u64> {
        if id == self.my_id {
            let mut share = v.ok_or_else(|| {
                RuntimeError::InvalidArgument("needs to provide input value".into())
            })?;
            for (out_prg, _) in self.input_prgs.values_mut() {
                share = share.wrapping_sub(out_prg.get_random_u64(1)[0]);
            }
            Ok(share)
        } else {
            let (_, in_prg) = self.input_prgs.get_mut(&id).ok_or_else(|| {
                RuntimeError::InvalidArgument(format!("unknown input owner {}", id))
            })?;
            Ok(in_prg.get_random_u64(1)[0])
        }
    }

    fn set_batch_integer_input(&mut self, id: PartyId, v: &[u64]) -> Result<Vec<u64>> {
        if id == self.my_id {
            let mut shares = v.to_vec();
            for (out_prg, _) in self.input_prgs.values_mut() {
                for (share, mask) in shares.iter_mut().zip(out_prg.get_random_u64(v.len())) {
                    *share = share.wrapping_sub(mask);
                }
            }
            Ok(shares)
        } else {
            let (_, in_prg) = self.input_prgs.get_mut(&id).ok_or_else(|| {
                RuntimeError::InvalidArgument(format!("unknown input owner {}", id))
            })?;
            Ok(in_prg.get_random_u64(v.len()))
        }
    }

    fn compute_symmetric_xor(&self, left: bool, right: bool) -> bool {
        left ^ right
    }

    fn compute_batch_symmetric_xor(&self, left: &[bool], right: &[bool]) -> Result<Vec<bool>> {
        check_same_length(left, right)?;
        Ok(left.iter().zip(right).map(|(l, r)| l ^ r).collect())
    }

    fn compute_asymmetric_xor(&self, private: bool, public: bool) -> bool {
        if self.my_id == 0 {
            private ^ public
        } else {
            private
        }
    }

    fn compute_batch_asymmetric_xor(
        &self,
        private: &[bool],
        public: &[bool],
    ) -> Result<Vec<bool>> {
        check_same_length(private, public)?;
        if self.my_id == 0 {
            Ok(private.iter().zip(public).map(|(l, r)| l ^ r).collect())
        } else {
            Ok(private.to_vec())
        }
    }

    fn compute_symmetric_not(&self, input: bool) -> bool {
        !input
    }

    fn compute_batch_symmetric_not(&self, input: &[bool]) -> Vec<bool> {
        input.iter().map(|v| !v).collect()
    }

    fn compute_asymmetric_not(&self, input: bool) -> bool {
        if self.my_id == 0 {
            !input
        } else {
            input
        }
    }

    fn compute_batch_asymmetric_not(&self, input: &[bool]) -> Vec<bool> {
        if self.my_id == 0 {
            input.iter().map(|v| !v).collect()
        } else {
            input.to_vec()
        }
    }

    fn compute_free_and(&self, left: bool, right: bool) -> bool {
        left & right
    }

    fn compute_batch_free_and(&self, left: &[bool], right: &[bool]) -> Result<Vec<bool>> {
        check_same_length(left, right)?;
        Ok(left.iter().zip(right).map(|(l, r)| l & r).collect())
    }

    fn compute_symmetric_plus(&self, left: u64, right: u64) -> u64 {
        left.wrapping_add(right)
    }

    fn compute_batch_symmetric_plus(&self, left: &[u64], right: &[u64]) -> Result<Vec<u64>> {
        check_same_length(left, right)?;
        Ok(left
            .iter()
            .zip(right)
            .map(|(l, r)| l.wrapping_add(*r))
            .collect())
    }

    fn compute_asymmetric_plus(&self, private: u64, public: u64) -> u64 {
        if self.my_id == 0 {
            private.wrapping_add(public)
        } else {
            private
        }
    }

    fn compute_batch_asymmetric_plus(&self, private: &[u64], public: &[u64]) -> Result<Vec<u64>> {
        check_same_length(private, public)?;
        if self.my_id == 0 {
            Ok(private
                .iter()
                .zip(public)
                .map(|(l, r)| l.wrapping_add(*r))
                .collect())
        } else {
            Ok(private.to_vec())
        }
    }

    fn compute_symmetric_neg(&self, input: u64) -> u64 {
        input.wrapping_neg()
    }

    fn compute_batch_symmetric_neg(&self, input: &[u64]) -> Vec<u64> {
        input.iter().map(|v| v.wrapping_neg()).collect()
    }

    fn compute_free_mult(&self, left: u64, right: u64) -> u64 {
        left.wrapping_mul(right)
    }

    fn compute_batch_free_mult(&self, left: &[u64], right: &[u64]) -> Result<Vec<u64>> {
        check_same_length(left, right)?;
        Ok(left
            .iter()
            .zip(right)
            .map(|(l, r)| l.wrapping_mul(*r))
            .collect())
    }

    fn schedule_and(&mut self, left: bool, right: bool) -> usize {
        self.scheduled_ands.push(ScheduledAnd { left, right });
        self.scheduled_ands.len() - 1
    }

    fn schedule_batch_and(&mut self, left: &[bool], right: &[bool]) -> Result<usize> {
        check_same_length(left, right)?;
        self.scheduled_batch_ands.push(ScheduledBatchAnd {
            left: left.to_vec(),
            right: right.to_vec(),
        });
        Ok(self.scheduled_batch_ands.len() - 1)
    }

    fn schedule_composite_and(&mut self, left: bool, rights: Vec<bool>) -> usize {
        self.scheduled_composite_ands
            .push(ScheduledCompositeAnd { left, rights });
        self.scheduled_composite_ands.len() - 1
    }

    fn schedule_batch_composite_and(
        &mut self,
        left: &[bool],
        rights: Vec<Vec<bool>>,
    ) -> Result<usize> {
        for right in &rights {
            check_same_length(left, right)?;
        }
        self.scheduled_batch_composite_ands
            .push(ScheduledBatchCompositeAnd {
                left: left.to_vec(),
                rights,
            });
        Ok(self.scheduled_batch_composite_ands.len() - 1)
    }

    fn schedule_mult(&mut self, left: u64, right: u64) -> usize {
        self.scheduled_mults.push(ScheduledMult { left, right });
        self.scheduled_mults.len() - 1
    }

    fn schedule_batch_mult(&mut self, left: &[u64], right: &[u64]) -> Result<usize> {
        check_same_length(left, right)?;
        self.scheduled_batch_mults.push(ScheduledBatchMult {
            left: left.to_vec(),
            right: right.to_vec(),
        });
        Ok(self.scheduled_batch_mults.len() - 1)
    }

    fn execute_scheduled_operations(&mut self) -> Result<()> {
        self.results = ExecutionResults::default();
        self.execute_boolean_queues()?;
        self.execute_integer_queues()?;
        self.scheduled_ands.clear();
        self.scheduled_batch_ands.clear();
        self.scheduled_composite_ands.clear();
        self.scheduled_batch_composite_ands.clear();
        self.scheduled_mults.clear();
        self.scheduled_batch_mults.clear();
        Ok(())
    }

    fn compute_batch_and_immediately(
        &mut self,
        left: &[bool],
        right: &[bool],
    ) -> Result<Vec<bool>> {
        check_same_length(left, right)?;
        if left.is_empty() {
            return Ok(vec![]);
        }
        let tuples = self.tuple_generator.get_boolean_tuples(left.len())?;
        let mut masked = Vec::with_capacity(2 * left.len());
        for (l, t) in left.iter().zip(&tuples) {
            masked.push(l ^ t.a);
        }
        for (r, t) in right.iter().zip(&tuples) {
            masked.push(r ^ t.b);
        }
        let opened = self.communication_agent.open_secrets_to_all_bool(&masked)?;
        let n = left.len();
        let my_id = self.my_id;
        Ok((0..n)
            .map(|i| combine_and(my_id, opened[i], opened[n + i], &tuples[i]))
            .collect())
    }

    fn compute_batch_mult_immediately(&mut self, left: &[u64], right: &[u64]) -> Result<Vec<u64>> {
        check_same_length(left, right)?;
        if left.is_empty() {
            return Ok(vec![]);
        }
        let tuples = self.tuple_generator.get_integer_tuples(left.len())?;
        let mut masked = Vec::with_capacity(2 * left.len());
        for (l, t) in left.iter().zip(&tuples) {
            masked.push(l.wrapping_sub(t.a));
        }
        for (r, t) in right.iter().zip(&tuples) {
            masked.push(r.wrapping_sub(t.b));
        }
        let opened = self.communication_agent.open_secrets_to_all_u64(&masked)?;
        let n = left.len();
        let my_id = self.my_id;
        Ok((0..n)
            .map(|i| combine_mult(my_id, opened[i], opened[n + i], &tuples[i]))
            .collect())
    }

    fn and_execution_result(&self, index: usize) -> Result<bool> {
        self.results
            .ands
            .get(index)
            .copied()
            .with_context(|| format!("no AND result at index {}", index))
    }

    fn batch_and_execution_result(&self, index: usize) -> Result<&Vec<bool>> {
        self.results
            .batch_ands
            .get(index)
            .with_context(|| format!("no batch AND result at index {}", index))
    }

    fn composite_and_execution_result(&self, index: usize) -> Result<&Vec<bool>> {
        self.results
            .composite_ands
            .get(index)
            .with_context(|| format!("no composite AND result at index {}", index))
    }

    fn batch_composite_and_execution_result(&self, index: usize) -> Result<&Vec<Vec<bool>>> {
        self.results
            .batch_composite_ands
            .get(index)
            .with_context(|| format!("no batch composite AND result at index {}", index))
    }

    fn mult_execution_result(&self, index: usize) -> Result<u64> {
        self.results
            .mults
            .get(index)
            .copied()
            .with_context(|| format!("no Mult result at index {}", index))
    }

    fn batch_mult_execution_result(&self, index: usize) -> Result<&Vec<u64>> {
        self.results
            .batch_mults
            .get(index)
            .with_context(|| format!("no batch Mult result at index {}", index))
    }

    fn reveal_to_party_bool(&mut self, id: PartyId, shares: &[bool]) -> Result<Vec<bool>> {
        self.communication_agent.open_secrets_to_party_bool(id, shares)
    }

    fn reveal_to_party_u64(&mut self, id: PartyId, shares: &[u64]) -> Result<Vec<u64>> {
        self.communication_agent.open_secrets_to_party_u64(id, shares)
    }

    fn traffic_statistics(&self) -> (u64, u64) {
        let (online_sent, online_received) = self.communication_agent.traffic_statistics();
        let (offline_sent, offline_received) = self.tuple_generator.traffic_statistics();
        (online_sent + offline_sent, online_received + offline_received)
    }
}
