//! Multi-party scheduler that is cryptographically insecure on purpose:
//! every private input is broadcast in cleartext. It exercises the whole
//! multi-party plumbing (agents, lockstep submission, share extraction
//! conventions) independently of the crypto layer.

use anyhow::{Context, Result};
use std::collections::BTreeMap;

use crate::channel_utils::{BoxedAgent, PartyId};
use crate::scheduler::plaintext::PlaintextScheduler;
use crate::scheduler::wire_keeper::WireKeeper;
use crate::scheduler::{Arithmetic, ArithmeticScheduler, Boolean, Scheduler, WireId};

pub struct NetworkPlaintextScheduler {
    inner: PlaintextScheduler,
    my_id: PartyId,
    agents: BTreeMap<PartyId, BoxedAgent>,
}

impl NetworkPlaintextScheduler {
    pub fn new(
        my_id: PartyId,
        agents: BTreeMap<PartyId, BoxedAgent>,
        wire_keeper: WireKeeper,
    ) -> Self {
        Self {
            inner: PlaintextScheduler::new(wire_keeper),
            my_id,
            agents,
        }
    }

    fn owner_agent(&mut self, party: PartyId) -> Result<&mut BoxedAgent> {
        self.agents
            .get_mut(&party)
            .with_context(|| format!("no agent for party {} @{}:{}", party, file!(), line!()))
    }
}

macro_rules! forward {
    ($(fn $name:ident($($arg:ident : $ty:ty),*) -> $ret:ty;)*) => {
        $(fn $name(&mut self, $($arg: $ty),*) -> $ret {
            self.inner.$name($($arg),*)
        })*
    };
}

impl Scheduler for NetworkPlaintextScheduler {
    fn private_boolean_input(&mut self, v: bool, party: PartyId) -> Result<WireId<Boolean>> {
        self.inner.stats().add_free(1);
        let value = if party == self.my_id {
            for agent in self.agents.values_mut() {
                agent.send_single_bool(v)?;
            }
            v
        } else {
            self.owner_agent(party)?.receive_single_bool()?
        };
        Ok(self.inner.wire_keeper().allocate_boolean_value(value, 0))
    }

    fn private_boolean_input_batch(
        &mut self,
        v: &[bool],
        party: PartyId,
    ) -> Result<WireId<Boolean>> {
        self.inner.stats().add_free(v.len() as u64);
        let values = if party == self.my_id {
            for agent in self.agents.values_mut() {
                agent.send_bool(v)?;
            }
            v.to_vec()
        } else {
            self.owner_agent(party)?.receive_bool(v.len())?
        };
        Ok(self
            .inner
            .wire_keeper()
            .allocate_batch_boolean_value(values, 0))
    }

    /// XOR the shares from all parties to recover the true value.
    fn recover_boolean_wire(&mut self, share: bool) -> Result<WireId<Boolean>> {
        self.inner.stats().add_free(1);
        let mut value = share;
        let my_id = self.my_id;
        for (peer, agent) in self.agents.iter_mut() {
            let received = if *peer < my_id {
                agent.send_single_bool(share)?;
                agent.receive_single_bool()?
            } else {
                let received = agent.receive_single_bool()?;
                agent.send_single_bool(share)?;
                received
            };
            value ^= received;
        }
        Ok(self.inner.wire_keeper().allocate_boolean_value(value, 0))
    }

    fn recover_boolean_wire_batch(&mut self, shares: &[bool]) -> Result<WireId<Boolean>> {
        self.inner.stats().add_free(shares.len() as u64);
        let mut values = shares.to_vec();
        let my_id = self.my_id;
        for (peer, agent) in self.agents.iter_mut() {
            let received = if *peer < my_id {
                agent.send_bool(shares)?;
                agent.receive_bool(shares.len())?
            } else {
                let received = agent.receive_bool(shares.len())?;
                agent.send_bool(shares)?;
                received
            };
            for (v, r) in values.iter_mut().zip(received) {
                *v ^= r;
            }
        }
        Ok(self
            .inner
            .wire_keeper()
            .allocate_batch_boolean_value(values, 0))
    }

    // Party 0 reports the actual value as its share and everyone else
    // reports zero, so the shares still combine to the actual value.
    fn extract_boolean_secret_share(&mut self, id: WireId<Boolean>) -> Result<bool> {
        let value = self.inner.extract_boolean_secret_share(id)?;
        Ok(if self.my_id == 0 { value } else { false })
    }

    fn extract_boolean_secret_share_batch(&mut self, id: WireId<Boolean>) -> Result<Vec<bool>> {
        let values = self.inner.extract_boolean_secret_share_batch(id)?;
        Ok(if self.my_id == 0 {
            values
        } else {
            vec![false; values.len()]
        })
    }

    forward! {
        fn public_boolean_input(v: bool) -> Result<WireId<Boolean>>;
        fn public_boolean_input_batch(v: &[bool]) -> Result<WireId<Boolean>>;
        fn open_boolean_value_to_party(src: WireId<Boolean>, party: PartyId) -> Result<WireId<Boolean>>;
        fn open_boolean_value_to_party_batch(src: WireId<Boolean>, party: PartyId) -> Result<WireId<Boolean>>;
        fn get_boolean_value(id: WireId<Boolean>) -> Result<bool>;
        fn get_boolean_value_batch(id: WireId<Boolean>) -> Result<Vec<bool>>;
        fn private_and_private(left: WireId<Boolean>, right: WireId<Boolean>) -> Result<WireId<Boolean>>;
        fn private_and_private_batch(left: WireId<Boolean>, right: WireId<Boolean>) -> Result<WireId<Boolean>>;
        fn private_and_public(left: WireId<Boolean>, right: WireId<Boolean>) -> Result<WireId<Boolean>>;
        fn private_and_public_batch(left: WireId<Boolean>, right: WireId<Boolean>) -> Result<WireId<Boolean>>;
        fn public_and_public(left: WireId<Boolean>, right: WireId<Boolean>) -> Result<WireId<Boolean>>;
        fn public_and_public_batch(left: WireId<Boolean>, right: WireId<Boolean>) -> Result<WireId<Boolean>>;
        fn private_and_private_composite(left: WireId<Boolean>, rights: &[WireId<Boolean>]) -> Result<Vec<WireId<Boolean>>>;
        fn private_and_private_composite_batch(left: WireId<Boolean>, rights: &[WireId<Boolean>]) -> Result<Vec<WireId<Boolean>>>;
        fn private_and_public_composite(left: WireId<Boolean>, rights: &[WireId<Boolean>]) -> Result<Vec<WireId<Boolean>>>;
        fn private_and_public_composite_batch(left: WireId<Boolean>, rights: &[WireId<Boolean>]) -> Result<Vec<WireId<Boolean>>>;
        fn public_and_public_composite(left: WireId<Boolean>, rights: &[WireId<Boolean>]) -> Result<Vec<WireId<Boolean>>>;
        fn public_and_public_composite_batch(left: WireId<Boolean>, rights: &[WireId<Boolean>]) -> Result<Vec<WireId<Boolean>>>;
        fn private_xor_private(left: WireId<Boolean>, right: WireId<Boolean>) -> Result<WireId<Boolean>>;
        fn private_xor_private_batch(left: WireId<Boolean>, right: WireId<Boolean>) -> Result<WireId<Boolean>>;
        fn private_xor_public(left: WireId<Boolean>, right: WireId<Boolean>) -> Result<WireId<Boolean>>;
        fn private_xor_public_batch(left: WireId<Boolean>, right: WireId<Boolean>) -> Result<WireId<Boolean>>;
        fn public_xor_public(left: WireId<Boolean>, right: WireId<Boolean>) -> Result<WireId<Boolean>>;
        fn public_xor_public_batch(left: WireId<Boolean>, right: WireId<Boolean>) -> Result<WireId<Boolean>>;
        fn not_private(src: WireId<Boolean>) -> Result<WireId<Boolean>>;
        fn not_private_batch(src: WireId<Boolean>) -> Result<WireId<Boolean>>;
        fn not_public(src: WireId<Boolean>) -> Result<WireId<Boolean>>;
        fn not_public_batch(src: WireId<Boolean>) -> Result<WireId<Boolean>>;
        fn increase_reference_count(id: WireId<Boolean>) -> Result<()>;
        fn increase_reference_count_batch(id: WireId<Boolean>) -> Result<()>;
        fn decrease_reference_count(id: WireId<Boolean>) -> Result<()>;
        fn decrease_reference_count_batch(id: WireId<Boolean>) -> Result<()>;
        fn batching_up(srcs: &[WireId<Boolean>]) -> Result<WireId<Boolean>>;
        fn unbatching(src: WireId<Boolean>, strategy: &[u32]) -> Result<Vec<WireId<Boolean>>>;
    }

    fn traffic_statistics(&self) -> (u64, u64) {
        let mut sent = 0;
        let mut received = 0;
        for agent in self.agents.values() {
            let (s, r) = agent.traffic_statistics();
            sent += s;
            received += r;
        }
        (sent, received)
    }

    fn gate_statistics(&self) -> (u64, u64) {
        self.inner.gate_statistics()
    }

    fn wire_statistics(&self) -> (u64, u64) {
        self.inner.wire_statistics()
    }

    fn batch_size_of(&self, id: WireId<Boolean>) -> Result<usize> {
        self.inner.batch_size_of(id)
    }
}

impl ArithmeticScheduler for NetworkPlaintextScheduler {
    fn private_integer_input(&mut self, v: u64, party: PartyId) -> Result<WireId<Arithmetic>> {
        self.inner.stats().add_free(1);
        let value = if party == self.my_id {
            for agent in self.agents.values_mut() {
                agent.send_single_u64(v)?;
            }
            v
        } else {
            self.owner_agent(party)?.receive_single_u64()?
        };
        Ok(self.inner.wire_keeper().allocate_integer_value(value, 0))
    }

    fn private_integer_input_batch(
        &mut self,
        v: &[u64],
        party: PartyId,
    ) -> Result<WireId<Arithmetic>> {
        self.inner.stats().add_free(v.len() as u64);
        let values = if party == self.my_id {
            for agent in self.agents.values_mut() {
                agent.send_u64(v)?;
            }
            v.to_vec()
        } else {
            self.owner_agent(party)?.receive_u64(v.len())?
        };
        Ok(self
            .inner
            .wire_keeper()
            .allocate_batch_integer_value(values, 0))
    }

    /// Sum the shares from all parties to recover the true value.
    fn recover_integer_wire(&mut self, share: u64) -> Result<WireId<Arithmetic>> {
        self.inner.stats().add_free(1);
        let mut value = share;
        let my_id = self.my_id;
        for (peer, agent) in self.agents.iter_mut() {
            let received = if *peer < my_id {
                agent.send_single_u64(share)?;
                agent.receive_single_u64()?
            } else {
                let received = agent.receive_single_u64()?;
                agent.send_single_u64(share)?;
                received
            };
            value = value.wrapping_add(received);
        }
        Ok(self.inner.wire_keeper().allocate_integer_value(value, 0))
    }

    fn recover_integer_wire_batch(&mut self, shares: &[u64]) -> Result<WireId<Arithmetic>> {
        self.inner.stats().add_free(shares.len() as u64);
        let mut values = shares.to_vec();
        let my_id = self.my_id;
        for (peer, agent) in self.agents.iter_mut() {
            let received = if *peer < my_id {
                agent.send_u64(shares)?;
                agent.receive_u64(shares.len())?
            } else {
                let received = agent.receive_u64(shares.len())?;
                agent.send_u64(shares)?;
                received
            };
            for (v, r) in values.iter_mut().zip(received) {
                *v = v.wrapping_add(r);
            }
        }
        Ok(self
            .inner
            .wire_keeper()
            .allocate_batch_integer_value(values, 0))
    }

    fn extract_integer_secret_share(&mut self, id: WireId<Arithmetic>) -> Result<u64> {
        let value = self.inner.extract_integer_secret_share(id)?;
        Ok(if self.my_id == 0 { value } else { 0 })
    }

    fn extract_integer_secret_share_batch(&mut self, id: WireId<Arithmetic>) -> Result<Vec<u64>> {
        let values = self.inner.extract_integer_secret_share_batch(id)?;
        Ok(if self.my_id == 0 {
            values
        } else {
            vec![0; values.len()]
        })
    }

    forward! {
        fn public_integer_input(v: u64) -> Result<WireId<Arithmetic>>;
        fn public_integer_input_batch(v: &[u64]) -> Result<WireId<Arithmetic>>;
        fn open_integer_value_to_party(src: WireId<Arithmetic>, party: PartyId) -> Result<WireId<Arithmetic>>;
        fn open_integer_value_to_party_batch(src: WireId<Arithmetic>, party: PartyId) -> Result<WireId<Arithmetic>>;
        fn get_integer_value(id: WireId<Arithmetic>) -> Result<u64>;
        fn get_integer_value_batch(id: WireId<Arithmetic>) -> Result<Vec<u64>>;
        fn private_plus_private(left: WireId<Arithmetic>, right: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;
        fn private_plus_private_batch(left: WireId<Arithmetic>, right: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;
        fn private_plus_public(left: WireId<Arithmetic>, right: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;
        fn private_plus_public_batch(left: WireId<Arithmetic>, right: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;
        fn public_plus_public(left: WireId<Arithmetic>, right: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;
        fn public_plus_public_batch(left: WireId<Arithmetic>, right: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;
        fn private_mult_private(left: WireId<Arithmetic>, right: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;
        fn private_mult_private_batch(left: WireId<Arithmetic>, right: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;
        fn private_mult_public(left: WireId<Arithmetic>, right: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;
        fn private_mult_public_batch(left: WireId<Arithmetic>, right: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;
        fn public_mult_public(left: WireId<Arithmetic>, right: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;
        fn public_mult_public_batch(left: WireId<Arithmetic>, right: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;
        fn neg_private(src: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;
        fn neg_private_batch(src: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;
        fn neg_public(src: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;
        fn neg_public_batch(src: WireId<Arithmetic>) -> Result<WireId<Arithmetic>>;
        fn increase_integer_reference_count(id: WireId<Arithmetic>) -> Result<()>;
        fn increase_integer_reference_count_batch(id: WireId<Arithmetic>) -> Result<()>;
        fn decrease_integer_reference_count(id: WireId<Arithmetic>) -> Result<()>;
        fn decrease_integer_reference_count_batch(id: WireId<Arithmetic>) -> Result<()>;
    }

    fn integer_batch_size_of(&self, id: WireId<Arithmetic>) -> Result<usize> {
        self.inner.integer_batch_size_of(id)
    }
}
