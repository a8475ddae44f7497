//! Collective primitives over the per-peer point-to-point agents.
//!
//! Lifts N-1 [PartyCommunicationAgent](crate::channel_utils::PartyCommunicationAgent)s
//! into the three things the engine needs: the one-shot key exchange, open
//! to all, and open to one party. Peers are always walked in ascending id
//! order so the two sides of every pairwise exchange agree on the schedule.

use anyhow::{Context, Result};
use log::debug;
use std::collections::BTreeMap;

use crate::channel_utils::{BoxedAgent, PartyId, PrgSeed};

pub struct EngineCommunicationAgent {
    my_id: PartyId,
    agents: BTreeMap<PartyId, BoxedAgent>,
}

impl EngineCommunicationAgent {
    pub fn new(my_id: PartyId, agents: BTreeMap<PartyId, BoxedAgent>) -> Self {
        Self { my_id, agents }
    }

    /// Send our chosen seed to every peer and collect theirs.
    pub fn exchange_keys(
        &mut self,
        keys: &BTreeMap<PartyId, PrgSeed>,
    ) -> Result<BTreeMap<PartyId, PrgSeed>> {
        debug!("party {}: exchanging prg keys with {} peers", self.my_id, keys.len());
        let mut received = BTreeMap::new();
        for (peer, key) in keys {
            let agent = self
                .agents
                .get_mut(peer)
                .with_context(|| format!("no agent for peer {} @{}:{}", peer, file!(), line!()))?;
            agent.send_key(*key)?;
            received.insert(*peer, agent.receive_key()?);
        }
        Ok(received)
    }

    /// Reconstruct the plaintext of XOR-shared bits at every party.
    ///
    /// The send/receive order flips around our own id so that every pairwise
    /// exchange has exactly one side sending first. That keeps the whole
    /// collective deadlock-free on blocking transports without extra threads.
    pub fn open_secrets_to_all_bool(&mut self, shares: &[bool]) -> Result<Vec<bool>> {
        if shares.is_empty() {
            return Ok(vec![]);
        }
        let mut result = shares.to_vec();
        for (peer, agent) in self.agents.iter_mut() {
            let received = if *peer < self.my_id {
                agent.send_bool(shares)?;
                agent.receive_bool(shares.len())?
            } else {
                let received = agent.receive_bool(shares.len())?;
                agent.send_bool(shares)?;
                received
            };
            for (r, x) in result.iter_mut().zip(received) {
                *r ^= x;
            }
        }
        Ok(result)
    }

    /// Reconstruct the plaintext of additively shared words at every party.
    pub fn open_secrets_to_all_u64(&mut self, shares: &[u64]) -> Result<Vec<u64>> {
        if shares.is_empty() {
            return Ok(vec![]);
        }
        let mut result = shares.to_vec();
        for (peer, agent) in self.agents.iter_mut() {
            let received = if *peer < self.my_id {
                agent.send_u64(shares)?;
                agent.receive_u64(shares.len())?
            } else {
                let received = agent.receive_u64(shares.len())?;
                agent.send_u64(shares)?;
                received
            };
            for (r, x) in result.iter_mut().zip(received) {
                *r = r.wrapping_add(x);
            }
        }
        Ok(result)
    }

    /// Open XOR-shared bits to one party only.
    ///
    /// The receiver folds every peer's shares; everyone else sends theirs
    /// and gets back a zero vector of the same length, which callers must
    /// treat as a dummy.
    pub fn open_secrets_to_party_bool(&mut self, id: PartyId, shares: &[bool]) -> Result<Vec<bool>> {
        if shares.is_empty() {
            return Ok(vec![]);
        }
        if id == self.my_id {
            let mut result = shares.to_vec();
            for agent in self.agents.values_mut() {
                let received = agent.receive_bool(shares.len())?;
                for (r, x) in result.iter_mut().zip(received) {
                    *r ^= x;
                }
            }
            Ok(result)
        } else {
            let agent = self
                .agents
                .get_mut(&id)
                .with_context(|| format!("no agent for peer {} @{}:{}", id, file!(), line!()))?;
            agent.send_bool(shares)?;
            Ok(vec![false; shares.len()])
        }
    }

    /// Open additively shared words to one party only.
    pub fn open_secrets_to_party_u64(&mut self, id: PartyId, shares: &[u64]) -> Result<Vec<u64>> {
        if shares.is_empty() {
            return Ok(vec![]);
        }
        if id == self.my_id {
            let mut result = shares.to_vec();
            for agent in self.agents.values_mut() {
                let received = agent.receive_u64(shares.len())?;
                for (r, x) in result.iter_mut().zip(received) {
                    *r = r.wrapping_add(x);
                }
            }
            Ok(result)
        } else {
            let agent = self
                .agents
                .get_mut(&id)
                .with_context(|| format!("no agent for peer {} @{}:{}", id, file!(), line!()))?;
            agent.send_u64(shares)?;
            Ok(vec![0; shares.len()])
        }
    }

    /// (sent, received) bytes aggregated over all peers.
    pub fn traffic_statistics(&self) -> (u64, u64) {
        let mut sent = 0;
        let mut received = 0;
        for agent in self.agents.values() {
            let (s, r) = agent.traffic_statistics();
            sent += s;
            received += r;
        }
        (sent, received)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel_utils::memory_channel::create_memory_agents;
    use itertools::Itertools;

    fn spawn_parties<F, T>(nparties: usize, body: F) -> Vec<T>
    where
        F: Fn(PartyId, EngineCommunicationAgent) -> T + Send + Sync + 'static,
        T: Send + 'static,
    {
        let body = std::sync::Arc::new(body);
        let handles = create_memory_agents(nparties)
            .into_iter()
            .enumerate()
            .map(|(me, agents)| {
                let body = body.clone();
                std::thread::spawn(move || body(me, EngineCommunicationAgent::new(me, agents)))
            })
            .collect_vec();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    }

    #[test]
    fn test_exchange_keys() {
        let results = spawn_parties(3, |me, mut comm| {
            let keys: BTreeMap<PartyId, PrgSeed> = (0..3)
                .filter(|p| *p != me)
                .map(|p| (p, [me as u8; 16]))
                .collect();
            comm.exchange_keys(&keys).unwrap()
        });

        for (me, received) in results.iter().enumerate() {
            assert_eq!(received.len(), 2);
            for (peer, key) in received {
                assert_ne!(*peer, me);
                assert_eq!(*key, [*peer as u8; 16]);
            }
        }
    }

    #[test]
    fn test_open_secrets_to_all() {
        // shares of [true, false, true] among 3 parties
        let shares = [
            vec![true, true, false],
            vec![false, true, true],
            vec![false, false, false],
        ];
        let results = spawn_parties(3, move |me, mut comm| {
            comm.open_secrets_to_all_bool(&shares[me]).unwrap()
        });
        for opened in results {
            assert_eq!(opened, vec![true, false, true]);
        }
    }

    #[test]
    fn test_open_secrets_to_party() {
        let shares = [vec![5u64, 10], vec![7u64, u64::MAX]];
        let results = spawn_parties(2, move |me, mut comm| {
            comm.open_secrets_to_party_u64(0, &shares[me]).unwrap()
        });
        assert_eq!(results[0], vec![12, 9]); // wrapped sum
        assert_eq!(results[1], vec![0, 0]); // dummy at the sender
    }

    #[test]
    fn test_empty_open_skips_network() {
        let results = spawn_parties(2, |_, mut comm| {
            let opened = comm.open_secrets_to_all_bool(&[]).unwrap();
            (opened, comm.traffic_statistics())
        });
        for (opened, traffic) in results {
            assert!(opened.is_empty());
            assert_eq!(traffic, (0, 0));
        }
    }
}
