//! In-memory channels backed by crossbeam queues.
//!
//! These are the transport of choice for unit tests and benchmarks: each
//! party runs in its own thread and the queue endpoints are the only state
//! crossing thread boundaries.

use crossbeam::channel::{unbounded, Receiver, RecvError, SendError, Sender};
use std::collections::BTreeMap;
use std::io::{Error, ErrorKind, Read, Result, Write};

use super::{BoxedAgent, PartyId, SyncAgent};

pub struct QueueWriter(Sender<Vec<u8>>);

/// Reading side of a queue pair. Messages are framed by the sender's write
/// calls, so reads have to buffer the tail of a partially consumed message.
pub struct QueueReader {
    receiver: Receiver<Vec<u8>>,
    pending: Vec<u8>,
    offset: usize,
}

impl Write for QueueWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if let Err(SendError(v)) = self.0.send(buf.to_vec()) {
            return Err(Error::new(ErrorKind::BrokenPipe, SendError(v)));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Read for QueueReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.offset == self.pending.len() {
            match self.receiver.recv() {
                Ok(v) => {
                    self.pending = v;
                    self.offset = 0;
                }
                Err(RecvError) => return Err(Error::new(ErrorKind::BrokenPipe, RecvError)),
            }
        }
        let n = buf.len().min(self.pending.len() - self.offset);
        buf[..n].copy_from_slice(&self.pending[self.offset..self.offset + n]);
        self.offset += n;
        Ok(n)
    }
}

fn queue_pair() -> (QueueWriter, QueueReader) {
    let (s, r) = unbounded();
    (
        QueueWriter(s),
        QueueReader {
            receiver: r,
            pending: vec![],
            offset: 0,
        },
    )
}

/// An in-memory party communication agent.
pub type MemoryAgent = SyncAgent<QueueReader, QueueWriter>;

/// Create two connected in-memory agents.
pub fn memory_agent_pair() -> (MemoryAgent, MemoryAgent) {
    let (w1, r1) = queue_pair();
    let (w2, r2) = queue_pair();
    (SyncAgent::new(r1, w2), SyncAgent::new(r2, w1))
}

/// Create fully connected in-memory agents for `nparties` parties.
///
/// Returns one map per party, keyed by peer id, boxed so the maps can feed
/// straight into the engine communication adapter.
pub fn create_memory_agents(nparties: usize) -> Vec<BTreeMap<PartyId, BoxedAgent>> {
    let mut maps: Vec<BTreeMap<PartyId, BoxedAgent>> =
        (0..nparties).map(|_| BTreeMap::new()).collect();

    for i in 0..nparties {
        for j in (i + 1)..nparties {
            let (a, b) = memory_agent_pair();
            maps[i].insert(j, Box::new(a));
            maps[j].insert(i, Box::new(b));
        }
    }

    maps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel_utils::PartyCommunicationAgent;

    #[test]
    fn test_partial_reads_across_messages() {
        let (mut w, mut r) = queue_pair();

        let handle = std::thread::spawn(move || {
            let mut v = [0u8; 2];
            r.read_exact(&mut v).unwrap();
            assert_eq!(v, [1, 2]);

            // crosses the boundary of the first message
            let mut v = [0u8; 3];
            r.read_exact(&mut v).unwrap();
            assert_eq!(v, [3, 4, 5]);
        });

        w.write_all(&[1, 2, 3]).unwrap();
        w.write_all(&[4, 5]).unwrap();

        handle.join().unwrap();
    }

    #[test]
    fn test_broken_pipe() {
        let (w, mut r) = queue_pair();
        drop(w);

        let mut v = [0u8; 1];
        let e = r.read_exact(&mut v).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_nparty_mesh() {
        let nparties = 4;
        let maps = create_memory_agents(nparties);

        let handles = maps
            .into_iter()
            .enumerate()
            .map(|(me, mut agents)| {
                std::thread::spawn(move || {
                    for (peer, agent) in agents.iter_mut() {
                        if *peer < me {
                            agent.send_u64(&[me as u64]).unwrap();
                            assert_eq!(agent.receive_u64(1).unwrap(), vec![*peer as u64]);
                        } else {
                            assert_eq!(agent.receive_u64(1).unwrap(), vec![*peer as u64]);
                            agent.send_u64(&[me as u64]).unwrap();
                        }
                    }
                })
            })
            .collect::<Vec<_>>();

        for h in handles {
            h.join().unwrap();
        }
    }
}
