//! Channel utilities. Channels are the ordered point-to-point byte pipes
//! parties communicate over.
//!
//! [PartyCommunicationAgent] is the typed surface the rest of the runtime
//! sees: vectors of bools (bit-packed on the wire), vectors of u64, single
//! values, and 128-bit PRG seed records. The wire format is private to the
//! agent; peers only need to agree on the element counts, which the lockstep
//! circuit-submission discipline guarantees.
//!
//! [SyncAgent] is the single implementation, generic over a blocking
//! reader/writer pair. [tcp_channel] builds it on sockets, [memory_channel]
//! on crossbeam queues for in-process tests and benches.

use anyhow::{Context, Result};
use std::io::{Read, Write};

pub mod memory_channel;
pub mod tcp_channel;

/// usize is used as a party ID. Parties are numbered from 0.
pub type PartyId = usize;

/// A 128-bit PRG seed record, exchanged once per peer during engine setup.
pub type PrgSeed = [u8; 16];

/// Ordered, blocking, typed channel to exactly one peer.
///
/// Sends and receives on the same direction preserve order; cross-direction
/// ordering is not guaranteed. Any I/O error is fatal and partial transfers
/// never escape the agent.
pub trait PartyCommunicationAgent {
    /// Send a vector of bools, bit-packed to 8 per byte.
    fn send_bool(&mut self, v: &[bool]) -> Result<()>;

    /// Receive `n` bools previously sent with [Self::send_bool].
    fn receive_bool(&mut self, n: usize) -> Result<Vec<bool>>;

    /// Send a vector of u64, little-endian.
    fn send_u64(&mut self, v: &[u64]) -> Result<()>;

    /// Receive `n` u64 previously sent with [Self::send_u64].
    fn receive_u64(&mut self, n: usize) -> Result<Vec<u64>>;

    /// Send one bool as a fixed single-byte record.
    fn send_single_bool(&mut self, v: bool) -> Result<()>;

    /// Receive one bool sent with [Self::send_single_bool].
    fn receive_single_bool(&mut self) -> Result<bool>;

    /// Send one u64 as a fixed record.
    fn send_single_u64(&mut self, v: u64) -> Result<()>;

    /// Receive one u64 sent with [Self::send_single_u64].
    fn receive_single_u64(&mut self) -> Result<u64>;

    /// Send a 128-bit PRG seed record.
    fn send_key(&mut self, key: PrgSeed) -> Result<()>;

    /// Receive a 128-bit PRG seed record.
    fn receive_key(&mut self) -> Result<PrgSeed>;

    /// Return (bytes sent, bytes received) over the lifetime of the agent.
    fn traffic_statistics(&self) -> (u64, u64);
}

/// Boxed agent, `Send` so a whole party setup can move into its own thread.
pub type BoxedAgent = Box<dyn PartyCommunicationAgent + Send>;

pub(crate) fn pack_bits(v: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; v.len().div_ceil(8)];
    for (i, &bit) in v.iter().enumerate() {
        if bit {
            bytes[i / 8] |= 1 << (i % 8);
        }
    }
    bytes
}

pub(crate) fn unpack_bits(bytes: &[u8], n: usize) -> Vec<bool> {
    (0..n).map(|i| (bytes[i / 8] >> (i % 8)) & 1 == 1).collect()
}

/// Blocking agent over any reader/writer pair, with traffic accounting.
pub struct SyncAgent<R, W> {
    reader: R,
    writer: W,
    bytes_sent: u64,
    bytes_received: u64,
}

impl<R: Read, W: Write> SyncAgent<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            bytes_sent: 0,
            bytes_received: 0,
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer
            .write_all(bytes)
            .with_context(|| format!("@{}:{}", file!(), line!()))?;
        self.writer
            .flush()
            .with_context(|| format!("@{}:{}", file!(), line!()))?;
        self.bytes_sent += bytes.len() as u64;
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.reader
            .read_exact(buf)
            .with_context(|| format!("@{}:{}", file!(), line!()))?;
        self.bytes_received += buf.len() as u64;
        Ok(())
    }
}

impl<R: Read, W: Write> PartyCommunicationAgent for SyncAgent<R, W> {
    fn send_bool(&mut self, v: &[bool]) -> Result<()> {
        if v.is_empty() {
            return Ok(());
        }
        self.write_all(&pack_bits(v))
    }

    fn receive_bool(&mut self, n: usize) -> Result<Vec<bool>> {
        if n == 0 {
            return Ok(vec![]);
        }
        let mut buf = vec![0u8; n.div_ceil(8)];
        self.read_exact(&mut buf)?;
        Ok(unpack_bits(&buf, n))
    }

    fn send_u64(&mut self, v: &[u64]) -> Result<()> {
        if v.is_empty() {
            return Ok(());
        }
        let mut bytes = Vec::with_capacity(v.len() * 8);
        for x in v {
            bytes.extend_from_slice(&x.to_le_bytes());
        }
        self.write_all(&bytes)
    }

    fn receive_u64(&mut self, n: usize) -> Result<Vec<u64>> {
        if n == 0 {
            return Ok(vec![]);
        }
        let mut buf = vec![0u8; n * 8];
        self.read_exact(&mut buf)?;
        Ok(buf
            .chunks_exact(8)
            .map(|c| u64::from_le_bytes(c.try_into().unwrap()))
            .collect())
    }

    fn send_single_bool(&mut self, v: bool) -> Result<()> {
        self.write_all(&[v as u8])
    }

    fn receive_single_bool(&mut self) -> Result<bool> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0] != 0)
    }

    fn send_single_u64(&mut self, v: u64) -> Result<()> {
        self.write_all(&v.to_le_bytes())
    }

    fn receive_single_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    fn send_key(&mut self, key: PrgSeed) -> Result<()> {
        self.write_all(&key)
    }

    fn receive_key(&mut self) -> Result<PrgSeed> {
        let mut buf = [0u8; 16];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn traffic_statistics(&self) -> (u64, u64) {
        (self.bytes_sent, self.bytes_received)
    }
}
