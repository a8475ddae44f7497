//! Module about tcp channels. See [TcpStream].
//!
//! Each party binds its own listening address, connects to every peer with a
//! lower id, and accepts connections from every peer with a higher id. A
//! small id handshake on each fresh stream tells the accepting side who is
//! on the other end, so the resulting agent map is keyed by peer id no
//! matter in which order connections land.

use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::sleep;
use std::time::Duration;

use super::{BoxedAgent, PartyId, SyncAgent};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A party communication agent over a TCP socket.
pub type TcpAgent = SyncAgent<BufReader<TcpStream>, BufWriter<TcpStream>>;

/// Where each party listens. Party id -> (host, port).
pub type AddressMap = BTreeMap<PartyId, (String, u16)>;

/// Localhost address map for `nparties` parties on consecutive ports,
/// handy for tests and benchmarks.
pub fn local_addresses(nparties: usize, base_port: u16) -> AddressMap {
    (0..nparties)
        .map(|i| (i, ("127.0.0.1".to_string(), base_port + i as u16)))
        .collect()
}

/// Connect party `me` to every peer in `addresses`.
///
/// Blocks until the full mesh is up. All parties must call this with the
/// same address map.
pub fn create_tcp_agents(addresses: &AddressMap, me: PartyId) -> Result<BTreeMap<PartyId, BoxedAgent>> {
    let nparties = addresses.len();
    if !addresses.contains_key(&me) {
        bail!("party {} is not in the address map", me);
    }

    let (host, port) = &addresses[&me];
    let listener = TcpListener::bind((host.as_str(), *port))
        .with_context(|| format!("me={} addr={}:{} @{}:{}", me, host, port, file!(), line!()))?;

    // Give lower-id parties a head start binding their listeners.
    sleep(Duration::from_millis(100 * me as u64));

    let mut streams = addresses
        .iter()
        .filter(|(peer, _)| **peer < me)
        .map(|(peer, (host, port))| {
            let addr: SocketAddr = format!("{}:{}", host, port)
                .parse()
                .with_context(|| format!("@{}:{}", file!(), line!()))?;
            let mut stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
                .with_context(|| format!("me={} addr={} @{}:{}", me, addr, file!(), line!()))?;
            stream
                .write_all(&me.to_be_bytes())
                .with_context(|| format!("@{}:{}", file!(), line!()))?;
            let mut buf = [0u8; 8];
            stream
                .read_exact(&mut buf)
                .with_context(|| format!("@{}:{}", file!(), line!()))?;
            let them = usize::from_be_bytes(buf);
            if them != *peer {
                bail!("expected peer {} on {}, got {}", peer, addr, them);
            }
            Ok((them, stream))
        })
        .collect::<Result<Vec<(PartyId, TcpStream)>>>()?;

    let accepted = listener
        .incoming()
        .take(nparties - 1 - me)
        .map(|s| {
            let mut s = s.with_context(|| format!("@{}:{}", file!(), line!()))?;
            let mut buf = [0u8; 8];
            s.read_exact(&mut buf)
                .with_context(|| format!("@{}:{}", file!(), line!()))?;
            let them = usize::from_be_bytes(buf);
            s.write_all(&me.to_be_bytes())
                .with_context(|| format!("@{}:{}", file!(), line!()))?;
            Ok((them, s))
        })
        .collect::<Result<Vec<_>>>()?;

    streams.extend(accepted);

    streams
        .into_iter()
        .map(|(them, s)| {
            let reading_half = s
                .try_clone()
                .with_context(|| format!("@{}:{}", file!(), line!()))?;
            let agent: BoxedAgent = Box::new(SyncAgent::new(
                BufReader::new(reading_half),
                BufWriter::new(s),
            ));
            Ok((them, agent))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel_utils::PartyCommunicationAgent;

    fn test_nparty(nparties: usize, base_port: u16) {
        let addresses = local_addresses(nparties, base_port);

        let handles = (0..nparties)
            .map(|me| {
                let addresses = addresses.clone();
                std::thread::spawn(move || {
                    let mut agents = create_tcp_agents(&addresses, me).unwrap();
                    assert_eq!(agents.len(), nparties - 1);

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

    #[test]
    fn test_2party() {
        test_nparty(2, 24000);
    }

    #[test]
    fn test_3party() {
        test_nparty(3, 24100);
    }
}
