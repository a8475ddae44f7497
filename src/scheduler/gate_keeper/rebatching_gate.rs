//! Rebatching gates move values between batch wires without computing
//! anything. They are always free, and because the rest of the circuit is
//! deferred, the move itself must be deferred the same way.

use anyhow::Result;

use crate::engine::SecretShareEngine;
use crate::errors::RuntimeError;
use crate::scheduler::wire_keeper::WireKeeper;
use crate::scheduler::{Boolean, WireId};

use super::SecretsByParty;

pub enum RebatchingGate {
    /// Concatenate a number of batches into one batch.
    Batching {
        srcs: Vec<WireId<Boolean>>,
        dst: WireId<Boolean>,
    },
    /// Split one batch into consecutive chunks of the given sizes.
    Unbatching {
        src: WireId<Boolean>,
        dsts: Vec<WireId<Boolean>>,
        strategy: Vec<u32>,
    },
}

impl RebatchingGate {
    pub fn number_of_results(&self) -> u64 {
        0
    }

    pub fn compute(
        &mut self,
        _engine: &mut dyn SecretShareEngine,
        wires: &mut WireKeeper,
        _secrets: &mut SecretsByParty,
    ) -> Result<()> {
        match self {
            RebatchingGate::Batching { srcs, dst } => {
                let mut banded = vec![];
                for src in srcs.iter() {
                    banded.extend(wires.batch_boolean_value(*src)?);
                }
                wires.set_batch_boolean_value(*dst, banded)?;
            }

            RebatchingGate::Unbatching {
                src,
                dsts,
                strategy,
            } => {
                let values = wires.batch_boolean_value(*src)?;
                let total: usize = strategy.iter().map(|n| *n as usize).sum();
                if total != values.len() {
                    return Err(RuntimeError::InvalidArgument(format!(
                        "unbatching strategy covers {} values, wire holds {}",
                        total,
                        values.len()
                    ))
                    .into());
                }
                let mut cursor = 0;
                for (dst, n) in dsts.iter().zip(strategy.iter()) {
                    let n = *n as usize;
                    wires.set_batch_boolean_value(*dst, values[cursor..cursor + n].to_vec())?;
                    cursor += n;
                }
            }
        }
        Ok(())
    }

    pub fn collect_scheduled_result(
        &mut self,
        _engine: &dyn SecretShareEngine,
        _wires: &mut WireKeeper,
        _revealed: &SecretsByParty,
    ) -> Result<()> {
        Ok(())
    }

    fn all_wires(&self) -> Vec<WireId<Boolean>> {
        match self {
            RebatchingGate::Batching { srcs, dst } => {
                let mut wires = srcs.clone();
                wires.push(*dst);
                wires
            }
            RebatchingGate::Unbatching { src, dsts, .. } => {
                let mut wires = dsts.clone();
                wires.push(*src);
                wires
            }
        }
    }

    pub fn retain_wires(&self, wires: &mut WireKeeper) -> Result<()> {
        for wire in self.all_wires() {
            wires.increase_batch_reference_count(wire)?;
        }
        Ok(())
    }

    pub fn release_wires(&self, wires: &mut WireKeeper) -> Result<()> {
        for wire in self.all_wires() {
            wires.decrease_batch_reference_count(wire)?;
        }
        Ok(())
    }
}
