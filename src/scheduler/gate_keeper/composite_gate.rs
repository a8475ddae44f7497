//! Composite gates: one left input against `k` right inputs, `k` outputs.

use anyhow::Result;

use crate::engine::SecretShareEngine;
use crate::scheduler::wire_keeper::WireKeeper;
use crate::scheduler::{Boolean, WireId};

use super::SecretsByParty;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositeGateKind {
    FreeAnd,
    NonFreeAnd,
}

impl CompositeGateKind {
    pub fn is_free(self) -> bool {
        matches!(self, CompositeGateKind::FreeAnd)
    }
}

pub struct CompositeGate {
    kind: CompositeGateKind,
    outputs: Vec<WireId<Boolean>>,
    left: WireId<Boolean>,
    rights: Vec<WireId<Boolean>>,
    scheduled_result_index: usize,
}

impl CompositeGate {
    pub fn new(
        kind: CompositeGateKind,
        outputs: Vec<WireId<Boolean>>,
        left: WireId<Boolean>,
        rights: Vec<WireId<Boolean>>,
    ) -> Self {
        Self {
            kind,
            outputs,
            left,
            rights,
            scheduled_result_index: 0,
        }
    }

    pub fn number_of_results(&self) -> u64 {
        self.outputs.len() as u64
    }

    pub fn compute(
        &mut self,
        engine: &mut dyn SecretShareEngine,
        wires: &mut WireKeeper,
        _secrets: &mut SecretsByParty,
    ) -> Result<()> {
        match self.kind {
            CompositeGateKind::FreeAnd => {
                let left = wires.boolean_value(self.left)?;
                for (output, right) in self.outputs.iter().zip(&self.rights) {
                    let right = wires.boolean_value(*right)?;
                    wires.set_boolean_value(*output, engine.compute_free_and(left, right))?;
                }
            }

            CompositeGateKind::NonFreeAnd => {
                let left = wires.boolean_value(self.left)?;
                let rights = self
                    .rights
                    .iter()
                    .map(|r| wires.boolean_value(*r))
                    .collect::<Result<Vec<_>>>()?;
                self.scheduled_result_index = engine.schedule_composite_and(left, rights);
            }
        }
        Ok(())
    }

    pub fn collect_scheduled_result(
        &mut self,
        engine: &dyn SecretShareEngine,
        wires: &mut WireKeeper,
        _revealed: &SecretsByParty,
    ) -> Result<()> {
        if self.kind == CompositeGateKind::NonFreeAnd {
            let results = engine
                .composite_and_execution_result(self.scheduled_result_index)?
                .clone();
            for (output, value) in self.outputs.iter().zip(results) {
                wires.set_boolean_value(*output, value)?;
            }
        }
        Ok(())
    }

    pub fn retain_wires(&self, wires: &mut WireKeeper) -> Result<()> {
        for output in &self.outputs {
            wires.increase_reference_count(*output)?;
        }
        wires.increase_reference_count(self.left)?;
        for right in &self.rights {
            wires.increase_reference_count(*right)?;
        }
        Ok(())
    }

    pub fn release_wires(&self, wires: &mut WireKeeper) -> Result<()> {
        for output in &self.outputs {
            wires.decrease_reference_count(*output)?;
        }
        wires.decrease_reference_count(self.left)?;
        for right in &self.rights {
            wires.decrease_reference_count(*right)?;
        }
        Ok(())
    }
}

pub struct BatchCompositeGate {
    kind: CompositeGateKind,
    outputs: Vec<WireId<Boolean>>,
    left: WireId<Boolean>,
    rights: Vec<WireId<Boolean>>,
    scheduled_result_index: usize,
    number_of_results: u64,
}

impl BatchCompositeGate {
    pub fn new(
        kind: CompositeGateKind,
        outputs: Vec<WireId<Boolean>>,
        left: WireId<Boolean>,
        rights: Vec<WireId<Boolean>>,
    ) -> Self {
        Self {
            kind,
            outputs,
            left,
            rights,
            scheduled_result_index: 0,
            number_of_results: 0,
        }
    }

    pub fn number_of_results(&self) -> u64 {
        self.number_of_results
    }

    pub fn compute(
        &mut self,
        engine: &mut dyn SecretShareEngine,
        wires: &mut WireKeeper,
        _secrets: &mut SecretsByParty,
    ) -> Result<()> {
        match self.kind {
            CompositeGateKind::FreeAnd => {
                let left = wires.batch_boolean_value(self.left)?;
                self.number_of_results = (left.len() * self.rights.len()) as u64;
                for (output, right) in self.outputs.iter().zip(&self.rights) {
                    let right = wires.batch_boolean_value(*right)?;
                    wires.set_batch_boolean_value(
                        *output,
                        engine.compute_batch_free_and(&left, &right)?,
                    )?;
                }
            }

            CompositeGateKind::NonFreeAnd => {
                let left = wires.batch_boolean_value(self.left)?;
                let rights = self
                    .rights
                    .iter()
                    .map(|r| wires.batch_boolean_value(*r))
                    .collect::<Result<Vec<_>>>()?;
                self.number_of_results = (left.len() * self.rights.len()) as u64;
                if self.number_of_results > 0 {
                    self.scheduled_result_index =
                        engine.schedule_batch_composite_and(&left, rights)?;
                }
            }
        }
        Ok(())
    }

    pub fn collect_scheduled_result(
        &mut self,
        engine: &dyn SecretShareEngine,
        wires: &mut WireKeeper,
        _revealed: &SecretsByParty,
    ) -> Result<()> {
        if self.kind == CompositeGateKind::NonFreeAnd {
            if self.number_of_results == 0 {
                for output in &self.outputs {
                    wires.set_batch_boolean_value(*output, vec![])?;
                }
                return Ok(());
            }
            let results = engine
                .batch_composite_and_execution_result(self.scheduled_result_index)?
                .clone();
            for (output, values) in self.outputs.iter().zip(results) {
                wires.set_batch_boolean_value(*output, values)?;
            }
        }
        Ok(())
    }

    pub fn retain_wires(&self, wires: &mut WireKeeper) -> Result<()> {
        for output in &self.outputs {
            wires.increase_batch_reference_count(*output)?;
        }
        wires.increase_batch_reference_count(self.left)?;
        for right in &self.rights {
            wires.increase_batch_reference_count(*right)?;
        }
        Ok(())
    }

    pub fn release_wires(&self, wires: &mut WireKeeper) -> Result<()> {
        for output in &self.outputs {
            wires.decrease_batch_reference_count(*output)?;
        }
        wires.decrease_batch_reference_count(self.left)?;
        for right in &self.rights {
            wires.decrease_batch_reference_count(*right)?;
        }
        Ok(())
    }
}
