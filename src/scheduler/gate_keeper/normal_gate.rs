//! One- and two-input boolean gates, scalar and batch.

use anyhow::{Context, Result};

use crate::channel_utils::PartyId;
use crate::engine::SecretShareEngine;
use crate::scheduler::wire_keeper::WireKeeper;
use crate::scheduler::{Boolean, WireId};

use super::{required, SecretsByParty};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NormalGateKind {
    Input,
    Output,
    FreeAnd,
    NonFreeAnd,
    SymmetricXor,
    AsymmetricXor,
    SymmetricNot,
    AsymmetricNot,
}

impl NormalGateKind {
    pub fn is_free(self) -> bool {
        !matches!(self, NormalGateKind::Output | NormalGateKind::NonFreeAnd)
    }
}

pub struct NormalGate {
    kind: NormalGateKind,
    output: WireId<Boolean>,
    left: Option<WireId<Boolean>>,
    right: Option<WireId<Boolean>>,
    party: PartyId,
    scheduled_result_index: usize,
}

impl NormalGate {
    pub fn new(
        kind: NormalGateKind,
        output: WireId<Boolean>,
        left: Option<WireId<Boolean>>,
        right: Option<WireId<Boolean>>,
        party: PartyId,
    ) -> Self {
        Self {
            kind,
            output,
            left,
            right,
            party,
            scheduled_result_index: 0,
        }
    }

    pub fn number_of_results(&self) -> u64 {
        1
    }

    pub fn compute(
        &mut self,
        engine: &mut dyn SecretShareEngine,
        wires: &mut WireKeeper,
        secrets: &mut SecretsByParty,
    ) -> Result<()> {
        match self.kind {
            NormalGateKind::Input => {}

            NormalGateKind::SymmetricXor => {
                let left = wires.boolean_value(required(self.left)?)?;
                let right = wires.boolean_value(required(self.right)?)?;
                wires.set_boolean_value(self.output, engine.compute_symmetric_xor(left, right))?;
            }

            NormalGateKind::AsymmetricXor => {
                let left = wires.boolean_value(required(self.left)?)?;
                let right = wires.boolean_value(required(self.right)?)?;
                wires.set_boolean_value(self.output, engine.compute_asymmetric_xor(left, right))?;
            }

            NormalGateKind::SymmetricNot => {
                let input = wires.boolean_value(required(self.left)?)?;
                wires.set_boolean_value(self.output, engine.compute_symmetric_not(input))?;
            }

            NormalGateKind::AsymmetricNot => {
                let input = wires.boolean_value(required(self.left)?)?;
                wires.set_boolean_value(self.output, engine.compute_asymmetric_not(input))?;
            }

            NormalGateKind::FreeAnd => {
                let left = wires.boolean_value(required(self.left)?)?;
                let right = wires.boolean_value(required(self.right)?)?;
                wires.set_boolean_value(self.output, engine.compute_free_and(left, right))?;
            }

            NormalGateKind::Output => {
                let share = wires.boolean_value(required(self.left)?)?;
                let party_secrets = secrets.entry(self.party).or_default();
                self.scheduled_result_index = party_secrets.booleans.len();
                party_secrets.booleans.push(share);
            }

            NormalGateKind::NonFreeAnd => {
                let left = wires.boolean_value(required(self.left)?)?;
                let right = wires.boolean_value(required(self.right)?)?;
                self.scheduled_result_index = engine.schedule_and(left, right);
            }
        }
        Ok(())
    }

    pub fn collect_scheduled_result(
        &mut self,
        engine: &dyn SecretShareEngine,
        wires: &mut WireKeeper,
        revealed: &SecretsByParty,
    ) -> Result<()> {
        match self.kind {
            NormalGateKind::NonFreeAnd => {
                let value = engine.and_execution_result(self.scheduled_result_index)?;
                wires.set_boolean_value(self.output, value)?;
            }

            NormalGateKind::Output => {
                let value = revealed
                    .get(&self.party)
                    .and_then(|s| s.booleans.get(self.scheduled_result_index))
                    .copied()
                    .with_context(|| {
                        format!("no revealed secret for party {}", self.party)
                    })?;
                wires.set_boolean_value(self.output, value)?;
            }

            _ => {}
        }
        Ok(())
    }

    pub fn retain_wires(&self, wires: &mut WireKeeper) -> Result<()> {
        wires.increase_reference_count(self.output)?;
        for wire in [self.left, self.right].into_iter().flatten() {
            wires.increase_reference_count(wire)?;
        }
        Ok(())
    }

    pub fn release_wires(&self, wires: &mut WireKeeper) -> Result<()> {
        wires.decrease_reference_count(self.output)?;
        for wire in [self.left, self.right].into_iter().flatten() {
            wires.decrease_reference_count(wire)?;
        }
        Ok(())
    }
}

pub struct BatchNormalGate {
    kind: NormalGateKind,
    output: WireId<Boolean>,
    left: Option<WireId<Boolean>>,
    right: Option<WireId<Boolean>>,
    party: PartyId,
    scheduled_result_index: usize,
    number_of_results: u64,
}

impl BatchNormalGate {
    /// `number_of_results` only matters for input gates, whose batch size
    /// is known at construction; every other kind resolves it at compute.
    pub fn new(
        kind: NormalGateKind,
        output: WireId<Boolean>,
        left: Option<WireId<Boolean>>,
        right: Option<WireId<Boolean>>,
        party: PartyId,
        number_of_results: u64,
    ) -> Self {
        Self {
            kind,
            output,
            left,
            right,
            party,
            scheduled_result_index: 0,
            number_of_results,
        }
    }

    pub fn number_of_results(&self) -> u64 {
        self.number_of_results
    }

    pub fn compute(
        &mut self,
        engine: &mut dyn SecretShareEngine,
        wires: &mut WireKeeper,
        secrets: &mut SecretsByParty,
    ) -> Result<()> {
        match self.kind {
            NormalGateKind::Input => {}

            NormalGateKind::SymmetricXor => {
                let left = wires.batch_boolean_value(required(self.left)?)?;
                let right = wires.batch_boolean_value(required(self.right)?)?;
                self.number_of_results = left.len() as u64;
                wires.set_batch_boolean_value(
                    self.output,
                    engine.compute_batch_symmetric_xor(&left, &right)?,
                )?;
            }

            NormalGateKind::AsymmetricXor => {
                let left = wires.batch_boolean_value(required(self.left)?)?;
                let right = wires.batch_boolean_value(required(self.right)?)?;
                self.number_of_results = left.len() as u64;
                wires.set_batch_boolean_value(
                    self.output,
                    engine.compute_batch_asymmetric_xor(&left, &right)?,
                )?;
            }

            NormalGateKind::SymmetricNot => {
                let input = wires.batch_boolean_value(required(self.left)?)?;
                self.number_of_results = input.len() as u64;
                wires.set_batch_boolean_value(
                    self.output,
                    engine.compute_batch_symmetric_not(&input),
                )?;
            }

            NormalGateKind::AsymmetricNot => {
                let input = wires.batch_boolean_value(required(self.left)?)?;
                self.number_of_results = input.len() as u64;
                wires.set_batch_boolean_value(
                    self.output,
                    engine.compute_batch_asymmetric_not(&input),
                )?;
            }

            NormalGateKind::FreeAnd => {
                let left = wires.batch_boolean_value(required(self.left)?)?;
                let right = wires.batch_boolean_value(required(self.right)?)?;
                self.number_of_results = left.len() as u64;
                wires.set_batch_boolean_value(
                    self.output,
                    engine.compute_batch_free_and(&left, &right)?,
                )?;
            }

            NormalGateKind::Output => {
                let shares = wires.batch_boolean_value(required(self.left)?)?;
                self.number_of_results = shares.len() as u64;
                let party_secrets = secrets.entry(self.party).or_default();
                self.scheduled_result_index = party_secrets.booleans.len();
                party_secrets.booleans.extend(shares);
            }

            NormalGateKind::NonFreeAnd => {
                let left = wires.batch_boolean_value(required(self.left)?)?;
                let right = wires.batch_boolean_value(required(self.right)?)?;
                self.number_of_results = left.len() as u64;
                if self.number_of_results > 0 {
                    self.scheduled_result_index = engine.schedule_batch_and(&left, &right)?;
                }
            }
        }
        Ok(())
    }

    pub fn collect_scheduled_result(
        &mut self,
        engine: &dyn SecretShareEngine,
        wires: &mut WireKeeper,
        revealed: &SecretsByParty,
    ) -> Result<()> {
        match self.kind {
            NormalGateKind::NonFreeAnd => {
                let values = if self.number_of_results == 0 {
                    vec![]
                } else {
                    engine
                        .batch_and_execution_result(self.scheduled_result_index)?
                        .clone()
                };
                wires.set_batch_boolean_value(self.output, values)?;
            }

            NormalGateKind::Output => {
                let n = self.number_of_results as usize;
                let start = self.scheduled_result_index;
                let all = revealed
                    .get(&self.party)
                    .map(|s| &s.booleans)
                    .with_context(|| {
                        format!("no revealed secrets for party {}", self.party)
                    })?;
                let values = all
                    .get(start..start + n)
                    .with_context(|| "revealed secrets are shorter than expected")?
                    .to_vec();
                wires.set_batch_boolean_value(self.output, values)?;
            }

            _ => {}
        }
        Ok(())
    }

    pub fn retain_wires(&self, wires: &mut WireKeeper) -> Result<()> {
        wires.increase_batch_reference_count(self.output)?;
        for wire in [self.left, self.right].into_iter().flatten() {
            wires.increase_batch_reference_count(wire)?;
        }
        Ok(())
    }

    pub fn release_wires(&self, wires: &mut WireKeeper) -> Result<()> {
        wires.decrease_batch_reference_count(self.output)?;
        for wire in [self.left, self.right].into_iter().flatten() {
            wires.decrease_batch_reference_count(wire)?;
        }
        Ok(())
    }
}
