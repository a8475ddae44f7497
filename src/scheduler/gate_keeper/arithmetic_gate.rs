//! Integer gates over additive shares, scalar and batch.

use anyhow::{Context, Result};

use crate::channel_utils::PartyId;
use crate::engine::SecretShareEngine;
use crate::scheduler::wire_keeper::WireKeeper;
use crate::scheduler::{Arithmetic, WireId};

use super::{required, SecretsByParty};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithmeticGateKind {
    Input,
    Output,
    SymmetricPlus,
    AsymmetricPlus,
    // negation distributes over additive shares, so one symmetric kind
    // covers private and public wires alike
    Neg,
    FreeMult,
    NonFreeMult,
}

impl ArithmeticGateKind {
    pub fn is_free(self) -> bool {
        !matches!(
            self,
            ArithmeticGateKind::Output | ArithmeticGateKind::NonFreeMult
        )
    }
}

pub struct ArithmeticGate {
    kind: ArithmeticGateKind,
    output: WireId<Arithmetic>,
    left: Option<WireId<Arithmetic>>,
    right: Option<WireId<Arithmetic>>,
    party: PartyId,
    scheduled_result_index: usize,
}

impl ArithmeticGate {
    pub fn new(
        kind: ArithmeticGateKind,
        output: WireId<Arithmetic>,
        left: Option<WireId<Arithmetic>>,
        right: Option<WireId<Arithmetic>>,
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
            ArithmeticGateKind::Input => {}

            ArithmeticGateKind::SymmetricPlus => {
                let left = wires.integer_value(required(self.left)?)?;
                let right = wires.integer_value(required(self.right)?)?;
                wires.set_integer_value(self.output, engine.compute_symmetric_plus(left, right))?;
            }

            ArithmeticGateKind::AsymmetricPlus => {
                let left = wires.integer_value(required(self.left)?)?;
                let right = wires.integer_value(required(self.right)?)?;
                wires
                    .set_integer_value(self.output, engine.compute_asymmetric_plus(left, right))?;
            }

            ArithmeticGateKind::Neg => {
                let input = wires.integer_value(required(self.left)?)?;
                wires.set_integer_value(self.output, engine.compute_symmetric_neg(input))?;
            }

            ArithmeticGateKind::FreeMult => {
                let left = wires.integer_value(required(self.left)?)?;
                let right = wires.integer_value(required(self.right)?)?;
                wires.set_integer_value(self.output, engine.compute_free_mult(left, right))?;
            }

            ArithmeticGateKind::Output => {
                let share = wires.integer_value(required(self.left)?)?;
                let party_secrets = secrets.entry(self.party).or_default();
                self.scheduled_result_index = party_secrets.integers.len();
                party_secrets.integers.push(share);
            }

            ArithmeticGateKind::NonFreeMult => {
                let left = wires.integer_value(required(self.left)?)?;
                let right = wires.integer_value(required(self.right)?)?;
                self.scheduled_result_index = engine.schedule_mult(left, right);
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
            ArithmeticGateKind::NonFreeMult => {
                let value = engine.mult_execution_result(self.scheduled_result_index)?;
                wires.set_integer_value(self.output, value)?;
            }

            ArithmeticGateKind::Output => {
                let value = revealed
                    .get(&self.party)
                    .and_then(|s| s.integers.get(self.scheduled_result_index))
                    .copied()
                    .with_context(|| {
                        format!("no revealed secret for party {}", self.party)
                    })?;
                wires.set_integer_value(self.output, value)?;
            }

            _ => {}
        }
        Ok(())
    }

    pub fn retain_wires(&self, wires: &mut WireKeeper) -> Result<()> {
        wires.increase_integer_reference_count(self.output)?;
        for wire in [self.left, self.right].into_iter().flatten() {
            wires.increase_integer_reference_count(wire)?;
        }
        Ok(())
    }

    pub fn release_wires(&self, wires: &mut WireKeeper) -> Result<()> {
        wires.decrease_integer_reference_count(self.output)?;
        for wire in [self.left, self.right].into_iter().flatten() {
            wires.decrease_integer_reference_count(wire)?;
        }
        Ok(())
    }
}

pub struct BatchArithmeticGate {
    kind: ArithmeticGateKind,
    output: WireId<Arithmetic>,
    left: Option<WireId<Arithmetic>>,
    right: Option<WireId<Arithmetic>>,
    party: PartyId,
    scheduled_result_index: usize,
    number_of_results: u64,
}

impl BatchArithmeticGate {
    pub fn new(
        kind: ArithmeticGateKind,
        output: WireId<Arithmetic>,
        left: Option<WireId<Arithmetic>>,
        right: Option<WireId<Arithmetic>>,
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
            ArithmeticGateKind::Input => {}

            ArithmeticGateKind::SymmetricPlus => {
                let left = wires.batch_integer_value(required(self.left)?)?;
                let right = wires.batch_integer_value(required(self.right)?)?;
                self.number_of_results = left.len() as u64;
                wires.set_batch_integer_value(
                    self.output,
                    engine.compute_batch_symmetric_plus(&left, &right)?,
                )?;
            }

            ArithmeticGateKind::AsymmetricPlus => {
                let left = wires.batch_integer_value(required(self.left)?)?;
                let right = wires.batch_integer_value(required(self.right)?)?;
                self.number_of_results = left.len() as u64;
                wires.set_batch_integer_value(
                    self.output,
                    engine.compute_batch_asymmetric_plus(&left, &right)?,
                )?;
            }

            ArithmeticGateKind::Neg => {
                let input = wires.batch_integer_value(required(self.left)?)?;
                self.number_of_results = input.len() as u64;
                wires.set_batch_integer_value(
                    self.output,
                    engine.compute_batch_symmetric_neg(&input),
                )?;
            }

            ArithmeticGateKind::FreeMult => {
                let left = wires.batch_integer_value(required(self.left)?)?;
                let right = wires.batch_integer_value(required(self.right)?)?;
                self.number_of_results = left.len() as u64;
                wires.set_batch_integer_value(
                    self.output,
                    engine.compute_batch_free_mult(&left, &right)?,
                )?;
            }

            ArithmeticGateKind::Output => {
                let shares = wires.batch_integer_value(required(self.left)?)?;
                self.number_of_results = shares.len() as u64;
                let party_secrets = secrets.entry(self.party).or_default();
                self.scheduled_result_index = party_secrets.integers.len();
                party_secrets.integers.extend(shares);
            }

            ArithmeticGateKind::NonFreeMult => {
                let left = wires.batch_integer_value(required(self.left)?)?;
                let right = wires.batch_integer_value(required(self.right)?)?;
                self.number_of_results = left.len() as u64;
                if self.number_of_results > 0 {
                    self.scheduled_result_index = engine.schedule_batch_mult(&left, &right)?;
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
            ArithmeticGateKind::NonFreeMult => {
                let values = if self.number_of_results == 0 {
                    vec![]
                } else {
                    engine
                        .batch_mult_execution_result(self.scheduled_result_index)?
                        .clone()
                };
                wires.set_batch_integer_value(self.output, values)?;
            }

            ArithmeticGateKind::Output => {
                let n = self.number_of_results as usize;
                let start = self.scheduled_result_index;
                let all = revealed
                    .get(&self.party)
                    .map(|s| &s.integers)
                    .with_context(|| {
                        format!("no revealed secrets for party {}", self.party)
                    })?;
                let values = all
                    .get(start..start + n)
                    .with_context(|| "revealed secrets are shorter than expected")?
                    .to_vec();
                wires.set_batch_integer_value(self.output, values)?;
            }

            _ => {}
        }
        Ok(())
    }

    pub fn retain_wires(&self, wires: &mut WireKeeper) -> Result<()> {
        wires.increase_batch_integer_reference_count(self.output)?;
        for wire in [self.left, self.right].into_iter().flatten() {
            wires.increase_batch_integer_reference_count(wire)?;
        }
        Ok(())
    }

    pub fn release_wires(&self, wires: &mut WireKeeper) -> Result<()> {
        wires.decrease_batch_integer_reference_count(self.output)?;
        for wire in [self.left, self.right].into_iter().flatten() {
            wires.decrease_batch_integer_reference_count(wire)?;
        }
        Ok(())
    }
}
