//! Scheduler that executes every non-free operation immediately.
//!
//! One engine roundtrip per non-free gate: simple and predictable, but
//! latency-bound. The lazy scheduler exists because of this variant's
//! traffic pattern.

use anyhow::Result;
use std::rc::Rc;

use crate::channel_utils::PartyId;
use crate::engine::SecretShareEngine;
use crate::errors::RuntimeError;
use crate::metrics::{GateStatsRecorder, MetricRecorder};
use crate::scheduler::wire_keeper::WireKeeper;
use crate::scheduler::{Arithmetic, ArithmeticScheduler, Boolean, Scheduler, WireId};

pub struct EagerScheduler {
    engine: Box<dyn SecretShareEngine>,
    wire_keeper: WireKeeper,
    stats: Rc<GateStatsRecorder>,
}

impl EagerScheduler {
    pub fn new(engine: Box<dyn SecretShareEngine>, wire_keeper: WireKeeper) -> Self {
        Self {
            engine,
            wire_keeper,
            stats: Rc::new(GateStatsRecorder::new("gates")),
        }
    }

    /// The recorder backing [Scheduler::gate_statistics], for collectors.
    pub fn metrics_recorder(&self) -> Rc<dyn MetricRecorder> {
        self.stats.clone()
    }

    fn check_opened_count(expected: usize, got: usize) -> Result<()> {
        if expected != got {
            return Err(RuntimeError::Protocol(format!(
                "unexpected number of revealed secrets: {} instead of {}",
                got, expected
            ))
            .into());
        }
        Ok(())
    }
}

impl Scheduler for EagerScheduler {
    fn private_boolean_input(&mut self, v: bool, party: PartyId) -> Result<WireId<Boolean>> {
        self.stats.add_free(1);
        let share = self.engine.set_input(party, Some(v))?;
        Ok(self.wire_keeper.allocate_boolean_value(share, 0))
    }

    fn private_boolean_input_batch(
        &mut self,
        v: &[bool],
        party: PartyId,
    ) -> Result<WireId<Boolean>> {
        self.stats.add_free(v.len() as u64);
        let shares = self.engine.set_batch_input(party, v)?;
        Ok(self.wire_keeper.allocate_batch_boolean_value(shares, 0))
    }

    fn public_boolean_input(&mut self, v: bool) -> Result<WireId<Boolean>> {
        self.stats.add_free(1);
        Ok(self.wire_keeper.allocate_boolean_value(v, 0))
    }

    fn public_boolean_input_batch(&mut self, v: &[bool]) -> Result<WireId<Boolean>> {
        self.stats.add_free(v.len() as u64);
        Ok(self.wire_keeper.allocate_batch_boolean_value(v.to_vec(), 0))
    }

    fn recover_boolean_wire(&mut self, share: bool) -> Result<WireId<Boolean>> {
        self.stats.add_free(1);
        Ok(self.wire_keeper.allocate_boolean_value(share, 0))
    }

    fn recover_boolean_wire_batch(&mut self, shares: &[bool]) -> Result<WireId<Boolean>> {
        self.stats.add_free(shares.len() as u64);
        Ok(self
            .wire_keeper
            .allocate_batch_boolean_value(shares.to_vec(), 0))
    }

    fn open_boolean_value_to_party(
        &mut self,
        src: WireId<Boolean>,
        party: PartyId,
    ) -> Result<WireId<Boolean>> {
        self.stats.add_non_free(1);
        let shares = vec![self.wire_keeper.boolean_value(src)?];
        let revealed = self.engine.reveal_to_party_bool(party, &shares)?;
        Self::check_opened_count(1, revealed.len())?;
        Ok(self.wire_keeper.allocate_boolean_value(revealed[0], 0))
    }

    fn open_boolean_value_to_party_batch(
        &mut self,
        src: WireId<Boolean>,
        party: PartyId,
    ) -> Result<WireId<Boolean>> {
        let shares = self.wire_keeper.batch_boolean_value(src)?;
        self.stats.add_non_free(shares.len() as u64);
        let revealed = self.engine.reveal_to_party_bool(party, &shares)?;
        Self::check_opened_count(shares.len(), revealed.len())?;
        Ok(self.wire_keeper.allocate_batch_boolean_value(revealed, 0))
    }

    fn extract_boolean_secret_share(&mut self, id: WireId<Boolean>) -> Result<bool> {
        self.wire_keeper.boolean_value(id)
    }

    fn extract_boolean_secret_share_batch(&mut self, id: WireId<Boolean>) -> Result<Vec<bool>> {
        self.wire_keeper.batch_boolean_value(id)
    }

    fn get_boolean_value(&mut self, id: WireId<Boolean>) -> Result<bool> {
        self.wire_keeper.boolean_value(id)
    }

    fn get_boolean_value_batch(&mut self, id: WireId<Boolean>) -> Result<Vec<bool>> {
        self.wire_keeper.batch_boolean_value(id)
    }

    fn private_and_private(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        self.stats.add_non_free(1);
        let l = self.wire_keeper.boolean_value(left)?;
        let r = self.wire_keeper.boolean_value(right)?;
        let index = self.engine.schedule_and(l, r);
        self.engine.execute_scheduled_operations()?;
        let share = self.engine.and_execution_result(index)?;
        Ok(self.wire_keeper.allocate_boolean_value(share, 0))
    }

    fn private_and_private_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        let l = self.wire_keeper.batch_boolean_value(left)?;
        let r = self.wire_keeper.batch_boolean_value(right)?;
        self.stats.add_non_free(l.len() as u64);
        let shares = self.engine.compute_batch_and_immediately(&l, &r)?;
        Ok(self.wire_keeper.allocate_batch_boolean_value(shares, 0))
    }

    fn private_and_public(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        self.stats.add_free(1);
        let l = self.wire_keeper.boolean_value(left)?;
        let r = self.wire_keeper.boolean_value(right)?;
        let share = self.engine.compute_free_and(l, r);
        Ok(self.wire_keeper.allocate_boolean_value(share, 0))
    }

    fn private_and_public_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        let l = self.wire_keeper.batch_boolean_value(left)?;
        let r = self.wire_keeper.batch_boolean_value(right)?;
        self.stats.add_free(l.len() as u64);
        let shares = self.engine.compute_batch_free_and(&l, &r)?;
        Ok(self.wire_keeper.allocate_batch_boolean_value(shares, 0))
    }

    fn public_and_public(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        self.private_and_public(left, right)
    }

    fn public_and_public_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        self.private_and_public_batch(left, right)
    }

    fn private_and_private_composite(
        &mut self,
        left: WireId<Boolean>,
        rights: &[WireId<Boolean>],
    ) -> Result<Vec<WireId<Boolean>>> {
        self.stats.add_non_free(rights.len() as u64);
        let l = self.wire_keeper.boolean_value(left)?;
        let right_values = rights
            .iter()
            .map(|r| self.wire_keeper.boolean_value(*r))
            .collect::<Result<Vec<_>>>()?;
        let index = self.engine.schedule_composite_and(l, right_values);
        self.engine.execute_scheduled_operations()?;
        let shares = self.engine.composite_and_execution_result(index)?.clone();
        Ok(shares
            .into_iter()
            .map(|share| self.wire_keeper.allocate_boolean_value(share, 0))
            .collect())
    }

    fn private_and_private_composite_batch(
        &mut self,
        left: WireId<Boolean>,
        rights: &[WireId<Boolean>],
    ) -> Result<Vec<WireId<Boolean>>> {
        let l = self.wire_keeper.batch_boolean_value(left)?;
        self.stats.add_non_free((l.len() * rights.len()) as u64);
        let right_values = rights
            .iter()
            .map(|r| self.wire_keeper.batch_boolean_value(*r))
            .collect::<Result<Vec<_>>>()?;
        let index = self.engine.schedule_batch_composite_and(&l, right_values)?;
        self.engine.execute_scheduled_operations()?;
        let shares = self
            .engine
            .batch_composite_and_execution_result(index)?
            .clone();
        Ok(shares
            .into_iter()
            .map(|batch| self.wire_keeper.allocate_batch_boolean_value(batch, 0))
            .collect())
    }

    fn private_and_public_composite(
        &mut self,
        left: WireId<Boolean>,
        rights: &[WireId<Boolean>],
    ) -> Result<Vec<WireId<Boolean>>> {
        self.stats.add_free(rights.len() as u64);
        let l = self.wire_keeper.boolean_value(left)?;
        rights
            .iter()
            .map(|right| {
                let r = self.wire_keeper.boolean_value(*right)?;
                let share = self.engine.compute_free_and(l, r);
                Ok(self.wire_keeper.allocate_boolean_value(share, 0))
            })
            .collect()
    }

    fn private_and_public_composite_batch(
        &mut self,
        left: WireId<Boolean>,
        rights: &[WireId<Boolean>],
    ) -> Result<Vec<WireId<Boolean>>> {
        let l = self.wire_keeper.batch_boolean_value(left)?;
        self.stats.add_free((l.len() * rights.len()) as u64);
        rights
            .iter()
            .map(|right| {
                let r = self.wire_keeper.batch_boolean_value(*right)?;
                let shares = self.engine.compute_batch_free_and(&l, &r)?;
                Ok(self.wire_keeper.allocate_batch_boolean_value(shares, 0))
            })
            .collect()
    }

    fn public_and_public_composite(
        &mut self,
        left: WireId<Boolean>,
        rights: &[WireId<Boolean>],
    ) -> Result<Vec<WireId<Boolean>>> {
        self.private_and_public_composite(left, rights)
    }

    fn public_and_public_composite_batch(
        &mut self,
        left: WireId<Boolean>,
        rights: &[WireId<Boolean>],
    ) -> Result<Vec<WireId<Boolean>>> {
        self.private_and_public_composite_batch(left, rights)
    }

    fn private_xor_private(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        self.stats.add_free(1);
        let l = self.wire_keeper.boolean_value(left)?;
        let r = self.wire_keeper.boolean_value(right)?;
        let share = self.engine.compute_symmetric_xor(l, r);
        Ok(self.wire_keeper.allocate_boolean_value(share, 0))
    }

    fn private_xor_private_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        let l = self.wire_keeper.batch_boolean_value(left)?;
        let r = self.wire_keeper.batch_boolean_value(right)?;
        self.stats.add_free(l.len() as u64);
        let shares = self.engine.compute_batch_symmetric_xor(&l, &r)?;
        Ok(self.wire_keeper.allocate_batch_boolean_value(shares, 0))
    }

    fn private_xor_public(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        self.stats.add_free(1);
        let l = self.wire_keeper.boolean_value(left)?;
        let r = self.wire_keeper.boolean_value(right)?;
        let share = self.engine.compute_asymmetric_xor(l, r);
        Ok(self.wire_keeper.allocate_boolean_value(share, 0))
    }

    fn private_xor_public_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        let l = self.wire_keeper.batch_boolean_value(left)?;
        let r = self.wire_keeper.batch_boolean_value(right)?;
        self.stats.add_free(l.len() as u64);
        let shares = self.engine.compute_batch_asymmetric_xor(&l, &r)?;
        Ok(self.wire_keeper.allocate_batch_boolean_value(shares, 0))
    }

    fn public_xor_public(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        self.private_xor_private(left, right)
    }

    fn public_xor_public_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        self.private_xor_private_batch(left, right)
    }

    fn not_private(&mut self, src: WireId<Boolean>) -> Result<WireId<Boolean>> {
        self.stats.add_free(1);
        let v = self.wire_keeper.boolean_value(src)?;
        let share = self.engine.compute_asymmetric_not(v);
        Ok(self.wire_keeper.allocate_boolean_value(share, 0))
    }

    fn not_private_batch(&mut self, src: WireId<Boolean>) -> Result<WireId<Boolean>> {
        let v = self.wire_keeper.batch_boolean_value(src)?;
        self.stats.add_free(v.len() as u64);
        let shares = self.engine.compute_batch_asymmetric_not(&v);
        Ok(self.wire_keeper.allocate_batch_boolean_value(shares, 0))
    }

    fn not_public(&mut self, src: WireId<Boolean>) -> Result<WireId<Boolean>> {
        self.stats.add_free(1);
        let v = self.wire_keeper.boolean_value(src)?;
        let share = self.engine.compute_symmetric_not(v);
        Ok(self.wire_keeper.allocate_boolean_value(share, 0))
    }

    fn not_public_batch(&mut self, src: WireId<Boolean>) -> Result<WireId<Boolean>> {
        let v = self.wire_keeper.batch_boolean_value(src)?;
        self.stats.add_free(v.len() as u64);
        let shares = self.engine.compute_batch_symmetric_not(&v);
        Ok(self.wire_keeper.allocate_batch_boolean_value(shares, 0))
    }

    fn increase_reference_count(&mut self, id: WireId<Boolean>) -> Result<()> {
        self.wire_keeper.increase_reference_count(id)
    }

    fn increase_reference_count_batch(&mut self, id: WireId<Boolean>) -> Result<()> {
        self.wire_keeper.increase_batch_reference_count(id)
    }

    fn decrease_reference_count(&mut self, id: WireId<Boolean>) -> Result<()> {
        self.wire_keeper.decrease_reference_count(id)
    }

    fn decrease_reference_count_batch(&mut self, id: WireId<Boolean>) -> Result<()> {
        self.wire_keeper.decrease_batch_reference_count(id)
    }

    fn batching_up(&mut self, srcs: &[WireId<Boolean>]) -> Result<WireId<Boolean>> {
        if srcs.is_empty() {
            return Err(RuntimeError::InvalidArgument("empty wire id vector".into()).into());
        }
        let mut banded = vec![];
        for src in srcs {
            banded.extend(self.wire_keeper.batch_boolean_value(*src)?);
        }
        Ok(self.wire_keeper.allocate_batch_boolean_value(banded, 0))
    }

    fn unbatching(
        &mut self,
        src: WireId<Boolean>,
        strategy: &[u32],
    ) -> Result<Vec<WireId<Boolean>>> {
        let values = self.wire_keeper.batch_boolean_value(src)?;
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
        Ok(strategy
            .iter()
            .map(|n| {
                let n = *n as usize;
                let chunk = values[cursor..cursor + n].to_vec();
                cursor += n;
                self.wire_keeper.allocate_batch_boolean_value(chunk, 0)
            })
            .collect())
    }

    fn traffic_statistics(&self) -> (u64, u64) {
        self.engine.traffic_statistics()
    }

    fn gate_statistics(&self) -> (u64, u64) {
        self.stats.statistics()
    }

    fn wire_statistics(&self) -> (u64, u64) {
        self.wire_keeper.wire_statistics()
    }

    fn batch_size_of(&self, id: WireId<Boolean>) -> Result<usize> {
        self.wire_keeper.batch_size(id)
    }
}

impl ArithmeticScheduler for EagerScheduler {
    fn private_integer_input(&mut self, v: u64, party: PartyId) -> Result<WireId<Arithmetic>> {
        self.stats.add_free(1);
        let share = self.engine.set_integer_input(party, Some(v))?;
        Ok(self.wire_keeper.allocate_integer_value(share, 0))
    }

    fn private_integer_input_batch(
        &mut self,
        v: &[u64],
        party: PartyId,
    ) -> Result<WireId<Arithmetic>> {
        self.stats.add_free(v.len() as u64);
        let shares = self.engine.set_batch_integer_input(party, v)?;
        Ok(self.wire_keeper.allocate_batch_integer_value(shares, 0))
    }

    fn public_integer_input(&mut self, v: u64) -> Result<WireId<Arithmetic>> {
        self.stats.add_free(1);
        Ok(self.wire_keeper.allocate_integer_value(v, 0))
    }

    fn public_integer_input_batch(&mut self, v: &[u64]) -> Result<WireId<Arithmetic>> {
        self.stats.add_free(v.len() as u64);
        Ok(self.wire_keeper.allocate_batch_integer_value(v.to_vec(), 0))
    }

    fn recover_integer_wire(&mut self, share: u64) -> Result<WireId<Arithmetic>> {
        self.stats.add_free(1);
        Ok(self.wire_keeper.allocate_integer_value(share, 0))
    }

    fn recover_integer_wire_batch(&mut self, shares: &[u64]) -> Result<WireId<Arithmetic>> {
        self.stats.add_free(shares.len() as u64);
        Ok(self
            .wire_keeper
            .allocate_batch_integer_value(shares.to_vec(), 0))
    }

    fn open_integer_value_to_party(
        &mut self,
        src: WireId<Arithmetic>,
        party: PartyId,
    ) -> Result<WireId<Arithmetic>> {
        self.stats.add_non_free(1);
        let shares = vec![self.wire_keeper.integer_value(src)?];
        let revealed = self.engine.reveal_to_party_u64(party, &shares)?;
        Self::check_opened_count(1, revealed.len())?;
        Ok(self.wire_keeper.allocate_integer_value(revealed[0], 0))
    }

    fn open_integer_value_to_party_batch(
        &mut self,
        src: WireId<Arithmetic>,
        party: PartyId,
    ) -> Result<WireId<Arithmetic>> {
        let shares = self.wire_keeper.batch_integer_value(src)?;
        self.stats.add_non_free(shares.len() as u64);
        let revealed = self.engine.reveal_to_party_u64(party, &shares)?;
        Self::check_opened_count(shares.len(), revealed.len())?;
        Ok(self.wire_keeper.allocate_batch_integer_value(revealed, 0))
    }

    fn extract_integer_secret_share(&mut self, id: WireId<Arithmetic>) -> Result<u64> {
        self.wire_keeper.integer_value(id)
    }

    fn extract_integer_secret_share_batch(&mut self, id: WireId<Arithmetic>) -> Result<Vec<u64>> {
        self.wire_keeper.batch_integer_value(id)
    }

    fn get_integer_value(&mut self, id: WireId<Arithmetic>) -> Result<u64> {
        self.wire_keeper.integer_value(id)
    }

    fn get_integer_value_batch(&mut self, id: WireId<Arithmetic>) -> Result<Vec<u64>> {
        self.wire_keeper.batch_integer_value(id)
    }

    fn private_plus_private(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        self.stats.add_free(1);
        let l = self.wire_keeper.integer_value(left)?;
        let r = self.wire_keeper.integer_value(right)?;
        let share = self.engine.compute_symmetric_plus(l, r);
        Ok(self.wire_keeper.allocate_integer_value(share, 0))
    }

    fn private_plus_private_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        let l = self.wire_keeper.batch_integer_value(left)?;
        let r = self.wire_keeper.batch_integer_value(right)?;
        self.stats.add_free(l.len() as u64);
        let shares = self.engine.compute_batch_symmetric_plus(&l, &r)?;
        Ok(self.wire_keeper.allocate_batch_integer_value(shares, 0))
    }

    fn private_plus_public(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        self.stats.add_free(1);
        let l = self.wire_keeper.integer_value(left)?;
        let r = self.wire_keeper.integer_value(right)?;
        let share = self.engine.compute_asymmetric_plus(l, r);
        Ok(self.wire_keeper.allocate_integer_value(share, 0))
    }

    fn private_plus_public_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        let l = self.wire_keeper.batch_integer_value(left)?;
        let r = self.wire_keeper.batch_integer_value(right)?;
        self.stats.add_free(l.len() as u64);
        let shares = self.engine.compute_batch_asymmetric_plus(&l, &r)?;
        Ok(self.wire_keeper.allocate_batch_integer_value(shares, 0))
    }

    fn public_plus_public(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        self.private_plus_private(left, right)
    }

    fn public_plus_public_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        self.private_plus_private_batch(left, right)
    }

    fn private_mult_private(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        self.stats.add_non_free(1);
        let l = self.wire_keeper.integer_value(left)?;
        let r = self.wire_keeper.integer_value(right)?;
        let index = self.engine.schedule_mult(l, r);
        self.engine.execute_scheduled_operations()?;
        let share = self.engine.mult_execution_result(index)?;
        Ok(self.wire_keeper.allocate_integer_value(share, 0))
    }

    fn private_mult_private_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        let l = self.wire_keeper.batch_integer_value(left)?;
        let r = self.wire_keeper.batch_integer_value(right)?;
        self.stats.add_non_free(l.len() as u64);
        let shares = self.engine.compute_batch_mult_immediately(&l, &r)?;
        Ok(self.wire_keeper.allocate_batch_integer_value(shares, 0))
    }

    fn private_mult_public(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        self.stats.add_free(1);
        let l = self.wire_keeper.integer_value(left)?;
        let r = self.wire_keeper.integer_value(right)?;
        let share = self.engine.compute_free_mult(l, r);
        Ok(self.wire_keeper.allocate_integer_value(share, 0))
    }

    fn private_mult_public_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        let l = self.wire_keeper.batch_integer_value(left)?;
        let r = self.wire_keeper.batch_integer_value(right)?;
        self.stats.add_free(l.len() as u64);
        let shares = self.engine.compute_batch_free_mult(&l, &r)?;
        Ok(self.wire_keeper.allocate_batch_integer_value(shares, 0))
    }

    fn public_mult_public(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        self.private_mult_public(left, right)
    }

    fn public_mult_public_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        self.private_mult_public_batch(left, right)
    }

    fn neg_private(&mut self, src: WireId<Arithmetic>) -> Result<WireId<Arithmetic>> {
        self.stats.add_free(1);
        let v = self.wire_keeper.integer_value(src)?;
        let share = self.engine.compute_symmetric_neg(v);
        Ok(self.wire_keeper.allocate_integer_value(share, 0))
    }

    fn neg_private_batch(&mut self, src: WireId<Arithmetic>) -> Result<WireId<Arithmetic>> {
        let v = self.wire_keeper.batch_integer_value(src)?;
        self.stats.add_free(v.len() as u64);
        let shares = self.engine.compute_batch_symmetric_neg(&v);
        Ok(self.wire_keeper.allocate_batch_integer_value(shares, 0))
    }

    fn neg_public(&mut self, src: WireId<Arithmetic>) -> Result<WireId<Arithmetic>> {
        self.neg_private(src)
    }

    fn neg_public_batch(&mut self, src: WireId<Arithmetic>) -> Result<WireId<Arithmetic>> {
        self.neg_private_batch(src)
    }

    fn increase_integer_reference_count(&mut self, id: WireId<Arithmetic>) -> Result<()> {
        self.wire_keeper.increase_integer_reference_count(id)
    }

    fn increase_integer_reference_count_batch(&mut self, id: WireId<Arithmetic>) -> Result<()> {
        self.wire_keeper.increase_batch_integer_reference_count(id)
    }

    fn decrease_integer_reference_count(&mut self, id: WireId<Arithmetic>) -> Result<()> {
        self.wire_keeper.decrease_integer_reference_count(id)
    }

    fn decrease_integer_reference_count_batch(&mut self, id: WireId<Arithmetic>) -> Result<()> {
        self.wire_keeper.decrease_batch_integer_reference_count(id)
    }

    fn integer_batch_size_of(&self, id: WireId<Arithmetic>) -> Result<usize> {
        self.wire_keeper.integer_batch_size(id)
    }
}
