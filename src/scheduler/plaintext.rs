//! Single-party scheduler with no communication and no crypto.
//!
//! Every "private" input resolves to its actual value, so circuits can be
//! debugged and unit-tested in-process. Gate and wire accounting behaves
//! exactly like the network variants.

use anyhow::Result;
use std::rc::Rc;

use crate::channel_utils::PartyId;
use crate::engine::check_same_length;
use crate::errors::RuntimeError;
use crate::metrics::{GateStatsRecorder, MetricRecorder};
use crate::scheduler::wire_keeper::WireKeeper;
use crate::scheduler::{Arithmetic, ArithmeticScheduler, Boolean, Scheduler, WireId};

pub struct PlaintextScheduler {
    wire_keeper: WireKeeper,
    stats: Rc<GateStatsRecorder>,
}

impl PlaintextScheduler {
    pub fn new(wire_keeper: WireKeeper) -> Self {
        Self {
            wire_keeper,
            stats: Rc::new(GateStatsRecorder::new("gates")),
        }
    }

    /// The recorder backing [Scheduler::gate_statistics], for collectors.
    pub fn metrics_recorder(&self) -> Rc<dyn MetricRecorder> {
        self.stats.clone()
    }

    pub(crate) fn wire_keeper(&mut self) -> &mut WireKeeper {
        &mut self.wire_keeper
    }

    pub(crate) fn stats(&self) -> &Rc<GateStatsRecorder> {
        &self.stats
    }
}

impl Scheduler for PlaintextScheduler {
    fn private_boolean_input(&mut self, v: bool, _party: PartyId) -> Result<WireId<Boolean>> {
        self.stats.add_free(1);
        Ok(self.wire_keeper.allocate_boolean_value(v, 0))
    }

    fn private_boolean_input_batch(
        &mut self,
        v: &[bool],
        _party: PartyId,
    ) -> Result<WireId<Boolean>> {
        self.stats.add_free(v.len() as u64);
        Ok(self.wire_keeper.allocate_batch_boolean_value(v.to_vec(), 0))
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
        _party: PartyId,
    ) -> Result<WireId<Boolean>> {
        self.stats.add_non_free(1);
        let v = self.wire_keeper.boolean_value(src)?;
        Ok(self.wire_keeper.allocate_boolean_value(v, 0))
    }

    fn open_boolean_value_to_party_batch(
        &mut self,
        src: WireId<Boolean>,
        _party: PartyId,
    ) -> Result<WireId<Boolean>> {
        let v = self.wire_keeper.batch_boolean_value(src)?;
        self.stats.add_non_free(v.len() as u64);
        Ok(self.wire_keeper.allocate_batch_boolean_value(v, 0))
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
        let v = self.wire_keeper.boolean_value(left)? & self.wire_keeper.boolean_value(right)?;
        Ok(self.wire_keeper.allocate_boolean_value(v, 0))
    }

    fn private_and_private_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        let l = self.wire_keeper.batch_boolean_value(left)?;
        let r = self.wire_keeper.batch_boolean_value(right)?;
        check_same_length(&l, &r)?;
        self.stats.add_non_free(l.len() as u64);
        let v = l.iter().zip(&r).map(|(a, b)| a & b).collect();
        Ok(self.wire_keeper.allocate_batch_boolean_value(v, 0))
    }

    fn private_and_public(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        self.stats.add_free(1);
        let v = self.wire_keeper.boolean_value(left)? & self.wire_keeper.boolean_value(right)?;
        Ok(self.wire_keeper.allocate_boolean_value(v, 0))
    }

    fn private_and_public_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        let l = self.wire_keeper.batch_boolean_value(left)?;
        let r = self.wire_keeper.batch_boolean_value(right)?;
        check_same_length(&l, &r)?;
        self.stats.add_free(l.len() as u64);
        let v = l.iter().zip(&r).map(|(a, b)| a & b).collect();
        Ok(self.wire_keeper.allocate_batch_boolean_value(v, 0))
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
        rights
            .iter()
            .map(|right| {
                let v = l & self.wire_keeper.boolean_value(*right)?;
                Ok(self.wire_keeper.allocate_boolean_value(v, 0))
            })
            .collect()
    }

    fn private_and_private_composite_batch(
        &mut self,
        left: WireId<Boolean>,
        rights: &[WireId<Boolean>],
    ) -> Result<Vec<WireId<Boolean>>> {
        let l = self.wire_keeper.batch_boolean_value(left)?;
        self.stats.add_non_free((l.len() * rights.len()) as u64);
        rights
            .iter()
            .map(|right| {
                let r = self.wire_keeper.batch_boolean_value(*right)?;
                check_same_length(&l, &r)?;
                let v = l.iter().zip(&r).map(|(a, b)| a & b).collect();
                Ok(self.wire_keeper.allocate_batch_boolean_value(v, 0))
            })
            .collect()
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
                let v = l & self.wire_keeper.boolean_value(*right)?;
                Ok(self.wire_keeper.allocate_boolean_value(v, 0))
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
                check_same_length(&l, &r)?;
                let v = l.iter().zip(&r).map(|(a, b)| a & b).collect();
                Ok(self.wire_keeper.allocate_batch_boolean_value(v, 0))
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
        let v = self.wire_keeper.boolean_value(left)? ^ self.wire_keeper.boolean_value(right)?;
        Ok(self.wire_keeper.allocate_boolean_value(v, 0))
    }

    fn private_xor_private_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        let l = self.wire_keeper.batch_boolean_value(left)?;
        let r = self.wire_keeper.batch_boolean_value(right)?;
        check_same_length(&l, &r)?;
        self.stats.add_free(l.len() as u64);
        let v = l.iter().zip(&r).map(|(a, b)| a ^ b).collect();
        Ok(self.wire_keeper.allocate_batch_boolean_value(v, 0))
    }

    fn private_xor_public(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        self.private_xor_private(left, right)
    }

    fn private_xor_public_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        self.private_xor_private_batch(left, right)
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
        let v = !self.wire_keeper.boolean_value(src)?;
        Ok(self.wire_keeper.allocate_boolean_value(v, 0))
    }

    fn not_private_batch(&mut self, src: WireId<Boolean>) -> Result<WireId<Boolean>> {
        let v: Vec<bool> = self
            .wire_keeper
            .batch_boolean_value(src)?
            .iter()
            .map(|b| !b)
            .collect();
        self.stats.add_free(v.len() as u64);
        Ok(self.wire_keeper.allocate_batch_boolean_value(v, 0))
    }

    fn not_public(&mut self, src: WireId<Boolean>) -> Result<WireId<Boolean>> {
        self.not_private(src)
    }

    fn not_public_batch(&mut self, src: WireId<Boolean>) -> Result<WireId<Boolean>> {
        self.not_private_batch(src)
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
        (0, 0)
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

impl ArithmeticScheduler for PlaintextScheduler {
    fn private_integer_input(&mut self, v: u64, _party: PartyId) -> Result<WireId<Arithmetic>> {
        self.stats.add_free(1);
        Ok(self.wire_keeper.allocate_integer_value(v, 0))
    }

    fn private_integer_input_batch(
        &mut self,
        v: &[u64],
        _party: PartyId,
    ) -> Result<WireId<Arithmetic>> {
        self.stats.add_free(v.len() as u64);
        Ok(self.wire_keeper.allocate_batch_integer_value(v.to_vec(), 0))
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
        _party: PartyId,
    ) -> Result<WireId<Arithmetic>> {
        self.stats.add_non_free(1);
        let v = self.wire_keeper.integer_value(src)?;
        Ok(self.wire_keeper.allocate_integer_value(v, 0))
    }

    fn open_integer_value_to_party_batch(
        &mut self,
        src: WireId<Arithmetic>,
        _party: PartyId,
    ) -> Result<WireId<Arithmetic>> {
        let v = self.wire_keeper.batch_integer_value(src)?;
        self.stats.add_non_free(v.len() as u64);
        Ok(self.wire_keeper.allocate_batch_integer_value(v, 0))
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
        let v = self
            .wire_keeper
            .integer_value(left)?
            .wrapping_add(self.wire_keeper.integer_value(right)?);
        Ok(self.wire_keeper.allocate_integer_value(v, 0))
    }

    fn private_plus_private_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        let l = self.wire_keeper.batch_integer_value(left)?;
        let r = self.wire_keeper.batch_integer_value(right)?;
        check_same_length(&l, &r)?;
        self.stats.add_free(l.len() as u64);
        let v = l.iter().zip(&r).map(|(a, b)| a.wrapping_add(*b)).collect();
        Ok(self.wire_keeper.allocate_batch_integer_value(v, 0))
    }

    fn private_plus_public(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        self.private_plus_private(left, right)
    }

    fn private_plus_public_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        self.private_plus_private_batch(left, right)
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
        let v = self
            .wire_keeper
            .integer_value(left)?
            .wrapping_mul(self.wire_keeper.integer_value(right)?);
        Ok(self.wire_keeper.allocate_integer_value(v, 0))
    }

    fn private_mult_private_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        let l = self.wire_keeper.batch_integer_value(left)?;
        let r = self.wire_keeper.batch_integer_value(right)?;
        check_same_length(&l, &r)?;
        self.stats.add_non_free(l.len() as u64);
        let v = l.iter().zip(&r).map(|(a, b)| a.wrapping_mul(*b)).collect();
        Ok(self.wire_keeper.allocate_batch_integer_value(v, 0))
    }

    fn private_mult_public(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        self.stats.add_free(1);
        let v = self
            .wire_keeper
            .integer_value(left)?
            .wrapping_mul(self.wire_keeper.integer_value(right)?);
        Ok(self.wire_keeper.allocate_integer_value(v, 0))
    }

    fn private_mult_public_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        let l = self.wire_keeper.batch_integer_value(left)?;
        let r = self.wire_keeper.batch_integer_value(right)?;
        check_same_length(&l, &r)?;
        self.stats.add_free(l.len() as u64);
        let v = l.iter().zip(&r).map(|(a, b)| a.wrapping_mul(*b)).collect();
        Ok(self.wire_keeper.allocate_batch_integer_value(v, 0))
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
        let v = self.wire_keeper.integer_value(src)?.wrapping_neg();
        Ok(self.wire_keeper.allocate_integer_value(v, 0))
    }

    fn neg_private_batch(&mut self, src: WireId<Arithmetic>) -> Result<WireId<Arithmetic>> {
        let v: Vec<u64> = self
            .wire_keeper
            .batch_integer_value(src)?
            .iter()
            .map(|x| x.wrapping_neg())
            .collect();
        self.stats.add_free(v.len() as u64);
        Ok(self.wire_keeper.allocate_batch_integer_value(v, 0))
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

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> PlaintextScheduler {
        PlaintextScheduler::new(WireKeeper::new())
    }

    #[test]
    fn test_boolean_laws() {
        let mut s = scheduler();
        let w = s.private_boolean_input(true, 0).unwrap();

        let double_not = s.not_private(w).unwrap();
        let double_not = s.not_private(double_not).unwrap();
        assert!(s.get_boolean_value(double_not).unwrap());

        let self_xor = s.private_xor_private(w, w).unwrap();
        assert!(!s.get_boolean_value(self_xor).unwrap());

        let t = s.public_boolean_input(true).unwrap();
        let f = s.public_boolean_input(false).unwrap();
        let and_true = s.private_and_public(w, t).unwrap();
        assert!(s.get_boolean_value(and_true).unwrap());
        let and_false = s.private_and_public(w, f).unwrap();
        assert!(!s.get_boolean_value(and_false).unwrap());

        // self-AND keeps the plaintext
        let self_and = s.private_and_private(w, w).unwrap();
        assert!(s.get_boolean_value(self_and).unwrap());
    }

    #[test]
    fn test_share_roundtrip() {
        let mut s = scheduler();
        let w = s.private_boolean_input(true, 1).unwrap();
        let share = s.extract_boolean_secret_share(w).unwrap();
        let recovered = s.recover_boolean_wire(share).unwrap();
        assert!(s.get_boolean_value(recovered).unwrap());
    }

    #[test]
    fn test_gate_statistics() {
        let mut s = scheduler();
        let a = s.private_boolean_input(true, 0).unwrap();
        let b = s.private_boolean_input(false, 1).unwrap();
        let z = s.private_and_private(a, b).unwrap();
        s.open_boolean_value_to_party(z, 0).unwrap();
        // 2 inputs free; AND and open non-free
        assert_eq!(s.gate_statistics(), (2, 2));
    }

    #[test]
    fn test_composite_and_counts_width() {
        let mut s = scheduler();
        let left = s.private_boolean_input(true, 0).unwrap();
        let rights = [
            s.private_boolean_input(true, 1).unwrap(),
            s.private_boolean_input(false, 1).unwrap(),
            s.private_boolean_input(true, 1).unwrap(),
        ];
        let outs = s.private_and_private_composite(left, &rights).unwrap();
        let values: Vec<bool> = outs
            .iter()
            .map(|o| s.get_boolean_value(*o).unwrap())
            .collect();
        assert_eq!(values, vec![true, false, true]);
        assert_eq!(s.gate_statistics(), (3, 4));
    }

    #[test]
    fn test_rebatching() {
        let mut s = scheduler();
        let a = s.public_boolean_input_batch(&[true, false]).unwrap();
        let b = s.public_boolean_input_batch(&[false, false, true]).unwrap();
        let banded = s.batching_up(&[a, b]).unwrap();
        assert_eq!(
            s.get_boolean_value_batch(banded).unwrap(),
            vec![true, false, false, false, true]
        );

        let split = s.unbatching(banded, &[1, 4]).unwrap();
        assert_eq!(s.get_boolean_value_batch(split[0]).unwrap(), vec![true]);
        assert_eq!(s.batch_size_of(split[1]).unwrap(), 4);

        assert!(s.unbatching(banded, &[2, 2]).is_err());
    }

    #[test]
    fn test_wire_leak_detector() {
        let mut s = scheduler();
        let a = s.private_boolean_input(true, 0).unwrap();
        let b = s.private_boolean_input(false, 1).unwrap();
        let z = s.private_and_private(a, b).unwrap();
        for w in [a, b, z] {
            s.decrease_reference_count(w).unwrap();
        }
        let (allocated, deallocated) = s.wire_statistics();
        assert_eq!(allocated, deallocated);
    }

    #[test]
    fn test_integer_surface() {
        let mut s = scheduler();
        let a = s.private_integer_input(20, 0).unwrap();
        let b = s.private_integer_input(30, 1).unwrap();
        let sum = s.private_plus_private(a, b).unwrap();
        assert_eq!(s.get_integer_value(sum).unwrap(), 50);

        let product = s.private_mult_private(a, b).unwrap();
        assert_eq!(s.get_integer_value(product).unwrap(), 600);

        let negated = s.neg_private(a).unwrap();
        assert_eq!(s.get_integer_value(negated).unwrap(), 20u64.wrapping_neg());

        let batch = s.private_integer_input_batch(&[1, u64::MAX], 0).unwrap();
        let doubled = s.private_plus_private_batch(batch, batch).unwrap();
        assert_eq!(
            s.get_integer_value_batch(doubled).unwrap(),
            vec![2, u64::MAX.wrapping_mul(2)]
        );
    }

    #[test]
    fn test_empty_batches() {
        let mut s = scheduler();
        let empty = s.public_boolean_input_batch(&[]).unwrap();
        let xored = s.private_xor_private_batch(empty, empty).unwrap();
        assert!(s.get_boolean_value_batch(xored).unwrap().is_empty());
        let anded = s.private_and_private_batch(empty, empty).unwrap();
        assert!(s.get_boolean_value_batch(anded).unwrap().is_empty());
    }
}
