//! Scheduler that defers every operation into the gate keeper's levels.
//!
//! Execution only happens when a wire value is demanded (which forces that
//! wire's level and everything before it) or when the pending-gate cap is
//! hit. A whole non-free level executes in one engine batch, which is what
//! buys the amortised two-roundtrips-per-level property.

use anyhow::Result;
use log::trace;
use std::cell::RefCell;
use std::rc::Rc;

use crate::channel_utils::PartyId;
use crate::engine::SecretShareEngine;
use crate::metrics::{GateStatsRecorder, MetricRecorder};
use crate::scheduler::gate_keeper::{
    is_level_free, ArithmeticGateKind, CompositeGateKind, GateKeeper, NormalGateKind,
    PartySecrets, SecretsByParty,
};
use crate::scheduler::wire_keeper::WireKeeper;
use crate::scheduler::{Arithmetic, ArithmeticScheduler, Boolean, Scheduler, WireId};

pub struct LazyScheduler {
    engine: Box<dyn SecretShareEngine>,
    wire_keeper: Rc<RefCell<WireKeeper>>,
    gate_keeper: GateKeeper,
    stats: Rc<GateStatsRecorder>,
}

impl LazyScheduler {
    pub fn new(
        engine: Box<dyn SecretShareEngine>,
        wire_keeper: Rc<RefCell<WireKeeper>>,
        gate_keeper: GateKeeper,
    ) -> Self {
        Self {
            engine,
            wire_keeper,
            gate_keeper,
            stats: Rc::new(GateStatsRecorder::new("gates")),
        }
    }

    /// The recorder backing [Scheduler::gate_statistics], for collectors.
    pub fn metrics_recorder(&self) -> Rc<dyn MetricRecorder> {
        self.stats.clone()
    }

    fn maybe_execute_gates(&mut self) -> Result<()> {
        while self.gate_keeper.has_reached_batching_limit() {
            self.execute_one_level()?;
        }
        Ok(())
    }

    fn execute_till_level(&mut self, level: u32) -> Result<()> {
        while self.gate_keeper.first_unexecuted_level() <= level {
            self.execute_one_level()?;
        }
        Ok(())
    }

    fn execute_one_level(&mut self) -> Result<()> {
        let level = self.gate_keeper.first_unexecuted_level();
        let mut gates = self.gate_keeper.pop_first_unexecuted_level();
        let level_is_free = is_level_free(level);
        trace!(
            "executing level {} ({} gates, free={})",
            level,
            gates.len(),
            level_is_free
        );

        let mut secrets = SecretsByParty::new();
        {
            let mut wires = self.wire_keeper.borrow_mut();
            for gate in &mut gates {
                gate.compute(self.engine.as_mut(), &mut wires, &mut secrets)?;
                let n = gate.number_of_results();
                if level_is_free {
                    self.stats.add_free(n);
                } else {
                    self.stats.add_non_free(n);
                }
            }
        }

        if !level_is_free {
            self.engine.execute_scheduled_operations()?;

            let mut revealed = SecretsByParty::new();
            for (party, shares) in &secrets {
                revealed.insert(
                    *party,
                    PartySecrets {
                        booleans: self.engine.reveal_to_party_bool(*party, &shares.booleans)?,
                        integers: self.engine.reveal_to_party_u64(*party, &shares.integers)?,
                    },
                );
            }

            let mut wires = self.wire_keeper.borrow_mut();
            for gate in &mut gates {
                gate.collect_scheduled_result(self.engine.as_ref(), &mut wires, &revealed)?;
            }
        }

        let mut wires = self.wire_keeper.borrow_mut();
        for gate in &gates {
            gate.release_wires(&mut wires)?;
        }
        Ok(())
    }

    fn force_boolean_wire(&mut self, id: WireId<Boolean>) -> Result<bool> {
        let level = self.wire_keeper.borrow().first_available_level(id)?;
        self.execute_till_level(level)?;
        self.wire_keeper.borrow().boolean_value(id)
    }

    fn force_batch_boolean_wire(&mut self, id: WireId<Boolean>) -> Result<Vec<bool>> {
        let level = self.wire_keeper.borrow().batch_first_available_level(id)?;
        self.execute_till_level(level)?;
        self.wire_keeper.borrow().batch_boolean_value(id)
    }

    fn force_integer_wire(&mut self, id: WireId<Arithmetic>) -> Result<u64> {
        let level = self.wire_keeper.borrow().integer_first_available_level(id)?;
        self.execute_till_level(level)?;
        self.wire_keeper.borrow().integer_value(id)
    }

    fn force_batch_integer_wire(&mut self, id: WireId<Arithmetic>) -> Result<Vec<u64>> {
        let level = self
            .wire_keeper
            .borrow()
            .batch_integer_first_available_level(id)?;
        self.execute_till_level(level)?;
        self.wire_keeper.borrow().batch_integer_value(id)
    }
}

impl Scheduler for LazyScheduler {
    fn private_boolean_input(&mut self, v: bool, party: PartyId) -> Result<WireId<Boolean>> {
        let share = self.engine.set_input(party, Some(v))?;
        let id = self.gate_keeper.input_gate(share)?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn private_boolean_input_batch(
        &mut self,
        v: &[bool],
        party: PartyId,
    ) -> Result<WireId<Boolean>> {
        let shares = self.engine.set_batch_input(party, v)?;
        let id = self.gate_keeper.input_gate_batch(shares)?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn public_boolean_input(&mut self, v: bool) -> Result<WireId<Boolean>> {
        let id = self.gate_keeper.input_gate(v)?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn public_boolean_input_batch(&mut self, v: &[bool]) -> Result<WireId<Boolean>> {
        let id = self.gate_keeper.input_gate_batch(v.to_vec())?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn recover_boolean_wire(&mut self, share: bool) -> Result<WireId<Boolean>> {
        let id = self.gate_keeper.input_gate(share)?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn recover_boolean_wire_batch(&mut self, shares: &[bool]) -> Result<WireId<Boolean>> {
        let id = self.gate_keeper.input_gate_batch(shares.to_vec())?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn open_boolean_value_to_party(
        &mut self,
        src: WireId<Boolean>,
        party: PartyId,
    ) -> Result<WireId<Boolean>> {
        let id = self.gate_keeper.output_gate(src, party)?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn open_boolean_value_to_party_batch(
        &mut self,
        src: WireId<Boolean>,
        party: PartyId,
    ) -> Result<WireId<Boolean>> {
        let id = self.gate_keeper.output_gate_batch(src, party)?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn extract_boolean_secret_share(&mut self, id: WireId<Boolean>) -> Result<bool> {
        self.force_boolean_wire(id)
    }

    fn extract_boolean_secret_share_batch(&mut self, id: WireId<Boolean>) -> Result<Vec<bool>> {
        self.force_batch_boolean_wire(id)
    }

    fn get_boolean_value(&mut self, id: WireId<Boolean>) -> Result<bool> {
        self.force_boolean_wire(id)
    }

    fn get_boolean_value_batch(&mut self, id: WireId<Boolean>) -> Result<Vec<bool>> {
        self.force_batch_boolean_wire(id)
    }

    fn private_and_private(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        let id = self
            .gate_keeper
            .normal_gate(NormalGateKind::NonFreeAnd, left, Some(right))?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn private_and_private_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        let id = self
            .gate_keeper
            .normal_gate_batch(NormalGateKind::NonFreeAnd, left, Some(right))?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn private_and_public(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        let id = self
            .gate_keeper
            .normal_gate(NormalGateKind::FreeAnd, left, Some(right))?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn private_and_public_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        let id = self
            .gate_keeper
            .normal_gate_batch(NormalGateKind::FreeAnd, left, Some(right))?;
        self.maybe_execute_gates()?;
        Ok(id)
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
        let ids = self
            .gate_keeper
            .composite_gate(CompositeGateKind::NonFreeAnd, left, rights)?;
        self.maybe_execute_gates()?;
        Ok(ids)
    }

    fn private_and_private_composite_batch(
        &mut self,
        left: WireId<Boolean>,
        rights: &[WireId<Boolean>],
    ) -> Result<Vec<WireId<Boolean>>> {
        let ids = self
            .gate_keeper
            .composite_gate_batch(CompositeGateKind::NonFreeAnd, left, rights)?;
        self.maybe_execute_gates()?;
        Ok(ids)
    }

    fn private_and_public_composite(
        &mut self,
        left: WireId<Boolean>,
        rights: &[WireId<Boolean>],
    ) -> Result<Vec<WireId<Boolean>>> {
        let ids = self
            .gate_keeper
            .composite_gate(CompositeGateKind::FreeAnd, left, rights)?;
        self.maybe_execute_gates()?;
        Ok(ids)
    }

    fn private_and_public_composite_batch(
        &mut self,
        left: WireId<Boolean>,
        rights: &[WireId<Boolean>],
    ) -> Result<Vec<WireId<Boolean>>> {
        let ids = self
            .gate_keeper
            .composite_gate_batch(CompositeGateKind::FreeAnd, left, rights)?;
        self.maybe_execute_gates()?;
        Ok(ids)
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
        let id = self
            .gate_keeper
            .normal_gate(NormalGateKind::SymmetricXor, left, Some(right))?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn private_xor_private_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        let id = self
            .gate_keeper
            .normal_gate_batch(NormalGateKind::SymmetricXor, left, Some(right))?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn private_xor_public(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        let id = self
            .gate_keeper
            .normal_gate(NormalGateKind::AsymmetricXor, left, Some(right))?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn private_xor_public_batch(
        &mut self,
        left: WireId<Boolean>,
        right: WireId<Boolean>,
    ) -> Result<WireId<Boolean>> {
        let id = self
            .gate_keeper
            .normal_gate_batch(NormalGateKind::AsymmetricXor, left, Some(right))?;
        self.maybe_execute_gates()?;
        Ok(id)
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
        let id = self
            .gate_keeper
            .normal_gate(NormalGateKind::AsymmetricNot, src, None)?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn not_private_batch(&mut self, src: WireId<Boolean>) -> Result<WireId<Boolean>> {
        let id = self
            .gate_keeper
            .normal_gate_batch(NormalGateKind::AsymmetricNot, src, None)?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn not_public(&mut self, src: WireId<Boolean>) -> Result<WireId<Boolean>> {
        let id = self
            .gate_keeper
            .normal_gate(NormalGateKind::SymmetricNot, src, None)?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn not_public_batch(&mut self, src: WireId<Boolean>) -> Result<WireId<Boolean>> {
        let id = self
            .gate_keeper
            .normal_gate_batch(NormalGateKind::SymmetricNot, src, None)?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn increase_reference_count(&mut self, id: WireId<Boolean>) -> Result<()> {
        self.wire_keeper.borrow_mut().increase_reference_count(id)
    }

    fn increase_reference_count_batch(&mut self, id: WireId<Boolean>) -> Result<()> {
        self.wire_keeper
            .borrow_mut()
            .increase_batch_reference_count(id)
    }

    fn decrease_reference_count(&mut self, id: WireId<Boolean>) -> Result<()> {
        self.wire_keeper.borrow_mut().decrease_reference_count(id)
    }

    fn decrease_reference_count_batch(&mut self, id: WireId<Boolean>) -> Result<()> {
        self.wire_keeper
            .borrow_mut()
            .decrease_batch_reference_count(id)
    }

    fn batching_up(&mut self, srcs: &[WireId<Boolean>]) -> Result<WireId<Boolean>> {
        let id = self.gate_keeper.batching_up(srcs.to_vec())?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn unbatching(
        &mut self,
        src: WireId<Boolean>,
        strategy: &[u32],
    ) -> Result<Vec<WireId<Boolean>>> {
        let ids = self.gate_keeper.unbatching(src, strategy)?;
        self.maybe_execute_gates()?;
        Ok(ids)
    }

    fn traffic_statistics(&self) -> (u64, u64) {
        self.engine.traffic_statistics()
    }

    fn gate_statistics(&self) -> (u64, u64) {
        self.stats.statistics()
    }

    fn wire_statistics(&self) -> (u64, u64) {
        self.wire_keeper.borrow().wire_statistics()
    }

    fn batch_size_of(&self, id: WireId<Boolean>) -> Result<usize> {
        self.wire_keeper.borrow().batch_size(id)
    }
}

impl ArithmeticScheduler for LazyScheduler {
    fn private_integer_input(&mut self, v: u64, party: PartyId) -> Result<WireId<Arithmetic>> {
        let share = self.engine.set_integer_input(party, Some(v))?;
        let id = self.gate_keeper.integer_input_gate(share)?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn private_integer_input_batch(
        &mut self,
        v: &[u64],
        party: PartyId,
    ) -> Result<WireId<Arithmetic>> {
        let shares = self.engine.set_batch_integer_input(party, v)?;
        let id = self.gate_keeper.integer_input_gate_batch(shares)?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn public_integer_input(&mut self, v: u64) -> Result<WireId<Arithmetic>> {
        let id = self.gate_keeper.integer_input_gate(v)?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn public_integer_input_batch(&mut self, v: &[u64]) -> Result<WireId<Arithmetic>> {
        let id = self.gate_keeper.integer_input_gate_batch(v.to_vec())?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn recover_integer_wire(&mut self, share: u64) -> Result<WireId<Arithmetic>> {
        let id = self.gate_keeper.integer_input_gate(share)?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn recover_integer_wire_batch(&mut self, shares: &[u64]) -> Result<WireId<Arithmetic>> {
        let id = self.gate_keeper.integer_input_gate_batch(shares.to_vec())?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn open_integer_value_to_party(
        &mut self,
        src: WireId<Arithmetic>,
        party: PartyId,
    ) -> Result<WireId<Arithmetic>> {
        let id = self.gate_keeper.integer_output_gate(src, party)?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn open_integer_value_to_party_batch(
        &mut self,
        src: WireId<Arithmetic>,
        party: PartyId,
    ) -> Result<WireId<Arithmetic>> {
        let id = self.gate_keeper.integer_output_gate_batch(src, party)?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn extract_integer_secret_share(&mut self, id: WireId<Arithmetic>) -> Result<u64> {
        self.force_integer_wire(id)
    }

    fn extract_integer_secret_share_batch(&mut self, id: WireId<Arithmetic>) -> Result<Vec<u64>> {
        self.force_batch_integer_wire(id)
    }

    fn get_integer_value(&mut self, id: WireId<Arithmetic>) -> Result<u64> {
        self.force_integer_wire(id)
    }

    fn get_integer_value_batch(&mut self, id: WireId<Arithmetic>) -> Result<Vec<u64>> {
        self.force_batch_integer_wire(id)
    }

    fn private_plus_private(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        let id = self
            .gate_keeper
            .arithmetic_gate(ArithmeticGateKind::SymmetricPlus, left, Some(right))?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn private_plus_private_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        let id = self.gate_keeper.arithmetic_gate_batch(
            ArithmeticGateKind::SymmetricPlus,
            left,
            Some(right),
        )?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn private_plus_public(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        let id = self
            .gate_keeper
            .arithmetic_gate(ArithmeticGateKind::AsymmetricPlus, left, Some(right))?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn private_plus_public_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        let id = self.gate_keeper.arithmetic_gate_batch(
            ArithmeticGateKind::AsymmetricPlus,
            left,
            Some(right),
        )?;
        self.maybe_execute_gates()?;
        Ok(id)
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
        let id = self
            .gate_keeper
            .arithmetic_gate(ArithmeticGateKind::NonFreeMult, left, Some(right))?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn private_mult_private_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        let id = self.gate_keeper.arithmetic_gate_batch(
            ArithmeticGateKind::NonFreeMult,
            left,
            Some(right),
        )?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn private_mult_public(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        let id = self
            .gate_keeper
            .arithmetic_gate(ArithmeticGateKind::FreeMult, left, Some(right))?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn private_mult_public_batch(
        &mut self,
        left: WireId<Arithmetic>,
        right: WireId<Arithmetic>,
    ) -> Result<WireId<Arithmetic>> {
        let id = self.gate_keeper.arithmetic_gate_batch(
            ArithmeticGateKind::FreeMult,
            left,
            Some(right),
        )?;
        self.maybe_execute_gates()?;
        Ok(id)
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
        let id = self
            .gate_keeper
            .arithmetic_gate(ArithmeticGateKind::Neg, src, None)?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn neg_private_batch(&mut self, src: WireId<Arithmetic>) -> Result<WireId<Arithmetic>> {
        let id = self
            .gate_keeper
            .arithmetic_gate_batch(ArithmeticGateKind::Neg, src, None)?;
        self.maybe_execute_gates()?;
        Ok(id)
    }

    fn neg_public(&mut self, src: WireId<Arithmetic>) -> Result<WireId<Arithmetic>> {
        self.neg_private(src)
    }

    fn neg_public_batch(&mut self, src: WireId<Arithmetic>) -> Result<WireId<Arithmetic>> {
        self.neg_private_batch(src)
    }

    fn increase_integer_reference_count(&mut self, id: WireId<Arithmetic>) -> Result<()> {
        self.wire_keeper
            .borrow_mut()
            .increase_integer_reference_count(id)
    }

    fn increase_integer_reference_count_batch(&mut self, id: WireId<Arithmetic>) -> Result<()> {
        self.wire_keeper
            .borrow_mut()
            .increase_batch_integer_reference_count(id)
    }

    fn decrease_integer_reference_count(&mut self, id: WireId<Arithmetic>) -> Result<()> {
        self.wire_keeper
            .borrow_mut()
            .decrease_integer_reference_count(id)
    }

    fn decrease_integer_reference_count_batch(&mut self, id: WireId<Arithmetic>) -> Result<()> {
        self.wire_keeper
            .borrow_mut()
            .decrease_batch_integer_reference_count(id)
    }

    fn integer_batch_size_of(&self, id: WireId<Arithmetic>) -> Result<usize> {
        self.wire_keeper.borrow().integer_batch_size(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dummy::DummySecretShareEngine;
    use crate::scheduler::gate_keeper::GateKeeper;

    fn dummy_lazy(limit: usize) -> LazyScheduler {
        let wires = Rc::new(RefCell::new(WireKeeper::new()));
        let gates = GateKeeper::with_batching_limit(wires.clone(), limit);
        LazyScheduler::new(Box::new(DummySecretShareEngine::new(0)), wires, gates)
    }

    // The dummy engine validates that deferral, forcing, refcounting and
    // accounting compose without a crypto stack underneath.

    #[test]
    fn test_nothing_executes_until_forced() {
        let mut s = dummy_lazy(1000);
        let a = s.private_boolean_input(true, 0).unwrap();
        let b = s.private_boolean_input(true, 1).unwrap();
        let z = s.private_and_private(a, b).unwrap();
        assert_eq!(s.gate_statistics(), (0, 0));

        s.get_boolean_value(z).unwrap();
        // inputs counted free, the AND counted non-free
        assert_eq!(s.gate_statistics(), (1, 2));
    }

    #[test]
    fn test_forcing_executes_prefix_levels_only() {
        let mut s = dummy_lazy(1000);
        let a = s.private_boolean_input(true, 0).unwrap();
        let b = s.private_boolean_input(true, 1).unwrap();
        let z = s.private_and_private(a, b).unwrap();
        // deeper chain on top of z
        let w = s.private_and_private(z, a).unwrap();

        s.get_boolean_value(z).unwrap();
        let (non_free, _) = s.gate_statistics();
        assert_eq!(non_free, 1);

        s.get_boolean_value(w).unwrap();
        let (non_free, _) = s.gate_statistics();
        assert_eq!(non_free, 2);
    }

    #[test]
    fn test_batching_limit_forces_flush() {
        let mut s = dummy_lazy(4);
        for _ in 0..6 {
            s.public_boolean_input(true).unwrap();
        }
        // the limit kicked in and executed the input level without a force
        let (_, free) = s.gate_statistics();
        assert!(free >= 5);
    }

    #[test]
    fn test_gate_counting_units() {
        let mut s = dummy_lazy(1000);
        let batch = s.private_boolean_input_batch(&[true; 4], 0).unwrap();
        let other = s.private_boolean_input_batch(&[false; 4], 1).unwrap();
        let z = s.private_and_private_batch(batch, other).unwrap();

        let left = s.private_boolean_input(true, 0).unwrap();
        let rights = [
            s.private_boolean_input(true, 1).unwrap(),
            s.private_boolean_input(false, 1).unwrap(),
        ];
        let composite = s.private_and_private_composite(left, &rights).unwrap();

        s.get_boolean_value_batch(z).unwrap();
        s.get_boolean_value(composite[0]).unwrap();

        let (non_free, free) = s.gate_statistics();
        // batch AND counts 4, composite counts its width 2
        assert_eq!(non_free, 4 + 2);
        // batch inputs count 4 each, scalar inputs 1 each
        assert_eq!(free, 4 + 4 + 1 + 2);
    }

    #[test]
    fn test_rebatching_moves_values_and_counts_nothing() {
        let mut s = dummy_lazy(1000);
        let a = s.public_boolean_input_batch(&[true, false]).unwrap();
        let b = s.public_boolean_input_batch(&[true]).unwrap();
        let banded = s.batching_up(&[a, b]).unwrap();
        assert_eq!(
            s.get_boolean_value_batch(banded).unwrap(),
            vec![true, false, true]
        );

        let parts = s.unbatching(banded, &[2, 1]).unwrap();
        assert_eq!(
            s.get_boolean_value_batch(parts[0]).unwrap(),
            vec![true, false]
        );
        assert_eq!(s.get_boolean_value_batch(parts[1]).unwrap(), vec![true]);

        let (non_free, free) = s.gate_statistics();
        assert_eq!(non_free, 0);
        assert_eq!(free, 3);
    }

    #[test]
    fn test_wires_released_after_execution() {
        let mut s = dummy_lazy(1000);
        let a = s.private_boolean_input(true, 0).unwrap();
        let b = s.private_boolean_input(true, 1).unwrap();
        let z = s.private_and_private(a, b).unwrap();
        s.get_boolean_value(z).unwrap();

        for w in [a, b, z] {
            s.decrease_reference_count(w).unwrap();
        }
        let (allocated, deallocated) = s.wire_statistics();
        assert_eq!(allocated, deallocated);
    }

    #[test]
    fn test_self_and_is_single_wire() {
        let mut s = dummy_lazy(1000);
        let a = s.private_boolean_input(true, 0).unwrap();
        let z = s.private_and_private(a, a).unwrap();
        s.get_boolean_value(z).unwrap();
        for w in [a, z] {
            s.decrease_reference_count(w).unwrap();
        }
        let (allocated, deallocated) = s.wire_statistics();
        assert_eq!(allocated, deallocated);
    }
}
