//! The gate keeper: accumulates pending gates into a totally ordered
//! sequence of levels.
//!
//! Even levels hold only free gates, odd levels only non-free gates. A new
//! gate lands on the smallest level of its own class at or after both its
//! inputs' first-available-levels and the first unexecuted level. Executing
//! a whole level is therefore either pure local work or exactly one batch
//! of communicating gates.

use anyhow::Result;
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use crate::channel_utils::PartyId;
use crate::engine::SecretShareEngine;
use crate::errors::RuntimeError;
use crate::scheduler::wire_keeper::WireKeeper;
use crate::scheduler::{Arithmetic, Boolean, WireId};

pub mod arithmetic_gate;
pub mod composite_gate;
pub mod normal_gate;
pub mod rebatching_gate;

pub use arithmetic_gate::{ArithmeticGate, ArithmeticGateKind, BatchArithmeticGate};
pub use composite_gate::{BatchCompositeGate, CompositeGate, CompositeGateKind};
pub use normal_gate::{BatchNormalGate, NormalGate, NormalGateKind};
pub use rebatching_gate::RebatchingGate;

/// Default cap on pending gates before the lazy scheduler must flush.
pub const MAX_UNEXECUTED_GATES: usize = 100_000;

/// Even levels contain free gates, odd levels non-free gates.
pub fn is_level_free(level: u32) -> bool {
    level & 1 == 0
}

/// Shares collected from output gates during a level, per receiving party.
#[derive(Default)]
pub struct PartySecrets {
    pub booleans: Vec<bool>,
    pub integers: Vec<u64>,
}

pub type SecretsByParty = BTreeMap<PartyId, PartySecrets>;

pub(crate) fn required<T>(wire: Option<WireId<T>>) -> Result<WireId<T>> {
    wire.ok_or_else(|| RuntimeError::Lifecycle("gate is missing an operand wire".into()).into())
}

/// A pending gate of any shape.
pub enum Gate {
    Normal(NormalGate),
    BatchNormal(BatchNormalGate),
    Composite(CompositeGate),
    BatchComposite(BatchCompositeGate),
    Rebatching(RebatchingGate),
    Arithmetic(ArithmeticGate),
    BatchArithmetic(BatchArithmeticGate),
}

impl Gate {
    /// First pass of level execution: free gates write their outputs, non-
    /// free gates enqueue work on the engine or deposit output shares.
    pub fn compute(
        &mut self,
        engine: &mut dyn SecretShareEngine,
        wires: &mut WireKeeper,
        secrets: &mut SecretsByParty,
    ) -> Result<()> {
        match self {
            Gate::Normal(g) => g.compute(engine, wires, secrets),
            Gate::BatchNormal(g) => g.compute(engine, wires, secrets),
            Gate::Composite(g) => g.compute(engine, wires, secrets),
            Gate::BatchComposite(g) => g.compute(engine, wires, secrets),
            Gate::Rebatching(g) => g.compute(engine, wires, secrets),
            Gate::Arithmetic(g) => g.compute(engine, wires, secrets),
            Gate::BatchArithmetic(g) => g.compute(engine, wires, secrets),
        }
    }

    /// Second pass, after the engine ran its scheduled batch: pick up this
    /// gate's results and store them on the output wires.
    pub fn collect_scheduled_result(
        &mut self,
        engine: &dyn SecretShareEngine,
        wires: &mut WireKeeper,
        revealed: &SecretsByParty,
    ) -> Result<()> {
        match self {
            Gate::Normal(g) => g.collect_scheduled_result(engine, wires, revealed),
            Gate::BatchNormal(g) => g.collect_scheduled_result(engine, wires, revealed),
            Gate::Composite(g) => g.collect_scheduled_result(engine, wires, revealed),
            Gate::BatchComposite(g) => g.collect_scheduled_result(engine, wires, revealed),
            Gate::Rebatching(g) => g.collect_scheduled_result(engine, wires, revealed),
            Gate::Arithmetic(g) => g.collect_scheduled_result(engine, wires, revealed),
            Gate::BatchArithmetic(g) => g.collect_scheduled_result(engine, wires, revealed),
        }
    }

    /// How many gate-statistics units this gate contributes: the batch size
    /// for batch gates, the composite width (times batch size) for
    /// composites, zero for rebatching.
    pub fn number_of_results(&self) -> u64 {
        match self {
            Gate::Normal(g) => g.number_of_results(),
            Gate::BatchNormal(g) => g.number_of_results(),
            Gate::Composite(g) => g.number_of_results(),
            Gate::BatchComposite(g) => g.number_of_results(),
            Gate::Rebatching(g) => g.number_of_results(),
            Gate::Arithmetic(g) => g.number_of_results(),
            Gate::BatchArithmetic(g) => g.number_of_results(),
        }
    }

    pub fn retain_wires(&self, wires: &mut WireKeeper) -> Result<()> {
        match self {
            Gate::Normal(g) => g.retain_wires(wires),
            Gate::BatchNormal(g) => g.retain_wires(wires),
            Gate::Composite(g) => g.retain_wires(wires),
            Gate::BatchComposite(g) => g.retain_wires(wires),
            Gate::Rebatching(g) => g.retain_wires(wires),
            Gate::Arithmetic(g) => g.retain_wires(wires),
            Gate::BatchArithmetic(g) => g.retain_wires(wires),
        }
    }

    pub fn release_wires(&self, wires: &mut WireKeeper) -> Result<()> {
        match self {
            Gate::Normal(g) => g.release_wires(wires),
            Gate::BatchNormal(g) => g.release_wires(wires),
            Gate::Composite(g) => g.release_wires(wires),
            Gate::BatchComposite(g) => g.release_wires(wires),
            Gate::Rebatching(g) => g.release_wires(wires),
            Gate::Arithmetic(g) => g.release_wires(wires),
            Gate::BatchArithmetic(g) => g.release_wires(wires),
        }
    }
}

/// Builder of the level sequence. Levels are only appended; a popped level
/// is immutable and its gates are destroyed once consumed.
pub struct GateKeeper {
    wire_keeper: Rc<RefCell<WireKeeper>>,
    gates_by_level_offset: VecDeque<Vec<Gate>>,
    first_unexecuted_level: u32,
    num_unexecuted_gates: usize,
    max_unexecuted_gates: usize,
}

impl GateKeeper {
    pub fn new(wire_keeper: Rc<RefCell<WireKeeper>>) -> Self {
        Self::with_batching_limit(wire_keeper, MAX_UNEXECUTED_GATES)
    }

    /// The limit is a memory/latency trade-off; pick it so typical circuits
    /// still finish in one flush.
    pub fn with_batching_limit(wire_keeper: Rc<RefCell<WireKeeper>>, limit: usize) -> Self {
        Self {
            wire_keeper,
            gates_by_level_offset: VecDeque::new(),
            first_unexecuted_level: 0,
            num_unexecuted_gates: 0,
            max_unexecuted_gates: limit,
        }
    }

    // ---- boolean gates ----

    pub fn input_gate(&mut self, initial_value: bool) -> Result<WireId<Boolean>> {
        let level = self.output_level(true, self.first_unexecuted_level);
        let output = self
            .wire_keeper
            .borrow_mut()
            .allocate_boolean_value(initial_value, level);
        self.add_gate(
            Gate::Normal(NormalGate::new(
                NormalGateKind::Input,
                output,
                None,
                None,
                0,
            )),
            level,
        )?;
        Ok(output)
    }

    pub fn input_gate_batch(&mut self, initial_value: Vec<bool>) -> Result<WireId<Boolean>> {
        let size = initial_value.len() as u64;
        let level = self.output_level(true, self.first_unexecuted_level);
        let output = self
            .wire_keeper
            .borrow_mut()
            .allocate_batch_boolean_value(initial_value, level);
        self.add_gate(
            Gate::BatchNormal(BatchNormalGate::new(
                NormalGateKind::Input,
                output,
                None,
                None,
                0,
                size,
            )),
            level,
        )?;
        Ok(output)
    }

    pub fn output_gate(&mut self, src: WireId<Boolean>, party: PartyId) -> Result<WireId<Boolean>> {
        let src_level = self.wire_keeper.borrow().first_available_level(src)?;
        let level = self.output_level(false, src_level);
        let output = self
            .wire_keeper
            .borrow_mut()
            .allocate_boolean_value(false, level);
        self.add_gate(
            Gate::Normal(NormalGate::new(
                NormalGateKind::Output,
                output,
                Some(src),
                None,
                party,
            )),
            level,
        )?;
        Ok(output)
    }

    pub fn output_gate_batch(
        &mut self,
        src: WireId<Boolean>,
        party: PartyId,
    ) -> Result<WireId<Boolean>> {
        let src_level = self.wire_keeper.borrow().batch_first_available_level(src)?;
        let level = self.output_level(false, src_level);
        let output = self
            .wire_keeper
            .borrow_mut()
            .allocate_batch_boolean_value(vec![], level);
        self.add_gate(
            Gate::BatchNormal(BatchNormalGate::new(
                NormalGateKind::Output,
                output,
                Some(src),
                None,
                party,
                0,
            )),
            level,
        )?;
        Ok(output)
    }

    pub fn normal_gate(
        &mut self,
        kind: NormalGateKind,
        left: WireId<Boolean>,
        right: Option<WireId<Boolean>>,
    ) -> Result<WireId<Boolean>> {
        let max_input = {
            let wires = self.wire_keeper.borrow();
            let mut max = wires.first_available_level(left)?;
            if let Some(right) = right {
                max = max.max(wires.first_available_level(right)?);
            }
            max
        };
        let level = self.output_level(kind.is_free(), max_input);
        let output = self
            .wire_keeper
            .borrow_mut()
            .allocate_boolean_value(false, level);
        self.add_gate(
            Gate::Normal(NormalGate::new(kind, output, Some(left), right, 0)),
            level,
        )?;
        Ok(output)
    }

    pub fn normal_gate_batch(
        &mut self,
        kind: NormalGateKind,
        left: WireId<Boolean>,
        right: Option<WireId<Boolean>>,
    ) -> Result<WireId<Boolean>> {
        let max_input = {
            let wires = self.wire_keeper.borrow();
            let mut max = wires.batch_first_available_level(left)?;
            if let Some(right) = right {
                max = max.max(wires.batch_first_available_level(right)?);
            }
            max
        };
        let level = self.output_level(kind.is_free(), max_input);
        let output = self
            .wire_keeper
            .borrow_mut()
            .allocate_batch_boolean_value(vec![], level);
        self.add_gate(
            Gate::BatchNormal(BatchNormalGate::new(kind, output, Some(left), right, 0, 0)),
            level,
        )?;
        Ok(output)
    }

    pub fn composite_gate(
        &mut self,
        kind: CompositeGateKind,
        left: WireId<Boolean>,
        rights: &[WireId<Boolean>],
    ) -> Result<Vec<WireId<Boolean>>> {
        if rights.is_empty() {
            return Err(RuntimeError::InvalidArgument("empty wire id vector".into()).into());
        }
        let max_input = {
            let wires = self.wire_keeper.borrow();
            let mut max = wires.first_available_level(left)?;
            for right in rights {
                max = max.max(wires.first_available_level(*right)?);
            }
            max
        };
        let level = self.output_level(kind.is_free(), max_input);
        let outputs: Vec<_> = {
            let mut wires = self.wire_keeper.borrow_mut();
            rights
                .iter()
                .map(|_| wires.allocate_boolean_value(false, level))
                .collect()
        };
        self.add_gate(
            Gate::Composite(CompositeGate::new(
                kind,
                outputs.clone(),
                left,
                rights.to_vec(),
            )),
            level,
        )?;
        Ok(outputs)
    }

    pub fn composite_gate_batch(
        &mut self,
        kind: CompositeGateKind,
        left: WireId<Boolean>,
        rights: &[WireId<Boolean>],
    ) -> Result<Vec<WireId<Boolean>>> {
        if rights.is_empty() {
            return Err(RuntimeError::InvalidArgument("empty wire id vector".into()).into());
        }
        let max_input = {
            let wires = self.wire_keeper.borrow();
            let mut max = wires.batch_first_available_level(left)?;
            for right in rights {
                max = max.max(wires.batch_first_available_level(*right)?);
            }
            max
        };
        let level = self.output_level(kind.is_free(), max_input);
        let outputs: Vec<_> = {
            let mut wires = self.wire_keeper.borrow_mut();
            rights
                .iter()
                .map(|_| wires.allocate_batch_boolean_value(vec![], level))
                .collect()
        };
        self.add_gate(
            Gate::BatchComposite(BatchCompositeGate::new(
                kind,
                outputs.clone(),
                left,
                rights.to_vec(),
            )),
            level,
        )?;
        Ok(outputs)
    }

    // ---- rebatching ----

    pub fn batching_up(&mut self, srcs: Vec<WireId<Boolean>>) -> Result<WireId<Boolean>> {
        if srcs.is_empty() {
            return Err(RuntimeError::InvalidArgument("empty wire id vector".into()).into());
        }
        let max_input = {
            let wires = self.wire_keeper.borrow();
            let mut max = 0;
            for src in &srcs {
                max = max.max(wires.batch_first_available_level(*src)?);
            }
            max
        };
        let level = self.output_level(true, max_input);
        let dst = self
            .wire_keeper
            .borrow_mut()
            .allocate_batch_boolean_value(vec![], level);
        self.add_gate(Gate::Rebatching(RebatchingGate::Batching { srcs, dst }), level)?;
        Ok(dst)
    }

    pub fn unbatching(
        &mut self,
        src: WireId<Boolean>,
        strategy: &[u32],
    ) -> Result<Vec<WireId<Boolean>>> {
        let src_level = self.wire_keeper.borrow().batch_first_available_level(src)?;
        let level = self.output_level(true, src_level);
        let dsts: Vec<_> = {
            let mut wires = self.wire_keeper.borrow_mut();
            strategy
                .iter()
                .map(|_| wires.allocate_batch_boolean_value(vec![], level))
                .collect()
        };
        self.add_gate(
            Gate::Rebatching(RebatchingGate::Unbatching {
                src,
                dsts: dsts.clone(),
                strategy: strategy.to_vec(),
            }),
            level,
        )?;
        Ok(dsts)
    }

    // ---- arithmetic gates ----

    pub fn integer_input_gate(&mut self, initial_value: u64) -> Result<WireId<Arithmetic>> {
        let level = self.output_level(true, self.first_unexecuted_level);
        let output = self
            .wire_keeper
            .borrow_mut()
            .allocate_integer_value(initial_value, level);
        self.add_gate(
            Gate::Arithmetic(ArithmeticGate::new(
                ArithmeticGateKind::Input,
                output,
                None,
                None,
                0,
            )),
            level,
        )?;
        Ok(output)
    }

    pub fn integer_input_gate_batch(
        &mut self,
        initial_value: Vec<u64>,
    ) -> Result<WireId<Arithmetic>> {
        let size = initial_value.len() as u64;
        let level = self.output_level(true, self.first_unexecuted_level);
        let output = self
            .wire_keeper
            .borrow_mut()
            .allocate_batch_integer_value(initial_value, level);
        self.add_gate(
            Gate::BatchArithmetic(BatchArithmeticGate::new(
                ArithmeticGateKind::Input,
                output,
                None,
                None,
                0,
                size,
            )),
            level,
        )?;
        Ok(output)
    }

    pub fn integer_output_gate(
        &mut self,
        src: WireId<Arithmetic>,
        party: PartyId,
    ) -> Result<WireId<Arithmetic>> {
        let src_level = self
            .wire_keeper
            .borrow()
            .integer_first_available_level(src)?;
        let level = self.output_level(false, src_level);
        let output = self
            .wire_keeper
            .borrow_mut()
            .allocate_integer_value(0, level);
        self.add_gate(
            Gate::Arithmetic(ArithmeticGate::new(
                ArithmeticGateKind::Output,
                output,
                Some(src),
                None,
                party,
            )),
            level,
        )?;
        Ok(output)
    }

    pub fn integer_output_gate_batch(
        &mut self,
        src: WireId<Arithmetic>,
        party: PartyId,
    ) -> Result<WireId<Arithmetic>> {
        let src_level = self
            .wire_keeper
            .borrow()
            .batch_integer_first_available_level(src)?;
        let level = self.output_level(false, src_level);
        let output = self
            .wire_keeper
            .borrow_mut()
            .allocate_batch_integer_value(vec![], level);
        self.add_gate(
            Gate::BatchArithmetic(BatchArithmeticGate::new(
                ArithmeticGateKind::Output,
                output,
                Some(src),
                None,
                party,
                0,
            )),
            level,
        )?;
        Ok(output)
    }

    pub fn arithmetic_gate(
        &mut self,
        kind: ArithmeticGateKind,
        left: WireId<Arithmetic>,
        right: Option<WireId<Arithmetic>>,
    ) -> Result<WireId<Arithmetic>> {
        let max_input = {
            let wires = self.wire_keeper.borrow();
            let mut max = wires.integer_first_available_level(left)?;
            if let Some(right) = right {
                max = max.max(wires.integer_first_available_level(right)?);
            }
            max
        };
        let level = self.output_level(kind.is_free(), max_input);
        let output = self
            .wire_keeper
            .borrow_mut()
            .allocate_integer_value(0, level);
        self.add_gate(
            Gate::Arithmetic(ArithmeticGate::new(kind, output, Some(left), right, 0)),
            level,
        )?;
        Ok(output)
    }

    pub fn arithmetic_gate_batch(
        &mut self,
        kind: ArithmeticGateKind,
        left: WireId<Arithmetic>,
        right: Option<WireId<Arithmetic>>,
    ) -> Result<WireId<Arithmetic>> {
        let max_input = {
            let wires = self.wire_keeper.borrow();
            let mut max = wires.batch_integer_first_available_level(left)?;
            if let Some(right) = right {
                max = max.max(wires.batch_integer_first_available_level(right)?);
            }
            max
        };
        let level = self.output_level(kind.is_free(), max_input);
        let output = self
            .wire_keeper
            .borrow_mut()
            .allocate_batch_integer_value(vec![], level);
        self.add_gate(
            Gate::BatchArithmetic(BatchArithmeticGate::new(
                kind,
                output,
                Some(left),
                right,
                0,
                0,
            )),
            level,
        )?;
        Ok(output)
    }

    // ---- level management ----

    pub fn first_unexecuted_level(&self) -> u32 {
        self.first_unexecuted_level
    }

    /// Pop the next level for execution. An empty deque still advances the
    /// level counter so the next gate added starts fresh.
    pub fn pop_first_unexecuted_level(&mut self) -> Vec<Gate> {
        self.first_unexecuted_level += 1;
        match self.gates_by_level_offset.pop_front() {
            Some(gates) => {
                self.num_unexecuted_gates -= gates.len();
                gates
            }
            None => vec![],
        }
    }

    /// True once pending gates exceed the limit; the lazy scheduler polls
    /// this and flushes levels until it clears.
    pub fn has_reached_batching_limit(&self) -> bool {
        self.num_unexecuted_gates > self.max_unexecuted_gates
    }

    fn output_level(&self, is_gate_free: bool, max_input_level: u32) -> u32 {
        let mut level = max_input_level.max(self.first_unexecuted_level)
            + if is_gate_free { 0 } else { 1 };
        if is_level_free(level) != is_gate_free {
            level += 1;
        }
        level
    }

    fn add_gate(&mut self, gate: Gate, level: u32) -> Result<()> {
        gate.retain_wires(&mut self.wire_keeper.borrow_mut())?;
        let offset = (level - self.first_unexecuted_level) as usize;
        while self.gates_by_level_offset.len() <= offset {
            self.gates_by_level_offset.push_back(vec![]);
        }
        self.gates_by_level_offset[offset].push(gate);
        self.num_unexecuted_gates += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keeper() -> (Rc<RefCell<WireKeeper>>, GateKeeper) {
        let wires = Rc::new(RefCell::new(WireKeeper::new()));
        let gates = GateKeeper::new(wires.clone());
        (wires, gates)
    }

    #[test]
    fn test_free_gates_land_on_even_levels() {
        let (wires, mut gates) = keeper();

        let a = gates.input_gate(true).unwrap();
        let b = gates.input_gate(false).unwrap();
        assert_eq!(wires.borrow().first_available_level(a).unwrap(), 0);

        let x = gates
            .normal_gate(NormalGateKind::SymmetricXor, a, Some(b))
            .unwrap();
        // free on free inputs at level 0 joins level 0
        assert_eq!(wires.borrow().first_available_level(x).unwrap(), 0);

        let y = gates
            .normal_gate(NormalGateKind::NonFreeAnd, a, Some(x))
            .unwrap();
        // non-free advances to the first odd level
        assert_eq!(wires.borrow().first_available_level(y).unwrap(), 1);

        let z = gates
            .normal_gate(NormalGateKind::SymmetricXor, y, Some(a))
            .unwrap();
        // free gate fed by a level-1 wire goes to level 2
        assert_eq!(wires.borrow().first_available_level(z).unwrap(), 2);

        let w = gates
            .normal_gate(NormalGateKind::NonFreeAnd, y, Some(y))
            .unwrap();
        // non-free fed by level 1 goes to level 3, not back onto level 1
        assert_eq!(wires.borrow().first_available_level(w).unwrap(), 3);
    }

    #[test]
    fn test_output_gate_is_non_free() {
        let (wires, mut gates) = keeper();
        let a = gates.input_gate(true).unwrap();
        let out = gates.output_gate(a, 1).unwrap();
        assert_eq!(wires.borrow().first_available_level(out).unwrap(), 1);
    }

    #[test]
    fn test_pop_advances_past_empty_levels() {
        let (_wires, mut gates) = keeper();
        assert_eq!(gates.first_unexecuted_level(), 0);
        assert!(gates.pop_first_unexecuted_level().is_empty());
        assert_eq!(gates.first_unexecuted_level(), 1);

        // a free gate added now must not land on the non-free level 1
        gates.input_gate(true).unwrap();
        assert!(gates.pop_first_unexecuted_level().is_empty());
        let popped = gates.pop_first_unexecuted_level();
        assert_eq!(popped.len(), 1);
        assert_eq!(gates.first_unexecuted_level(), 3);
    }

    #[test]
    fn test_gates_are_appended_in_submission_order() {
        let (_wires, mut gates) = keeper();
        let a = gates.input_gate(true).unwrap();
        let b = gates.input_gate(false).unwrap();
        gates
            .normal_gate(NormalGateKind::NonFreeAnd, a, Some(b))
            .unwrap();
        gates
            .normal_gate(NormalGateKind::NonFreeAnd, b, Some(a))
            .unwrap();

        let level0 = gates.pop_first_unexecuted_level();
        assert_eq!(level0.len(), 2); // the two inputs
        let level1 = gates.pop_first_unexecuted_level();
        assert_eq!(level1.len(), 2); // the two ANDs
    }

    #[test]
    fn test_batching_limit() {
        let wires = Rc::new(RefCell::new(WireKeeper::new()));
        let mut gates = GateKeeper::with_batching_limit(wires, 3);
        for _ in 0..3 {
            gates.input_gate(false).unwrap();
        }
        assert!(!gates.has_reached_batching_limit());
        gates.input_gate(false).unwrap();
        assert!(gates.has_reached_batching_limit());
    }

    #[test]
    fn test_gate_retains_operand_wires() {
        let (wires, mut gates) = keeper();
        let a = gates.input_gate(true).unwrap();
        // handle + input gate
        wires.borrow_mut().decrease_reference_count(a).unwrap();
        assert_eq!(wires.borrow().wire_statistics(), (1, 0));
        let popped = gates.pop_first_unexecuted_level();
        for gate in &popped {
            gate.release_wires(&mut wires.borrow_mut()).unwrap();
        }
        assert_eq!(wires.borrow().wire_statistics(), (1, 1));
    }
}
