//! The wire keeper: arena-backed store of every live wire.
//!
//! Four value families share the same arena shape: scalar bool, scalar u64,
//! batch bool, batch u64. Reference counts are the only release mechanism;
//! when a count hits zero the slot is freed and the deallocation counter
//! bumps. The default arena keeps freed slots poisoned so any later access
//! dies with a lifecycle error; the recycling variant trades that safety
//! for slot reuse.

use anyhow::Result;

use crate::errors::RuntimeError;
use crate::scheduler::{Arithmetic, Boolean, WireId};

struct WireRecord<V> {
    value: V,
    first_available_level: u32,
    reference_count: u32,
}

struct BatchWireRecord<V> {
    values: Vec<V>,
    expected_batch_size: usize,
    first_available_level: u32,
    reference_count: u32,
}

struct WireArena<R> {
    slots: Vec<Option<R>>,
    free_slots: Vec<u64>,
    recycle: bool,
}

impl<R> WireArena<R> {
    fn new(recycle: bool) -> Self {
        Self {
            slots: vec![],
            free_slots: vec![],
            recycle,
        }
    }

    fn allocate(&mut self, record: R) -> u64 {
        if self.recycle {
            if let Some(id) = self.free_slots.pop() {
                self.slots[id as usize] = Some(record);
                return id;
            }
        }
        self.slots.push(Some(record));
        (self.slots.len() - 1) as u64
    }

    fn get(&self, id: u64) -> Result<&R> {
        self.slots
            .get(id as usize)
            .and_then(|slot| slot.as_ref())
            .ok_or_else(|| RuntimeError::Lifecycle(format!("wire {} is not alive", id)).into())
    }

    fn get_mut(&mut self, id: u64) -> Result<&mut R> {
        self.slots
            .get_mut(id as usize)
            .and_then(|slot| slot.as_mut())
            .ok_or_else(|| RuntimeError::Lifecycle(format!("wire {} is not alive", id)).into())
    }

    fn free(&mut self, id: u64) {
        self.slots[id as usize] = None;
        if self.recycle {
            self.free_slots.push(id);
        }
    }
}

/// The single mutable repository of wire state.
pub struct WireKeeper {
    bool_wires: WireArena<WireRecord<bool>>,
    int_wires: WireArena<WireRecord<u64>>,
    bool_batch_wires: WireArena<BatchWireRecord<bool>>,
    int_batch_wires: WireArena<BatchWireRecord<u64>>,
    allocated: u64,
    deallocated: u64,
}

macro_rules! scalar_accessors {
    ($family:ty, $arena:ident, $value:ty,
     $allocate:ident, $get:ident, $set:ident,
     $get_level:ident, $set_level:ident, $inc:ident, $dec:ident) => {
        pub fn $allocate(&mut self, v: $value, first_available_level: u32) -> WireId<$family> {
            self.allocated += 1;
            let id = self.$arena.allocate(WireRecord {
                value: v,
                first_available_level,
                reference_count: 1,
            });
            WireId::new(id)
        }

        pub fn $get(&self, id: WireId<$family>) -> Result<$value> {
            Ok(self.$arena.get(id.raw())?.value)
        }

        pub fn $set(&mut self, id: WireId<$family>, v: $value) -> Result<()> {
            self.$arena.get_mut(id.raw())?.value = v;
            Ok(())
        }

        pub fn $get_level(&self, id: WireId<$family>) -> Result<u32> {
            Ok(self.$arena.get(id.raw())?.first_available_level)
        }

        pub fn $set_level(&mut self, id: WireId<$family>, level: u32) -> Result<()> {
            self.$arena.get_mut(id.raw())?.first_available_level = level;
            Ok(())
        }

        pub fn $inc(&mut self, id: WireId<$family>) -> Result<()> {
            self.$arena.get_mut(id.raw())?.reference_count += 1;
            Ok(())
        }

        pub fn $dec(&mut self, id: WireId<$family>) -> Result<()> {
            let record = self.$arena.get_mut(id.raw())?;
            record.reference_count -= 1;
            if record.reference_count == 0 {
                self.deallocated += 1;
                self.$arena.free(id.raw());
            }
            Ok(())
        }
    };
}

macro_rules! batch_accessors {
    ($family:ty, $arena:ident, $value:ty,
     $allocate:ident, $get:ident, $set:ident, $batch_size:ident,
     $get_level:ident, $set_level:ident, $inc:ident, $dec:ident) => {
        /// Allocate a batch wire; the expected batch size is fixed by `v`,
        /// except that an empty allocation leaves it open until the first
        /// non-empty set (gate outputs are allocated before their size is
        /// known).
        pub fn $allocate(&mut self, v: Vec<$value>, first_available_level: u32) -> WireId<$family> {
            self.allocated += 1;
            let id = self.$arena.allocate(BatchWireRecord {
                expected_batch_size: v.len(),
                values: v,
                first_available_level,
                reference_count: 1,
            });
            WireId::new(id)
        }

        pub fn $get(&self, id: WireId<$family>) -> Result<Vec<$value>> {
            Ok(self.$arena.get(id.raw())?.values.clone())
        }

        pub fn $set(&mut self, id: WireId<$family>, v: Vec<$value>) -> Result<()> {
            let record = self.$arena.get_mut(id.raw())?;
            if record.expected_batch_size == 0 {
                record.expected_batch_size = v.len();
            } else if record.expected_batch_size != v.len() {
                return Err(RuntimeError::InvalidArgument(format!(
                    "wire batch size is {}, got a vector of {}",
                    record.expected_batch_size,
                    v.len()
                ))
                .into());
            }
            record.values = v;
            Ok(())
        }

        pub fn $batch_size(&self, id: WireId<$family>) -> Result<usize> {
            Ok(self.$arena.get(id.raw())?.expected_batch_size)
        }

        pub fn $get_level(&self, id: WireId<$family>) -> Result<u32> {
            Ok(self.$arena.get(id.raw())?.first_available_level)
        }

        pub fn $set_level(&mut self, id: WireId<$family>, level: u32) -> Result<()> {
            self.$arena.get_mut(id.raw())?.first_available_level = level;
            Ok(())
        }

        pub fn $inc(&mut self, id: WireId<$family>) -> Result<()> {
            self.$arena.get_mut(id.raw())?.reference_count += 1;
            Ok(())
        }

        pub fn $dec(&mut self, id: WireId<$family>) -> Result<()> {
            let record = self.$arena.get_mut(id.raw())?;
            record.reference_count -= 1;
            if record.reference_count == 0 {
                self.deallocated += 1;
                self.$arena.free(id.raw());
            }
            Ok(())
        }
    };
}

impl WireKeeper {
    /// Keeper whose freed slots stay poisoned: reading one is a fatal
    /// lifecycle error. This is the variant the tests run against.
    pub fn new() -> Self {
        Self::with_recycling(false)
    }

    /// Keeper that reuses freed slots. Cheaper on memory, but a stale id
    /// can silently alias a newer wire.
    pub fn with_unsafe_recycling() -> Self {
        Self::with_recycling(true)
    }

    fn with_recycling(recycle: bool) -> Self {
        Self {
            bool_wires: WireArena::new(recycle),
            int_wires: WireArena::new(recycle),
            bool_batch_wires: WireArena::new(recycle),
            int_batch_wires: WireArena::new(recycle),
            allocated: 0,
            deallocated: 0,
        }
    }

    scalar_accessors!(
        Boolean,
        bool_wires,
        bool,
        allocate_boolean_value,
        boolean_value,
        set_boolean_value,
        first_available_level,
        set_first_available_level,
        increase_reference_count,
        decrease_reference_count
    );

    scalar_accessors!(
        Arithmetic,
        int_wires,
        u64,
        allocate_integer_value,
        integer_value,
        set_integer_value,
        integer_first_available_level,
        set_integer_first_available_level,
        increase_integer_reference_count,
        decrease_integer_reference_count
    );

    batch_accessors!(
        Boolean,
        bool_batch_wires,
        bool,
        allocate_batch_boolean_value,
        batch_boolean_value,
        set_batch_boolean_value,
        batch_size,
        batch_first_available_level,
        set_batch_first_available_level,
        increase_batch_reference_count,
        decrease_batch_reference_count
    );

    batch_accessors!(
        Arithmetic,
        int_batch_wires,
        u64,
        allocate_batch_integer_value,
        batch_integer_value,
        set_batch_integer_value,
        integer_batch_size,
        batch_integer_first_available_level,
        set_batch_integer_first_available_level,
        increase_batch_integer_reference_count,
        decrease_batch_integer_reference_count
    );

    /// (allocated, deallocated). The difference is a leak detector.
    pub fn wire_statistics(&self) -> (u64, u64) {
        (self.allocated, self.deallocated)
    }
}

impl Default for WireKeeper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_lifecycle() {
        let mut keeper = WireKeeper::new();

        let w = keeper.allocate_boolean_value(true, 3);
        assert!(keeper.boolean_value(w).unwrap());
        assert_eq!(keeper.first_available_level(w).unwrap(), 3);

        keeper.set_boolean_value(w, false).unwrap();
        assert!(!keeper.boolean_value(w).unwrap());

        keeper.increase_reference_count(w).unwrap();
        keeper.decrease_reference_count(w).unwrap();
        assert_eq!(keeper.wire_statistics(), (1, 0));

        keeper.decrease_reference_count(w).unwrap();
        assert_eq!(keeper.wire_statistics(), (1, 1));

        // freed slot is poisoned
        assert!(keeper.boolean_value(w).is_err());
        assert!(keeper.decrease_reference_count(w).is_err());
    }

    #[test]
    fn test_batch_size_enforcement() {
        let mut keeper = WireKeeper::new();

        let w = keeper.allocate_batch_boolean_value(vec![true, false], 0);
        assert_eq!(keeper.batch_size(w).unwrap(), 2);
        assert!(keeper
            .set_batch_boolean_value(w, vec![true, false, true])
            .is_err());

        // output wires start empty; the first set pins the size
        let out = keeper.allocate_batch_boolean_value(vec![], 1);
        keeper
            .set_batch_boolean_value(out, vec![false, true, true])
            .unwrap();
        assert_eq!(keeper.batch_size(out).unwrap(), 3);
        assert!(keeper.set_batch_boolean_value(out, vec![false]).is_err());
    }

    #[test]
    fn test_recycling_reuses_slots() {
        let mut keeper = WireKeeper::with_unsafe_recycling();

        let w = keeper.allocate_integer_value(42, 0);
        keeper.decrease_integer_reference_count(w).unwrap();
        let v = keeper.allocate_integer_value(43, 0);
        assert_eq!(w.raw(), v.raw());

        // the safe keeper never hands the slot out again
        let mut keeper = WireKeeper::new();
        let w = keeper.allocate_integer_value(42, 0);
        keeper.decrease_integer_reference_count(w).unwrap();
        let v = keeper.allocate_integer_value(43, 0);
        assert_ne!(w.raw(), v.raw());
    }

    #[test]
    fn test_families_do_not_share_ids() {
        let mut keeper = WireKeeper::new();
        let scalar = keeper.allocate_boolean_value(true, 0);
        let batch = keeper.allocate_batch_boolean_value(vec![false], 0);
        assert_eq!(scalar.raw(), 0);
        assert_eq!(batch.raw(), 0);
        assert!(keeper.boolean_value(scalar).unwrap());
        assert_eq!(keeper.batch_boolean_value(batch).unwrap(), vec![false]);
    }

    #[test]
    fn test_level_is_settable() {
        let mut keeper = WireKeeper::new();
        let w = keeper.allocate_batch_integer_value(vec![1, 2], 4);
        assert_eq!(keeper.batch_integer_first_available_level(w).unwrap(), 4);
        keeper.set_batch_integer_first_available_level(w, 6).unwrap();
        assert_eq!(keeper.batch_integer_first_available_level(w).unwrap(), 6);
    }
}
