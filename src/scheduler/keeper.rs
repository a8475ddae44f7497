//! Thread-local scheduler slots.
//!
//! A frontend that wants an ambient scheduler installs one per integer
//! slot. Installation is one-shot: a second install into an occupied slot
//! is a lifecycle error, and every test must tear down the slots it
//! installed. Schedulers never leak across threads.

use anyhow::Result;
use std::cell::RefCell;
use std::collections::HashMap;

use crate::errors::RuntimeError;
use crate::scheduler::ArithmeticScheduler;

thread_local! {
    static SLOTS: RefCell<HashMap<usize, Box<dyn ArithmeticScheduler>>> =
        RefCell::new(HashMap::new());
}

/// Install a scheduler into `slot`. Fails if the slot is occupied.
pub fn install_scheduler(slot: usize, scheduler: Box<dyn ArithmeticScheduler>) -> Result<()> {
    SLOTS.with(|slots| {
        let mut slots = slots.borrow_mut();
        if slots.contains_key(&slot) {
            return Err(
                RuntimeError::Lifecycle(format!("scheduler slot {} is already installed", slot))
                    .into(),
            );
        }
        slots.insert(slot, scheduler);
        Ok(())
    })
}

/// Run `f` against the scheduler in `slot`.
pub fn with_scheduler<T>(
    slot: usize,
    f: impl FnOnce(&mut dyn ArithmeticScheduler) -> Result<T>,
) -> Result<T> {
    SLOTS.with(|slots| {
        let mut slots = slots.borrow_mut();
        let scheduler = slots.get_mut(&slot).ok_or_else(|| {
            RuntimeError::Lifecycle(format!("no scheduler installed in slot {}", slot))
        })?;
        f(scheduler.as_mut())
    })
}

/// Remove and drop the scheduler in `slot`, releasing its wires and
/// closing its transport. Fails if the slot is empty.
pub fn teardown_scheduler(slot: usize) -> Result<()> {
    SLOTS.with(|slots| {
        slots.borrow_mut().remove(&slot).ok_or_else(|| {
            RuntimeError::Lifecycle(format!("no scheduler installed in slot {}", slot))
        })?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::plaintext::PlaintextScheduler;
    use crate::scheduler::wire_keeper::WireKeeper;
    use crate::scheduler::Scheduler;

    #[test]
    fn test_one_shot_install_and_teardown() {
        let slot = 7;
        install_scheduler(slot, Box::new(PlaintextScheduler::new(WireKeeper::new()))).unwrap();

        // occupied slot rejects a second install
        let again = install_scheduler(slot, Box::new(PlaintextScheduler::new(WireKeeper::new())));
        assert!(again.is_err());

        let value = with_scheduler(slot, |s| {
            let w = s.public_boolean_input(true)?;
            s.get_boolean_value(w)
        })
        .unwrap();
        assert!(value);

        teardown_scheduler(slot).unwrap();
        assert!(teardown_scheduler(slot).is_err());
        assert!(with_scheduler(slot, |_| Ok(())).is_err());

        // the slot is reusable after teardown
        install_scheduler(slot, Box::new(PlaintextScheduler::new(WireKeeper::new()))).unwrap();
        teardown_scheduler(slot).unwrap();
    }
}
