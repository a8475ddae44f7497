//! Observational metric surface.
//!
//! Components export name→value maps through [MetricRecorder]; a
//! [MetricCollector] aggregates recorders under a common prefix. Nothing
//! here influences protocol behavior.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub trait MetricRecorder {
    fn name(&self) -> &str;
    fn collect(&self) -> BTreeMap<String, u64>;
}

/// Aggregates recorders; keys come out as `prefix.recorder.metric`.
pub struct MetricCollector {
    prefix: String,
    recorders: Vec<Rc<dyn MetricRecorder>>,
}

impl MetricCollector {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            recorders: vec![],
        }
    }

    pub fn append(&mut self, recorder: Rc<dyn MetricRecorder>) {
        self.recorders.push(recorder);
    }

    pub fn collect_metrics(&self) -> BTreeMap<String, u64> {
        let mut out = BTreeMap::new();
        for recorder in &self.recorders {
            for (key, value) in recorder.collect() {
                out.insert(format!("{}.{}.{}", self.prefix, recorder.name(), key), value);
            }
        }
        out
    }
}

/// Free/non-free gate counters, shared between a scheduler and whichever
/// collector wants to observe it.
pub struct GateStatsRecorder {
    name: String,
    non_free_gates: Cell<u64>,
    free_gates: Cell<u64>,
}

impl GateStatsRecorder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            non_free_gates: Cell::new(0),
            free_gates: Cell::new(0),
        }
    }

    pub(crate) fn add_free(&self, n: u64) {
        self.free_gates.set(self.free_gates.get() + n);
    }

    pub(crate) fn add_non_free(&self, n: u64) {
        self.non_free_gates.set(self.non_free_gates.get() + n);
    }

    /// (non-free, free) gates executed so far.
    pub fn statistics(&self) -> (u64, u64) {
        (self.non_free_gates.get(), self.free_gates.get())
    }
}

impl MetricRecorder for GateStatsRecorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn collect(&self) -> BTreeMap<String, u64> {
        BTreeMap::from([
            ("non_free_gates".to_string(), self.non_free_gates.get()),
            ("free_gates".to_string(), self.free_gates.get()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_prefixes_keys() {
        let recorder = Rc::new(GateStatsRecorder::new("gates"));
        recorder.add_free(3);
        recorder.add_non_free(1);

        let mut collector = MetricCollector::new("scheduler");
        collector.append(recorder.clone());

        let metrics = collector.collect_metrics();
        assert_eq!(metrics["scheduler.gates.free_gates"], 3);
        assert_eq!(metrics["scheduler.gates.non_free_gates"], 1);
        assert_eq!(recorder.statistics(), (1, 3));
    }
}
