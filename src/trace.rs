//! Per-tick state recording and export.
//!
//! A [`StateTrace`] samples a fixed set of probed blocks after every tick and
//! exports the samples as CSV (one row per cycle) or JSON.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::executor::Simulations;
use crate::logic::Logic;
use crate::types::{BlockId, Cycle};

/// States of all probes after one tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceSample {
    /// Cycle whose pass produced these states.
    pub cycle: Cycle,
    /// One state per probe, in probe order.
    pub states: Vec<Logic>,
}

/// Recorded states of a set of blocks over time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateTrace {
    probes: Vec<BlockId>,
    labels: Vec<String>,
    samples: Vec<TraceSample>,
}

impl StateTrace {
    /// Creates an empty trace for `probes`, labelled by block handle.
    pub fn new(probes: Vec<BlockId>) -> Self {
        let labels = probes.iter().map(BlockId::to_string).collect();
        Self {
            probes,
            labels,
            samples: Vec::new(),
        }
    }

    /// Creates an empty trace with explicit column labels.
    ///
    /// # Panics
    /// If `labels` and `probes` differ in length.
    pub fn with_labels(probes: Vec<BlockId>, labels: Vec<String>) -> Self {
        assert_eq!(probes.len(), labels.len(), "one label per probe");
        Self {
            probes,
            labels,
            samples: Vec::new(),
        }
    }

    pub fn probes(&self) -> &[BlockId] {
        &self.probes
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn samples(&self) -> &[TraceSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples every probe. Probes without a component read `Unknown`.
    pub fn record(&mut self, cycle: Cycle, simulations: &Simulations) {
        let states = self
            .probes
            .iter()
            .map(|&block| simulations.state(block).unwrap_or_default())
            .collect();
        self.samples.push(TraceSample { cycle, states });
    }

    /// All recorded states of one probe.
    pub fn column(&self, block: BlockId) -> Option<Vec<Logic>> {
        let position = self.probes.iter().position(|&p| p == block)?;
        Some(self.samples.iter().map(|s| s.states[position]).collect())
    }

    /// Exports the trace to CSV, with `0`, `1` and `X` for the three states.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("cycle");
        for label in &self.labels {
            csv.push(',');
            push_csv_field(&mut csv, label);
        }
        csv.push('\n');

        for sample in &self.samples {
            csv.push_str(&sample.cycle.to_string());
            for state in &sample.states {
                csv.push(',');
                csv.push_str(state.symbol());
            }
            csv.push('\n');
        }
        csv
    }

    /// Exports the trace to a CSV file.
    pub fn write_csv_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        std::fs::write(path, self.to_csv())
    }

    /// Exports the trace to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Appends `field`, quoted when it contains a separator, quote or line break.
fn push_csv_field(csv: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        csv.push('"');
        csv.push_str(&field.replace('"', "\"\""));
        csv.push('"');
    } else {
        csv.push_str(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Behavior, BlockKind, Component};
    use crate::components::Passthrough;
    use crate::types::ComponentId;

    fn single_source(state: Logic) -> Simulations {
        let component = Component::new(
            BlockId(0),
            BlockKind::Signal,
            Behavior::Passthrough(Passthrough),
            state,
        );
        let index = [(BlockId(0), ComponentId(0))].into_iter().collect();
        Simulations::new(vec![component], index)
    }

    #[test]
    fn test_record_and_csv() {
        let mut sims = single_source(Logic::True);
        let mut trace = StateTrace::with_labels(vec![BlockId(0), BlockId(7)], vec!["in".into(), "ghost".into()]);

        trace.record(0, &sims);
        sims.force(BlockId(0), Logic::False);
        trace.record(1, &sims);

        assert_eq!(trace.len(), 2);
        assert_eq!(trace.to_csv(), "cycle,in,ghost\n0,1,X\n1,0,X\n");
        assert_eq!(trace.column(BlockId(0)), Some(vec![Logic::True, Logic::False]));
        assert_eq!(trace.column(BlockId(3)), None);
    }

    #[test]
    fn test_csv_quotes_labels() {
        let sims = single_source(Logic::True);
        let mut trace = StateTrace::with_labels(
            vec![BlockId(0), BlockId(1), BlockId(2)],
            vec!["pump, main".into(), "say \"hi\"".into(), "plain".into()],
        );
        trace.record(0, &sims);

        assert_eq!(
            trace.to_csv(),
            "cycle,\"pump, main\",\"say \"\"hi\"\"\",plain\n0,1,X,X\n"
        );
    }

    #[test]
    fn test_default_labels() {
        let trace = StateTrace::new(vec![BlockId(2), BlockId(5)]);
        assert_eq!(trace.labels(), ["b2".to_string(), "b5".to_string()]);
        assert!(trace.is_empty());
    }

    #[test]
    fn test_json_export() {
        let sims = single_source(Logic::Unknown);
        let mut trace = StateTrace::new(vec![BlockId(0)]);
        trace.record(3, &sims);

        let value: serde_json::Value = serde_json::from_str(&trace.to_json().unwrap()).unwrap();
        assert_eq!(value["samples"][0]["cycle"], 3);
        assert_eq!(value["samples"][0]["states"][0], "unknown");
    }

    #[test]
    fn test_write_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.csv");
        let mut trace = StateTrace::new(vec![BlockId(0)]);
        trace.record(0, &single_source(Logic::True));

        trace.write_csv_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "cycle,b0\n0,1\n");
    }
}
