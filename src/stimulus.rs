//! Scheduled external forcing of block states.
//!
//! A stimulus is what the editor's "toggle input" would do over time: at a
//! given cycle, overwrite the state of a block before that cycle's pass runs.
//! It is meant for source blocks, whose passthrough holds a forced value when
//! no input is wired.

use serde::{Deserialize, Serialize};

use crate::logic::Logic;
use crate::types::{BlockId, Cycle};

/// One forced write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StimulusEvent {
    pub cycle: Cycle,
    pub block: BlockId,
    pub value: Logic,
}

/// Forced writes ordered by cycle.
///
/// Events scheduled for the same cycle are applied in insertion order, so a
/// later write to the same block wins.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stimulus {
    events: Vec<StimulusEvent>,
}

impl Stimulus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a write, builder style.
    pub fn at(mut self, cycle: Cycle, block: BlockId, value: impl Into<Logic>) -> Self {
        self.push(cycle, block, value);
        self
    }

    /// Schedules a write.
    pub fn push(&mut self, cycle: Cycle, block: BlockId, value: impl Into<Logic>) {
        let event = StimulusEvent {
            cycle,
            block,
            value: value.into(),
        };
        let position = self.events.partition_point(|e| e.cycle <= cycle);
        self.events.insert(position, event);
    }

    /// Writes scheduled for `cycle`, in application order.
    pub fn events_at(&self, cycle: Cycle) -> &[StimulusEvent] {
        let start = self.events.partition_point(|e| e.cycle < cycle);
        let end = self.events.partition_point(|e| e.cycle <= cycle);
        &self.events[start..end]
    }

    pub fn events(&self) -> &[StimulusEvent] {
        &self.events
    }

    /// Cycle of the last scheduled write.
    pub fn last_cycle(&self) -> Option<Cycle> {
        self.events.last().map(|e| e.cycle)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl FromIterator<StimulusEvent> for Stimulus {
    fn from_iter<I: IntoIterator<Item = StimulusEvent>>(iter: I) -> Self {
        let mut stimulus = Stimulus::new();
        for event in iter {
            stimulus.push(event.cycle, event.block, event.value);
        }
        stimulus
    }
}
