//! Set/reset memory.

use crate::logic::Logic;
use crate::properties::Priority;

/// Set/reset latch with a configured priority.
///
/// Input 0 is Set, input 1 is Reset. With neither asserted the latch holds
/// the state it had after the previous tick. Unknown inputs are resolved by
/// trying both levels: if every combination yields the same state, that
/// state is kept, otherwise the latch reports `Unknown`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SrMemory {
    pub priority: Priority,
}

impl SrMemory {
    pub fn new(priority: Priority) -> Self {
        Self { priority }
    }

    /// # Panics
    /// If more than two inputs are wired.
    pub fn evaluate(&self, inputs: &[Logic], previous: Logic) -> Logic {
        assert!(
            inputs.len() <= 2,
            "set/reset memory wired to {} inputs",
            inputs.len()
        );
        let set = inputs.first().copied().unwrap_or(Logic::Unknown);
        let reset = inputs.get(1).copied().unwrap_or(Logic::Unknown);

        let mut outcome = None;
        for &s in candidates(set) {
            for &r in candidates(reset) {
                let next = self.next(s, r, previous);
                outcome = match outcome {
                    None => Some(next),
                    Some(seen) if seen == next => Some(seen),
                    Some(_) => return Logic::Unknown,
                };
            }
        }
        outcome.unwrap_or(Logic::Unknown)
    }

    fn next(&self, set: bool, reset: bool, previous: Logic) -> Logic {
        match (set, reset) {
            (true, false) => Logic::True,
            (false, true) => Logic::False,
            (true, true) => Logic::from(self.priority == Priority::Set),
            (false, false) => previous,
        }
    }
}

fn candidates(value: Logic) -> &'static [bool] {
    match value {
        Logic::False => &[false],
        Logic::True => &[true],
        Logic::Unknown => &[false, true],
    }
}
