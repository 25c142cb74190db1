//! The simulation clock.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::Cycle;

/// Default tick length in milliseconds.
pub const DEFAULT_RESOLUTION_MS: u64 = 100;

/// Monotonic cycle counter with a fixed resolution.
///
/// The clock is not tied to wall time. Callers decide how often to tick it;
/// every tick stands for exactly `resolution_ms` of simulated time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    cycle: Cycle,
    resolution_ms: u64,
}

impl Clock {
    /// Creates a clock at cycle 0.
    ///
    /// # Panics
    /// If `resolution_ms` is zero.
    pub fn new(resolution_ms: u64) -> Self {
        assert!(resolution_ms > 0, "clock resolution must be at least 1 ms");
        Self {
            cycle: 0,
            resolution_ms,
        }
    }

    pub fn cycle(&self) -> Cycle {
        self.cycle
    }

    pub fn resolution_ms(&self) -> u64 {
        self.resolution_ms
    }

    /// Advances the clock by exactly one cycle.
    pub fn tick(&mut self) {
        self.cycle += 1;
    }

    /// Simulated time elapsed since cycle 0.
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.cycle.saturating_mul(self.resolution_ms))
    }

    /// Number of whole cycles closest to `duration`.
    pub fn cycles_for(&self, duration: Duration) -> Cycle {
        let ms = duration.as_secs_f64() * 1000.0;
        (ms / self.resolution_ms as f64).round() as Cycle
    }

    /// Rewinds to cycle 0.
    pub fn reset(&mut self) {
        self.cycle = 0;
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLUTION_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_increments_by_one() {
        let mut clock = Clock::new(100);
        assert_eq!(clock.cycle(), 0);
        clock.tick();
        clock.tick();
        assert_eq!(clock.cycle(), 2);
        assert_eq!(clock.elapsed(), Duration::from_millis(200));
        clock.reset();
        assert_eq!(clock.cycle(), 0);
    }

    #[test]
    fn test_cycles_for() {
        let clock = Clock::new(100);
        assert_eq!(clock.cycles_for(Duration::from_secs(1)), 10);
        assert_eq!(clock.cycles_for(Duration::from_millis(250)), 3);
        assert_eq!(clock.cycles_for(Duration::ZERO), 0);
    }

    #[test]
    #[should_panic(expected = "resolution")]
    fn test_zero_resolution_rejected() {
        Clock::new(0);
    }
}
