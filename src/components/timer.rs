//! On-delay, off-delay and pulse timers counted in clock cycles.

use crate::clock::Clock;
use crate::logic::Logic;
use crate::types::Cycle;

/// Timer behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerMode {
    /// Output rises once the input has held true for the full delay.
    OnDelay,
    /// Output drops once the input has held false for the full delay.
    OffDelay,
    /// Output is true for exactly `delay` cycles after each rising edge.
    Pulse,
}

/// A timer with its countdown state.
///
/// `armed` and `deadline` persist across ticks; `last_input` is kept for edge
/// detection. An unknown input disarms the timer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timer {
    pub mode: TimerMode,
    /// Delay in whole cycles.
    pub delay: Cycle,
    armed: bool,
    deadline: Cycle,
    last_input: Logic,
}

impl Timer {
    pub fn new(mode: TimerMode, delay: Cycle) -> Self {
        Self {
            mode,
            delay,
            armed: false,
            deadline: 0,
            last_input: Logic::Unknown,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Cycle at which the running countdown expires, if armed.
    pub fn deadline(&self) -> Option<Cycle> {
        self.armed.then_some(self.deadline)
    }

    /// # Panics
    /// If given more than one input level. Construction rejects such wiring
    /// before the first tick.
    pub fn evaluate(&mut self, inputs: &[Logic], clock: &Clock) -> Logic {
        assert!(inputs.len() <= 1, "timer wired to {} inputs", inputs.len());
        let input = inputs.first().copied().unwrap_or(Logic::Unknown);
        let now = clock.cycle();

        let rising = input == Logic::True && self.last_input != Logic::True;
        let falling = input == Logic::False && self.last_input == Logic::True;
        self.last_input = input;

        if input == Logic::Unknown {
            self.armed = false;
            return Logic::Unknown;
        }

        match self.mode {
            TimerMode::OnDelay => self.on_delay(input, rising, now),
            TimerMode::OffDelay => self.off_delay(input, falling, now),
            TimerMode::Pulse => self.pulse(rising, now),
        }
    }

    fn arm(&mut self, now: Cycle) {
        self.armed = true;
        self.deadline = now.saturating_add(self.delay);
    }

    fn on_delay(&mut self, input: Logic, rising: bool, now: Cycle) -> Logic {
        if input == Logic::False {
            self.armed = false;
            return Logic::False;
        }
        if rising {
            self.arm(now);
        }
        Logic::from(self.armed && now >= self.deadline)
    }

    fn off_delay(&mut self, input: Logic, falling: bool, now: Cycle) -> Logic {
        if input == Logic::True {
            self.armed = false;
            return Logic::True;
        }
        if falling {
            self.arm(now);
        }
        if self.armed && now >= self.deadline {
            self.armed = false;
        }
        Logic::from(self.armed)
    }

    fn pulse(&mut self, rising: bool, now: Cycle) -> Logic {
        if self.armed && now >= self.deadline {
            self.armed = false;
        }
        if rising && !self.armed && self.delay > 0 {
            self.arm(now);
        }
        Logic::from(self.armed)
    }
}
