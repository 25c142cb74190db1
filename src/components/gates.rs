//! Combinational components: passthrough, AND, OR, XOR and inverter.
//!
//! Each gate receives its input levels already corrected for wire inversion
//! and returns the new state. Unconnected inputs arrive as `Unknown`.

use crate::logic::Logic;

/// Copies its single input. With no input wired it holds its state, which is
/// how source blocks keep a value forced from outside.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Passthrough;

impl Passthrough {
    /// # Panics
    /// If given more than one input level. Construction rejects such wiring
    /// before the first tick.
    pub fn evaluate(&self, inputs: &[Logic], previous: Logic) -> Logic {
        assert!(
            inputs.len() <= 1,
            "passthrough component wired to {} inputs",
            inputs.len()
        );
        inputs.first().copied().unwrap_or(previous)
    }
}

/// N-ary AND. Fewer than two inputs leave it undefined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AndGate;

impl AndGate {
    pub fn evaluate(&self, inputs: &[Logic]) -> Logic {
        if inputs.len() < 2 {
            return Logic::Unknown;
        }
        inputs.iter().fold(Logic::True, |acc, &v| acc.and(v))
    }
}

/// N-ary OR with a threshold: true once at least `counter` inputs are true.
///
/// A counter of 1 is the plain OR.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrGate {
    pub counter: usize,
}

impl Default for OrGate {
    fn default() -> Self {
        Self { counter: 1 }
    }
}

impl OrGate {
    pub fn new(counter: usize) -> Self {
        Self { counter }
    }

    pub fn evaluate(&self, inputs: &[Logic]) -> Logic {
        if inputs.len() < 2 {
            return Logic::Unknown;
        }
        let high = inputs.iter().filter(|&&v| v == Logic::True).count();
        let unknown = inputs.iter().filter(|&&v| v == Logic::Unknown).count();

        if high >= self.counter {
            Logic::True
        } else if high + unknown < self.counter {
            Logic::False
        } else {
            Logic::Unknown
        }
    }
}

/// N-ary XOR (odd parity).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct XorGate;

impl XorGate {
    pub fn evaluate(&self, inputs: &[Logic]) -> Logic {
        if inputs.len() < 2 {
            return Logic::Unknown;
        }
        inputs.iter().fold(Logic::False, |acc, &v| acc.xor(v))
    }
}

/// Negates its single input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Inverter;

impl Inverter {
    /// # Panics
    /// If given more than one input level. Construction rejects such wiring
    /// before the first tick.
    pub fn evaluate(&self, inputs: &[Logic]) -> Logic {
        assert!(
            inputs.len() <= 1,
            "inverter component wired to {} inputs",
            inputs.len()
        );
        inputs.first().map_or(Logic::Unknown, |v| v.not())
    }
}
