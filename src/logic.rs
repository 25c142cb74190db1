//! Tri-state boolean values.
//!
//! Every signal in a running circuit is one of `False`, `True` or `Unknown`.
//! `Unknown` is what a component reports before it has been driven, and it
//! propagates through operators unless the other operand short-circuits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A tri-state logic level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Logic {
    False,
    True,
    #[default]
    Unknown,
}

impl Logic {
    /// Returns true if the value is `True` or `False`.
    pub fn is_known(self) -> bool {
        !matches!(self, Logic::Unknown)
    }

    /// Returns the value as a `bool`, or `None` when unknown.
    pub fn to_bool(self) -> Option<bool> {
        match self {
            Logic::False => Some(false),
            Logic::True => Some(true),
            Logic::Unknown => None,
        }
    }

    /// Logical negation; `Unknown` stays `Unknown`.
    pub fn not(self) -> Logic {
        match self {
            Logic::False => Logic::True,
            Logic::True => Logic::False,
            Logic::Unknown => Logic::Unknown,
        }
    }

    /// Negates the value when `inverted` is set.
    pub fn invert_if(self, inverted: bool) -> Logic {
        if inverted {
            self.not()
        } else {
            self
        }
    }

    /// Two-operand AND. A `False` operand wins over `Unknown`.
    pub fn and(self, other: Logic) -> Logic {
        match (self, other) {
            (Logic::False, _) | (_, Logic::False) => Logic::False,
            (Logic::True, Logic::True) => Logic::True,
            _ => Logic::Unknown,
        }
    }

    /// Two-operand OR. A `True` operand wins over `Unknown`.
    pub fn or(self, other: Logic) -> Logic {
        match (self, other) {
            (Logic::True, _) | (_, Logic::True) => Logic::True,
            (Logic::False, Logic::False) => Logic::False,
            _ => Logic::Unknown,
        }
    }

    /// Two-operand XOR. Any `Unknown` operand makes the result `Unknown`.
    pub fn xor(self, other: Logic) -> Logic {
        match (self.to_bool(), other.to_bool()) {
            (Some(a), Some(b)) => Logic::from(a ^ b),
            _ => Logic::Unknown,
        }
    }

    /// Short label used by dumps and traces.
    pub fn symbol(self) -> &'static str {
        match self {
            Logic::False => "0",
            Logic::True => "1",
            Logic::Unknown => "X",
        }
    }
}

impl From<bool> for Logic {
    fn from(value: bool) -> Self {
        if value {
            Logic::True
        } else {
            Logic::False
        }
    }
}

impl From<Option<bool>> for Logic {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Logic::Unknown, Logic::from)
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Error returned when a string is not a recognizable logic level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLogicError(pub String);

impl fmt::Display for ParseLogicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a logic level", self.0)
    }
}

impl std::error::Error for ParseLogicError {}

impl FromStr for Logic {
    type Err = ParseLogicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "on" | "high" => Ok(Logic::True),
            "false" | "0" | "off" | "low" => Ok(Logic::False),
            "unknown" | "x" | "null" => Ok(Logic::Unknown),
            _ => Err(ParseLogicError(s.to_string())),
        }
    }
}
