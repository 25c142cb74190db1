//! Typed configuration read from a block's property bag.
//!
//! Property bags are plain strings as drawn in the editor. Each component kind
//! parses the keys it needs once, at construction, into one of the structs
//! below; nothing is parsed again while the simulation runs.

use std::str::FromStr;
use std::time::Duration;

use crate::error::PropertyError;
use crate::logic::Logic;
use crate::page::Properties;

pub const DELAY: &str = "Delay";
pub const UNIT: &str = "Unit";
pub const PRIORITY: &str = "Priority";
pub const COUNTER: &str = "Counter";
pub const STATE: &str = "State";

/// Time unit of a `Delay` property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Length of one unit in milliseconds.
    pub fn millis(self) -> f64 {
        match self {
            TimeUnit::Milliseconds => 1.0,
            TimeUnit::Seconds => 1_000.0,
            TimeUnit::Minutes => 60_000.0,
            TimeUnit::Hours => 3_600_000.0,
            TimeUnit::Days => 86_400_000.0,
        }
    }

    /// Converts an amount of this unit to seconds.
    pub fn to_seconds(self, amount: f64) -> f64 {
        amount * self.millis() / 1_000.0
    }
}

impl FromStr for TimeUnit {
    type Err = PropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ms" | "msec" | "millisecond" | "milliseconds" => Ok(TimeUnit::Milliseconds),
            "s" | "sec" | "second" | "seconds" => Ok(TimeUnit::Seconds),
            "m" | "min" | "minute" | "minutes" => Ok(TimeUnit::Minutes),
            "h" | "hour" | "hours" => Ok(TimeUnit::Hours),
            "d" | "day" | "days" => Ok(TimeUnit::Days),
            _ => Err(PropertyError::UnknownUnit { unit: s.to_string() }),
        }
    }
}

/// Delay of a timer block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DelayConfig {
    pub delay: Duration,
}

impl DelayConfig {
    /// Reads `Delay` (required, non-negative number) and `Unit` (default `s`).
    pub fn from_properties(props: &Properties) -> Result<Self, PropertyError> {
        let raw = require(props, DELAY)?;
        let amount: f64 = raw.trim().parse().map_err(|_| PropertyError::Malformed {
            key: DELAY.to_string(),
            value: raw.to_string(),
            expected: "a number",
        })?;
        let unit = match props.get(UNIT) {
            Some(unit) => unit.parse::<TimeUnit>()?,
            None => TimeUnit::Seconds,
        };

        let seconds = unit.to_seconds(amount);
        let delay = Duration::try_from_secs_f64(seconds).map_err(|_| PropertyError::OutOfRange {
            key: DELAY.to_string(),
            value: raw.to_string(),
        })?;
        Ok(Self { delay })
    }
}

/// Which input wins when a set/reset memory sees both asserted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Priority {
    Set,
    Reset,
}

impl Priority {
    /// Reads the required `Priority` property.
    pub fn from_properties(props: &Properties) -> Result<Self, PropertyError> {
        let raw = require(props, PRIORITY)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "set" | "s" => Ok(Priority::Set),
            "reset" | "r" => Ok(Priority::Reset),
            _ => Err(PropertyError::Malformed {
                key: PRIORITY.to_string(),
                value: raw.to_string(),
                expected: "'Set' or 'Reset'",
            }),
        }
    }
}

/// Threshold of an OR gate: how many inputs must be true.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GateConfig {
    pub counter: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self { counter: 1 }
    }
}

impl GateConfig {
    /// Reads the optional `Counter` property (positive integer, default 1).
    pub fn from_properties(props: &Properties) -> Result<Self, PropertyError> {
        let Some(raw) = props.get(COUNTER) else {
            return Ok(Self::default());
        };
        let counter: usize = raw.trim().parse().map_err(|_| PropertyError::Malformed {
            key: COUNTER.to_string(),
            value: raw.to_string(),
            expected: "a positive integer",
        })?;
        if counter == 0 {
            return Err(PropertyError::OutOfRange {
                key: COUNTER.to_string(),
                value: raw.to_string(),
            });
        }
        Ok(Self { counter })
    }
}

/// Reads the optional `State` property giving a block's power-on state.
pub fn initial_state(props: &Properties) -> Result<Logic, PropertyError> {
    match props.get(STATE) {
        None => Ok(Logic::Unknown),
        Some(raw) => raw.parse().map_err(|_| PropertyError::Malformed {
            key: STATE.to_string(),
            value: raw.to_string(),
            expected: "a logic level",
        }),
    }
}

fn require<'a>(props: &'a Properties, key: &str) -> Result<&'a str, PropertyError> {
    props
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| PropertyError::Missing { key: key.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_delay_units_normalize() {
        let cases = [
            ("1", "s", 1.0),
            ("500", "ms", 0.5),
            ("2", "min", 120.0),
            ("1", "h", 3_600.0),
            ("1", "D", 86_400.0),
        ];
        for (amount, unit, seconds) in cases {
            let cfg = DelayConfig::from_properties(&props(&[(DELAY, amount), (UNIT, unit)])).unwrap();
            assert_eq!(cfg.delay.as_secs_f64(), seconds, "{amount} {unit}");
        }
    }

    #[test]
    fn test_delay_defaults_to_seconds() {
        let cfg = DelayConfig::from_properties(&props(&[(DELAY, "0.5")])).unwrap();
        assert_eq!(cfg.delay, Duration::from_millis(500));
    }

    #[test]
    fn test_delay_errors() {
        assert_eq!(
            DelayConfig::from_properties(&props(&[])).unwrap_err(),
            PropertyError::Missing { key: DELAY.to_string() }
        );
        assert!(matches!(
            DelayConfig::from_properties(&props(&[(DELAY, "soon")])),
            Err(PropertyError::Malformed { .. })
        ));
        assert!(matches!(
            DelayConfig::from_properties(&props(&[(DELAY, "1"), (UNIT, "fortnight")])),
            Err(PropertyError::UnknownUnit { .. })
        ));
        assert!(matches!(
            DelayConfig::from_properties(&props(&[(DELAY, "-1")])),
            Err(PropertyError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_priority() {
        assert_eq!(Priority::from_properties(&props(&[(PRIORITY, "Reset")])).unwrap(), Priority::Reset);
        assert_eq!(Priority::from_properties(&props(&[(PRIORITY, "set")])).unwrap(), Priority::Set);
        assert!(Priority::from_properties(&props(&[(PRIORITY, "both")])).is_err());
        assert!(Priority::from_properties(&props(&[])).is_err());
    }

    #[test]
    fn test_gate_counter() {
        assert_eq!(GateConfig::from_properties(&props(&[])).unwrap().counter, 1);
        assert_eq!(GateConfig::from_properties(&props(&[(COUNTER, "2")])).unwrap().counter, 2);
        assert!(GateConfig::from_properties(&props(&[(COUNTER, "0")])).is_err());
        assert!(GateConfig::from_properties(&props(&[(COUNTER, "two")])).is_err());
    }

    #[test]
    fn test_initial_state() {
        assert_eq!(initial_state(&props(&[])).unwrap(), Logic::Unknown);
        assert_eq!(initial_state(&props(&[(STATE, "1")])).unwrap(), Logic::True);
        assert!(initial_state(&props(&[(STATE, "maybe")])).is_err());
    }
}
