//! Core type definitions for the circuit engine.
//!
//! Pins, blocks and wires live in flat arenas inside a [`Page`](crate::page::Page)
//! and refer to each other through the small copyable handles defined here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulation cycle counter.
///
/// One cycle is one call to `tick()`; its wall-clock length is the clock's
/// resolution in milliseconds.
pub type Cycle = u64;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Returns the arena index this handle points at.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Handle of a pin in the page's pin arena.
    PinId,
    "p"
);

arena_id!(
    /// Handle of a block in the page's block arena.
    BlockId,
    "b"
);

arena_id!(
    /// Handle of a wire in the page's wire arena.
    WireId,
    "w"
);

arena_id!(
    /// Position of a simulation component inside a run, which is also its
    /// position in the evaluation order.
    ComponentId,
    "c"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(PinId(3).to_string(), "p3");
        assert_eq!(BlockId(0).to_string(), "b0");
        assert_eq!(WireId(12).to_string(), "w12");
        assert_eq!(ComponentId(7).to_string(), "c7");
    }

    #[test]
    fn test_id_index_roundtrip() {
        let pin = PinId::from(42usize);
        assert_eq!(pin.index(), 42);
        assert!(PinId(1) < PinId(2));
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&BlockId(5)).unwrap();
        assert_eq!(json, "5");
        let back: BlockId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BlockId(5));
    }
}
