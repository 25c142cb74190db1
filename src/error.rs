//! Error types raised while building a circuit graph or its simulation.
//!
//! All of these surface once, at build time. A simulation that was built
//! successfully has no recoverable failure modes while it runs.

use thiserror::Error;

use crate::types::{BlockId, PinId};

/// Errors raised by graph construction and simulation construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CircuitError {
    #[error("Wiring conflict at pin {pin}: input and output pins connected to the same net")]
    WiringConflict { pin: PinId },

    #[error("Combinational loop through blocks {}", display_blocks(.blocks))]
    CombinationalLoop { blocks: Vec<BlockId> },

    #[error("Unsupported block kind '{kind}' on block {block}")]
    UnsupportedBlockKind { block: BlockId, kind: String },

    #[error("Invalid configuration on block {block} ({kind}): {source}")]
    InvalidConfiguration {
        block: BlockId,
        kind: String,
        #[source]
        source: PropertyError,
    },
}

/// Problems with a single block's property bag.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropertyError {
    #[error("missing required property '{key}'")]
    Missing { key: String },

    #[error("property '{key}' = '{value}' is not {expected}")]
    Malformed {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("unrecognized time unit '{unit}'")]
    UnknownUnit { unit: String },

    #[error("property '{key}' = '{value}' is out of range")]
    OutOfRange { key: String, value: String },
}

/// Result type for graph and simulation construction.
pub type CircuitResult<T> = Result<T, CircuitError>;

fn display_blocks(blocks: &[BlockId]) -> String {
    blocks
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
