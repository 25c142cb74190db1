//! Built-in simulation components.
//!
//! # Available Components
//!
//! ## Combinational
//! - [`Passthrough`] - Signal, Input and Output blocks
//! - [`AndGate`], [`OrGate`], [`XorGate`] - n-ary reductions
//! - [`Inverter`] - NOT
//!
//! ## Stateful
//! - [`SrMemory`] - set/reset latch with configurable priority
//! - [`Timer`] - on-delay, off-delay and pulse timers

pub mod gates;
pub mod memory;
pub mod timer;

pub use gates::{AndGate, Inverter, OrGate, Passthrough, XorGate};
pub use memory::SrMemory;
pub use timer::{Timer, TimerMode};
