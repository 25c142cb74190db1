//! # Circuitry
//!
//! Dependency resolution and discrete-time simulation for logic diagrams.
//!
//! A diagram page is a set of blocks with pins, free-standing relay pins
//! and wires. Running it has two phases:
//!
//! - **Graph construction** ([`build_graph`]): wires become a symmetric
//!   connectivity map, relay chains are collapsed into per-pin dependencies
//!   with accumulated inversion, undeclared pin directions are inferred, and
//!   blocks are sorted into an evaluation order. Feedback into latches and
//!   timers is allowed; any other cycle is rejected.
//! - **Simulation** ([`ComponentRegistry::create_simulations`],
//!   [`run_one_tick`]): each block becomes a tri-state component. One tick
//!   runs every component once, in evaluation order, then advances the
//!   clock by one cycle.
//!
//! ## Features
//!
//! - `parallel` - Run batches of independent simulations using rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use circuitry::{build_graph, create_default_registry, run_one_tick, Clock, Logic, Page};
//!
//! // A switch driving an AND gate twice, once through an inverting wire.
//! let mut page = Page::new();
//! let switch = page.add_block("Signal");
//! let q = page.add_output(switch, "q");
//! let and = page.add_block("AND");
//! let a = page.add_input(and, "a");
//! let b = page.add_input(and, "b");
//! page.add_output(and, "q");
//! page.connect(q, a);
//! page.connect_inverted(q, b);
//!
//! let graph = build_graph(&page).unwrap();
//! let mut clock = Clock::new(100);
//! let mut sims = create_default_registry().create_simulations(&graph, &clock).unwrap();
//!
//! sims.force(switch, Logic::True);
//! run_one_tick(&mut sims, &mut clock);
//!
//! assert_eq!(sims.state(and), Some(Logic::False));
//! assert_eq!(clock.cycle(), 1);
//! ```
//!
//! ## Sessions
//!
//! [`TickExecutor`] bundles a clock with the components and adds scheduled
//! writes, state tracing and statistics:
//!
//! ```rust,ignore
//! let mut exec = TickExecutor::from_graph(&graph, &registry, 100)?
//!     .with_stimulus(Stimulus::new().at(0, switch, true).at(5, switch, false))
//!     .with_trace(vec![timer]);
//! exec.run_for(20);
//! exec.trace().unwrap().write_csv_file("timer.csv")?;
//! ```
//!
//! ## Configuration-Driven Setup
//!
//! ```rust,ignore
//! use circuitry::config::SimConfig;
//!
//! let config = SimConfig::from_file("circuit.yaml")?;
//! circuitry::init_logging(&config.simulation.log_level);
//! let exec = config.run()?;
//! println!("{}", exec.export_stats());
//! ```

pub mod types;
pub mod logic;
pub mod error;
pub mod page;
pub mod graph;
pub mod clock;
pub mod properties;
pub mod components;
pub mod component;
pub mod registry;
pub mod executor;
pub mod stimulus;
pub mod trace;
pub mod config;
pub mod parallel;

// Re-export commonly used types
pub use types::{BlockId, ComponentId, Cycle, PinId, WireId};
pub use logic::Logic;
pub use error::{CircuitError, CircuitResult, PropertyError};
pub use page::{Block, Page, Pin, PinKind, Properties, Wire};
pub use graph::{build_graph, build_graph_with, GraphContext, PinDirection};
pub use clock::Clock;
pub use component::{BlockKind, Component, Input};
pub use registry::{create_default_registry, ComponentRegistry};
pub use executor::{run_one_tick, Simulations, TickExecutor};
pub use stimulus::Stimulus;
pub use trace::StateTrace;
pub use config::{ConfigError, SimConfig, SimConfigBuilder};
pub use parallel::{BatchRunner, BatchStats};

/// Initialize the tracing subscriber for logging.
///
/// Call this at the start of your program to enable logging. `RUST_LOG`
/// overrides `level` when set.
///
/// # Example
///
/// ```rust,ignore
/// circuitry::init_logging("info");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
