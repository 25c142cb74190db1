//! Graph construction: from a page snapshot to an evaluation order.
//!
//! The stages run leaves first:
//!
//! 1. [`connectivity`] turns wires into a symmetric pin adjacency.
//! 2. [`dependency`] follows that adjacency through relay pins.
//! 3. [`inference`] settles the direction of undeclared pins.
//! 4. [`scheduler`] orders blocks so drivers run before their readers.
//!
//! The result is an immutable [`GraphContext`] that owns the page snapshot it
//! was built from. A new run on an edited page needs a new context.

pub mod connectivity;
pub mod dependency;
pub mod inference;
pub mod scheduler;

use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::error::CircuitResult;
use crate::page::Page;
use crate::registry::{create_default_registry, ComponentRegistry};
use crate::types::{BlockId, PinId};

pub use connectivity::ConnectivityMap;
pub use dependency::{Dependency, DependencyMap};
pub use inference::{PinDirection, PinTypeMap};
pub use scheduler::BlockDependency;

/// Everything resolved from one page snapshot.
#[derive(Clone, Debug, Serialize)]
pub struct GraphContext {
    #[serde(skip)]
    page: Page,
    connectivity: ConnectivityMap,
    dependencies: DependencyMap,
    pin_types: PinTypeMap,
    evaluation_order: Vec<BlockId>,
}

/// Builds the graph of a page using the built-in block kinds.
///
/// # Errors
/// Wiring conflicts and combinational loops.
pub fn build_graph(page: &Page) -> CircuitResult<GraphContext> {
    build_graph_with(page, &create_default_registry())
}

/// Builds the graph of a page, asking `registry` which blocks hold state.
///
/// Blocks whose kind is not registered are scheduled as combinational; they
/// are rejected later, when simulations are created.
pub fn build_graph_with(page: &Page, registry: &ComponentRegistry) -> CircuitResult<GraphContext> {
    let connectivity = ConnectivityMap::resolve(page);
    let dependencies = DependencyMap::resolve(page, &connectivity);
    let pin_types = PinTypeMap::infer(page, &dependencies)?;
    let evaluation_order = scheduler::schedule(page, &dependencies, &pin_types, |block| {
        registry
            .lookup(&block.name)
            .is_some_and(|kind| kind.is_stateful())
    })?;

    tracing::info!(
        blocks = page.blocks.len(),
        pins = page.pins.len(),
        wires = page.wires.len(),
        "Built circuit graph"
    );

    Ok(GraphContext {
        page: page.clone(),
        connectivity,
        dependencies,
        pin_types,
        evaluation_order,
    })
}

impl GraphContext {
    /// The page snapshot this context was built from.
    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn connectivity(&self) -> &ConnectivityMap {
        &self.connectivity
    }

    pub fn dependencies(&self) -> &DependencyMap {
        &self.dependencies
    }

    pub fn pin_types(&self) -> &PinTypeMap {
        &self.pin_types
    }

    /// Blocks in the order their components must run each tick.
    pub fn evaluation_order(&self) -> &[BlockId] {
        &self.evaluation_order
    }

    /// Input pins of `block`, in the block's pin order.
    pub fn input_pins(&self, block: BlockId) -> Vec<PinId> {
        self.page
            .block(block)
            .pins
            .iter()
            .copied()
            .filter(|&p| self.pin_types.is_input(p))
            .collect()
    }

    /// Output pins of `block`, in the block's pin order.
    pub fn output_pins(&self, block: BlockId) -> Vec<PinId> {
        self.page
            .block(block)
            .pins
            .iter()
            .copied()
            .filter(|&p| self.pin_types.is_output(p))
            .collect()
    }

    /// Output pins driving `pin`, in dependency order.
    pub fn drivers_of(&self, pin: PinId) -> Vec<Dependency> {
        self.dependencies
            .of(pin)
            .copied()
            .filter(|dep| self.pin_types.is_output(dep.pin))
            .collect()
    }

    /// Writes a human-readable dump of every resolved map.
    ///
    /// The output is deterministic: maps are listed by ascending pin, the
    /// order section in evaluation order.
    pub fn write_dump<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "=== Connectivity ===")?;
        for pin in self.connectivity.pins() {
            let neighbors: Vec<String> = self
                .connectivity
                .neighbors(pin)
                .map(|(p, inverted)| format_link(p, inverted))
                .collect();
            writeln!(w, "{} -> [{}]", pin, neighbors.join(", "))?;
        }
        writeln!(w)?;

        writeln!(w, "=== Dependencies ===")?;
        for (pin, deps) in self.dependencies.iter() {
            let deps: Vec<String> = deps.iter().map(|d| format_link(d.pin, d.inverted)).collect();
            writeln!(w, "{} -> [{}]", pin, deps.join(", "))?;
        }
        writeln!(w)?;

        writeln!(w, "=== Pin types ===")?;
        for (pin, direction) in self.pin_types.iter() {
            let p = self.page.pin(pin);
            match p.owner {
                Some(owner) => writeln!(
                    w,
                    "{} {} ({} {}.{})",
                    pin,
                    direction,
                    owner,
                    self.page.block(owner).display_name(),
                    p.name
                )?,
                None => writeln!(w, "{} {}", pin, direction)?,
            }
        }
        writeln!(w)?;

        writeln!(w, "=== Evaluation order ===")?;
        for (index, &block) in self.evaluation_order.iter().enumerate() {
            let b = self.page.block(block);
            writeln!(w, "{}: {} {}", index, block, b.display_name())?;
        }
        Ok(())
    }

    /// Returns the dump as a string.
    pub fn dump(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_dump(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Writes the dump to a file.
    pub fn dump_to_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_dump(std::io::BufWriter::new(file))
    }

    /// Serializes the resolved maps and order as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn format_link(pin: PinId, inverted: bool) -> String {
    if inverted {
        format!("!{}", pin)
    } else {
        pin.to_string()
    }
}
