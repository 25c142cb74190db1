//! Block-kind registry and simulation construction.
//!
//! The registry maps the name drawn on a block to one of the built-in
//! [`BlockKind`]s. Names can be added as aliases, but every name resolves to
//! a kind from the closed set; there is no runtime plugin discovery.
//!
//! # Example
//!
//! ```
//! use circuitry::registry::create_default_registry;
//! use circuitry::component::BlockKind;
//!
//! let mut registry = create_default_registry();
//! registry.register("Latch", BlockKind::SrSetPriority);
//!
//! assert_eq!(registry.lookup("AND"), Some(BlockKind::And));
//! assert_eq!(registry.lookup("Latch"), Some(BlockKind::SrSetPriority));
//! ```

use std::collections::HashMap;

use crate::clock::Clock;
use crate::component::{BlockKind, Component, Input};
use crate::error::{CircuitError, CircuitResult};
use crate::executor::Simulations;
use crate::graph::GraphContext;
use crate::page::Block;
use crate::properties::initial_state;
use crate::types::{BlockId, ComponentId};

/// A registry of block names.
#[derive(Clone, Debug, Default)]
pub struct ComponentRegistry {
    kinds: HashMap<String, BlockKind>,
}

impl ComponentRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` as a block of the given kind, replacing any
    /// previous registration of that name.
    pub fn register(&mut self, name: impl Into<String>, kind: BlockKind) {
        self.kinds.insert(name.into(), kind);
    }

    /// Kind registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<BlockKind> {
        self.kinds.get(name).copied()
    }

    /// Returns true if a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Returns the number of registered names.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns true if no names are registered.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Returns an iterator over registered names.
    pub fn type_names(&self) -> impl Iterator<Item = &String> {
        self.kinds.keys()
    }

    /// Unregisters a name.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.kinds.remove(name).is_some()
    }

    /// Clears all registered names.
    pub fn clear(&mut self) {
        self.kinds.clear();
    }

    /// Creates the unwired component for one block.
    ///
    /// # Errors
    /// [`CircuitError::UnsupportedBlockKind`] for unregistered names and
    /// [`CircuitError::InvalidConfiguration`] for missing or malformed
    /// properties.
    pub fn create(&self, block: &Block, clock: &Clock) -> CircuitResult<Component> {
        let kind = self
            .lookup(&block.name)
            .ok_or_else(|| CircuitError::UnsupportedBlockKind {
                block: block.id,
                kind: block.name.clone(),
            })?;

        let invalid = |source| CircuitError::InvalidConfiguration {
            block: block.id,
            kind: block.name.clone(),
            source,
        };
        let behavior = kind.build(&block.properties, clock).map_err(invalid)?;
        let initial = initial_state(&block.properties).map_err(invalid)?;

        Ok(Component::new(block.id, kind, behavior, initial))
    }

    /// Creates and wires the components of every block of a graph.
    ///
    /// Components are created in evaluation order, then each one gets one
    /// input per input pin of its block, bound to the component owning the
    /// output pin that drives it. An input pin with no driver becomes an
    /// unconnected input that reads `Unknown`.
    pub fn create_simulations(&self, graph: &GraphContext, clock: &Clock) -> CircuitResult<Simulations> {
        let page = graph.page();
        let order = graph.evaluation_order();

        let mut components = Vec::with_capacity(order.len());
        let mut index = HashMap::with_capacity(order.len());
        for (position, &block) in order.iter().enumerate() {
            components.push(self.create(page.block(block), clock)?);
            index.insert(block, ComponentId::from(position));
        }

        for (position, &block) in order.iter().enumerate() {
            let mut inputs = Vec::new();
            for pin in graph.input_pins(block) {
                let drivers = graph.drivers_of(pin);
                if drivers.len() > 1 {
                    tracing::warn!(
                        block = %block,
                        pin = %pin,
                        drivers = drivers.len(),
                        "Input has several drivers; using the first"
                    );
                }

                let input = drivers
                    .first()
                    .and_then(|dep| {
                        let owner = page.pin(dep.pin).owner?;
                        let source = *index.get(&owner)?;
                        let complement = graph
                            .output_pins(owner)
                            .iter()
                            .position(|&p| p == dep.pin)
                            .is_some_and(|i| components[source.index()].kind().is_complement_output(i));
                        Some(Input::connected(source, dep.inverted).from_complement(complement))
                    })
                    .unwrap_or_else(Input::unconnected);
                inputs.push(input);
            }

            let component = &mut components[position];
            for input in fit_arity(component.kind(), block, inputs) {
                component.connect(input);
            }
        }

        tracing::info!(components = components.len(), "Created simulations");
        Ok(Simulations::new(components, index))
    }
}

/// Trims the inputs of a fixed-arity kind to the pins it reads.
///
/// Spare unwired pins are dropped, trailing ones first so Set/Reset keep their
/// positions.
///
/// # Panics
/// If more inputs are wired than the kind reads.
fn fit_arity(kind: BlockKind, block: BlockId, mut inputs: Vec<Input>) -> Vec<Input> {
    let Some(arity) = kind.arity() else {
        return inputs;
    };
    let wired = inputs.iter().filter(|i| i.is_connected()).count();
    assert!(
        wired <= arity,
        "{kind} block {block} wired to {wired} inputs, at most {arity} allowed"
    );

    while inputs.len() > arity && inputs.last().is_some_and(|i| !i.is_connected()) {
        inputs.pop();
    }
    if inputs.len() > arity {
        inputs.retain(Input::is_connected);
    }
    inputs
}

/// Creates a registry with every built-in kind under its default name.
///
/// | Name | Kind |
/// |---|---|
/// | `Signal`, `Input`, `Output` | passthrough |
/// | `AND`, `OR`, `XOR`, `NOT` | gates |
/// | `SR`, `SR-S`, `SR-R` | set/reset memories |
/// | `TON`, `TOF`, `TP` | timers |
pub fn create_default_registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    for kind in BlockKind::ALL {
        registry.register(kind.name(), kind);
    }
    registry
}
