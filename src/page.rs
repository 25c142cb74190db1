//! Page model: the blocks, pins and wires drawn on one diagram page.
//!
//! The page is an arena. Pins, blocks and wires are stored in flat vectors and
//! reference each other by handle, so a pin knows its owning block and a
//! block lists its pins without any ownership cycle. The editor produces a
//! page; the graph builder only ever reads a snapshot of it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{BlockId, PinId, WireId};

/// Declared direction of a pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinKind {
    /// Direction is inferred from the wiring.
    Unspecified,
    Input,
    Output,
    /// A free-standing routing point, transparent to dependency resolution.
    Relay,
}

/// A connection point, either owned by a block or free-standing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub id: PinId,
    #[serde(default)]
    pub name: String,
    pub kind: PinKind,
    /// Owning block; `None` for relay pins.
    #[serde(default)]
    pub owner: Option<BlockId>,
}

/// An undirected connection between two pins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    pub id: WireId,
    pub start: PinId,
    pub end: PinId,
    /// Signal is negated at the start endpoint.
    #[serde(default)]
    pub invert_start: bool,
    /// Signal is negated at the end endpoint.
    #[serde(default)]
    pub invert_end: bool,
}

impl Wire {
    /// Net inversion contributed by this wire.
    pub fn is_inverted(&self) -> bool {
        self.invert_start || self.invert_end
    }

    /// Returns the endpoint opposite to `pin`, if `pin` is an endpoint.
    pub fn other_end(&self, pin: PinId) -> Option<PinId> {
        if self.start == pin {
            Some(self.end)
        } else if self.end == pin {
            Some(self.start)
        } else {
            None
        }
    }
}

/// Ordered key/value configuration of a block, e.g. `Delay = 1`, `Unit = s`.
pub type Properties = IndexMap<String, String>;

/// A configurable component instance with owned pins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    /// Kind name, resolved against the component registry.
    pub name: String,
    /// Optional user-facing label.
    #[serde(default)]
    pub label: Option<String>,
    /// Owned pins in declaration order.
    #[serde(default)]
    pub pins: Vec<PinId>,
    #[serde(default)]
    pub properties: Properties,
}

impl Block {
    /// Returns a property value by key.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Label if set, otherwise the kind name.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// All blocks, free-standing pins and wires of one page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub pins: Vec<Pin>,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub wires: Vec<Wire>,
}

impl Page {
    /// Creates an empty page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a block of the given kind and returns its handle.
    pub fn add_block(&mut self, name: impl Into<String>) -> BlockId {
        let id = BlockId::from(self.blocks.len());
        self.blocks.push(Block {
            id,
            name: name.into(),
            label: None,
            pins: Vec::new(),
            properties: Properties::new(),
        });
        id
    }

    /// Sets a user-facing label on a block.
    pub fn set_label(&mut self, block: BlockId, label: impl Into<String>) {
        self.blocks[block.index()].label = Some(label.into());
    }

    /// Sets (or replaces) a property on a block.
    pub fn set_property(&mut self, block: BlockId, key: impl Into<String>, value: impl Into<String>) {
        self.blocks[block.index()]
            .properties
            .insert(key.into(), value.into());
    }

    /// Adds a pin owned by `block`.
    ///
    /// # Panics
    /// If `kind` is [`PinKind::Relay`]; relay pins are never owned.
    pub fn add_pin(&mut self, block: BlockId, name: impl Into<String>, kind: PinKind) -> PinId {
        assert!(kind != PinKind::Relay, "relay pins cannot belong to a block");
        let id = PinId::from(self.pins.len());
        self.pins.push(Pin {
            id,
            name: name.into(),
            kind,
            owner: Some(block),
        });
        self.blocks[block.index()].pins.push(id);
        id
    }

    /// Adds an input pin to `block`.
    pub fn add_input(&mut self, block: BlockId, name: impl Into<String>) -> PinId {
        self.add_pin(block, name, PinKind::Input)
    }

    /// Adds an output pin to `block`.
    pub fn add_output(&mut self, block: BlockId, name: impl Into<String>) -> PinId {
        self.add_pin(block, name, PinKind::Output)
    }

    /// Adds a free-standing relay pin.
    pub fn add_relay(&mut self) -> PinId {
        let id = PinId::from(self.pins.len());
        self.pins.push(Pin {
            id,
            name: String::new(),
            kind: PinKind::Relay,
            owner: None,
        });
        id
    }

    /// Wires two pins together without inversion.
    pub fn connect(&mut self, start: PinId, end: PinId) -> WireId {
        self.add_wire(start, end, false, false)
    }

    /// Wires two pins together, negating the signal at the `end` pin.
    pub fn connect_inverted(&mut self, start: PinId, end: PinId) -> WireId {
        self.add_wire(start, end, false, true)
    }

    /// Adds a wire with explicit inversion markers.
    pub fn add_wire(&mut self, start: PinId, end: PinId, invert_start: bool, invert_end: bool) -> WireId {
        let id = WireId::from(self.wires.len());
        self.wires.push(Wire {
            id,
            start,
            end,
            invert_start,
            invert_end,
        });
        id
    }

    /// Returns a pin by handle.
    pub fn pin(&self, id: PinId) -> &Pin {
        &self.pins[id.index()]
    }

    /// Returns a block by handle.
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    /// Returns a wire by handle.
    pub fn wire(&self, id: WireId) -> &Wire {
        &self.wires[id.index()]
    }

    /// Pins owned by some block, in arena order.
    pub fn owned_pins(&self) -> impl Iterator<Item = &Pin> {
        self.pins.iter().filter(|p| p.owner.is_some())
    }

    /// Pins not owned by any block, in arena order.
    pub fn free_pins(&self) -> impl Iterator<Item = &Pin> {
        self.pins.iter().filter(|p| p.owner.is_none())
    }

    /// Checks the arena invariants a deserialized page might break.
    ///
    /// Pages built through the methods above always pass.
    pub fn validate(&self) -> Result<(), String> {
        for (index, pin) in self.pins.iter().enumerate() {
            if pin.id.index() != index {
                return Err(format!("Pin at index {} has id {}", index, pin.id));
            }
            match (pin.kind, pin.owner) {
                (PinKind::Relay, Some(owner)) => {
                    return Err(format!("Relay pin {} is owned by block {}", pin.id, owner));
                }
                (kind, None) if kind != PinKind::Relay => {
                    return Err(format!("Free-standing pin {} must be a relay", pin.id));
                }
                (_, Some(owner)) => {
                    let listed = self
                        .blocks
                        .get(owner.index())
                        .is_some_and(|b| b.pins.contains(&pin.id));
                    if !listed {
                        return Err(format!(
                            "Pin {} names block {} as owner but is not listed by it",
                            pin.id, owner
                        ));
                    }
                }
                _ => {}
            }
        }

        for (index, block) in self.blocks.iter().enumerate() {
            if block.id.index() != index {
                return Err(format!("Block at index {} has id {}", index, block.id));
            }
            for &pin in &block.pins {
                let owned = self
                    .pins
                    .get(pin.index())
                    .is_some_and(|p| p.owner == Some(block.id));
                if !owned {
                    return Err(format!("Block {} lists pin {} it does not own", block.id, pin));
                }
            }
        }

        for (index, wire) in self.wires.iter().enumerate() {
            if wire.id.index() != index {
                return Err(format!("Wire at index {} has id {}", index, wire.id));
            }
            for end in [wire.start, wire.end] {
                if end.index() >= self.pins.len() {
                    return Err(format!("Wire {} references unknown pin {}", wire.id, end));
                }
            }
        }

        Ok(())
    }
}
