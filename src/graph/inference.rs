//! Direction inference for pins drawn without a declared direction.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CircuitError, CircuitResult};
use crate::graph::dependency::DependencyMap;
use crate::page::{Page, PinKind};
use crate::types::PinId;

/// Resolved direction of a block-owned pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PinDirection {
    Input,
    Output,
}

impl fmt::Display for PinDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinDirection::Input => f.write_str("input"),
            PinDirection::Output => f.write_str("output"),
        }
    }
}

/// Fully resolved direction of every block-owned pin.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PinTypeMap {
    types: BTreeMap<PinId, PinDirection>,
}

impl PinTypeMap {
    /// Resolves every `Unspecified` owned pin from its dependencies.
    ///
    /// Resolution runs in rounds until nothing changes. Each round decides
    /// against the directions settled before it started, so a pin next to a
    /// declared pin always resolves from that pin and never from a sibling
    /// resolved in the same round. A pin whose net offers nothing to decide
    /// from becomes an input.
    ///
    /// # Errors
    /// [`CircuitError::WiringConflict`] when an unspecified pin sees both
    /// settled inputs and settled outputs.
    pub fn infer(page: &Page, dependencies: &DependencyMap) -> CircuitResult<Self> {
        let mut types = BTreeMap::new();
        let mut pending = Vec::new();

        for pin in page.owned_pins() {
            match pin.kind {
                PinKind::Input => {
                    types.insert(pin.id, PinDirection::Input);
                }
                PinKind::Output => {
                    types.insert(pin.id, PinDirection::Output);
                }
                PinKind::Unspecified => pending.push(pin.id),
                PinKind::Relay => {}
            }
        }

        let mut rounds = 0;
        loop {
            rounds += 1;
            let mut settled = Vec::new();

            for &pin in &pending {
                let (mut inputs, mut outputs) = (0usize, 0usize);
                for dep in dependencies.of(pin) {
                    match types.get(&dep.pin) {
                        Some(PinDirection::Input) => inputs += 1,
                        Some(PinDirection::Output) => outputs += 1,
                        None => {}
                    }
                }

                match (inputs, outputs) {
                    (0, 0) => {}
                    (0, _) => settled.push((pin, PinDirection::Input)),
                    (_, 0) => settled.push((pin, PinDirection::Output)),
                    _ => return Err(CircuitError::WiringConflict { pin }),
                }
            }

            if settled.is_empty() {
                break;
            }
            for (pin, direction) in settled {
                types.insert(pin, direction);
            }
            pending.retain(|pin| !types.contains_key(pin));
        }

        if !pending.is_empty() {
            tracing::warn!(
                pins = ?pending,
                "Pins have no settled neighbor; treating them as inputs"
            );
            for pin in pending {
                types.insert(pin, PinDirection::Input);
            }
        }

        tracing::debug!(pins = types.len(), rounds, "Inferred pin directions");
        Ok(Self { types })
    }

    /// Direction of `pin`, or `None` for relays and unknown pins.
    pub fn get(&self, pin: PinId) -> Option<PinDirection> {
        self.types.get(&pin).copied()
    }

    pub fn is_input(&self, pin: PinId) -> bool {
        self.get(pin) == Some(PinDirection::Input)
    }

    pub fn is_output(&self, pin: PinId) -> bool {
        self.get(pin) == Some(PinDirection::Output)
    }

    /// Iterates over `(pin, direction)` in ascending pin order.
    pub fn iter(&self) -> impl Iterator<Item = (PinId, PinDirection)> + '_ {
        self.types.iter().map(|(&p, &d)| (p, d))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
