//! Pin-to-pin adjacency built directly from the page's wires.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::page::Page;
use crate::types::PinId;

/// Symmetric map from each pin to the pins it is directly wired to.
///
/// Each neighbor carries the net inversion of the wire that joins them. When
/// two wires join the same pair of pins, the first one wins and a disagreeing
/// inversion on a later wire is logged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConnectivityMap {
    links: BTreeMap<PinId, BTreeMap<PinId, bool>>,
}

impl ConnectivityMap {
    /// Builds the adjacency for every pin of the page.
    ///
    /// Every pin, wired or not, gets an entry so lookups never fail.
    ///
    /// # Panics
    /// If a wire references a pin that is not part of the page.
    pub fn resolve(page: &Page) -> Self {
        let mut links: BTreeMap<PinId, BTreeMap<PinId, bool>> =
            page.pins.iter().map(|p| (p.id, BTreeMap::new())).collect();

        for wire in &page.wires {
            let inverted = wire.is_inverted();
            for (from, to) in [(wire.start, wire.end), (wire.end, wire.start)] {
                let Some(neighbors) = links.get_mut(&from) else {
                    panic!("wire {} references pin {} outside the page", wire.id, from);
                };
                let kept = *neighbors.entry(to).or_insert(inverted);
                if kept != inverted && from == wire.start {
                    tracing::warn!(
                        wire = %wire.id,
                        start = %wire.start,
                        end = %wire.end,
                        kept_inverted = kept,
                        "Parallel wire disagrees on inversion; keeping the first"
                    );
                }
            }
        }

        tracing::debug!(
            pins = links.len(),
            wires = page.wires.len(),
            "Resolved pin connectivity"
        );

        Self { links }
    }

    /// Direct neighbors of `pin` with the inversion of the joining wire.
    pub fn neighbors(&self, pin: PinId) -> impl Iterator<Item = (PinId, bool)> + '_ {
        self.links
            .get(&pin)
            .into_iter()
            .flat_map(|n| n.iter().map(|(&p, &inv)| (p, inv)))
    }

    /// Returns true if `a` and `b` are joined by a wire.
    pub fn is_connected(&self, a: PinId, b: PinId) -> bool {
        self.links.get(&a).is_some_and(|n| n.contains_key(&b))
    }

    /// Inversion of the wire joining `a` and `b`, if any.
    pub fn inversion(&self, a: PinId, b: PinId) -> Option<bool> {
        self.links.get(&a).and_then(|n| n.get(&b).copied())
    }

    /// All pins known to the map, ascending.
    pub fn pins(&self) -> impl Iterator<Item = PinId> + '_ {
        self.links.keys().copied()
    }

    /// Number of pins in the map.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns true if the page had no pins.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
