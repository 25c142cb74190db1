//! Transitive pin associations through relay pins.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::graph::connectivity::ConnectivityMap;
use crate::page::{Page, PinKind};
use crate::types::PinId;

/// A pin electrically associated with another, with the accumulated
/// inversion along the wires between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Dependency {
    pub pin: PinId,
    pub inverted: bool,
}

impl Dependency {
    pub fn new(pin: PinId, inverted: bool) -> Self {
        Self { pin, inverted }
    }
}

/// For every block-owned pin, the set of pins reachable through relays.
///
/// The walk passes through relay pins and stops at any other pin: owned pins
/// are dependencies, never pass-through nodes. Relays met on the way are
/// recorded as well, which lets callers see the whole net.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencyMap {
    deps: BTreeMap<PinId, BTreeSet<Dependency>>,
}

impl DependencyMap {
    /// Resolves dependencies for every owned pin of the page.
    pub fn resolve(page: &Page, connectivity: &ConnectivityMap) -> Self {
        let deps: BTreeMap<_, _> = page
            .owned_pins()
            .map(|pin| (pin.id, walk(page, connectivity, pin.id)))
            .collect();

        tracing::debug!(
            pins = deps.len(),
            links = deps.values().map(BTreeSet::len).sum::<usize>(),
            "Resolved pin dependencies"
        );

        Self { deps }
    }

    /// Dependencies of `pin`, ordered by pin then inversion.
    ///
    /// Empty for pins without an entry (relays, unknown pins).
    pub fn of(&self, pin: PinId) -> impl Iterator<Item = &Dependency> + '_ {
        self.deps.get(&pin).into_iter().flatten()
    }

    /// Returns true if `dep` is a dependency of `pin` with exactly that inversion.
    pub fn contains(&self, pin: PinId, dep: Dependency) -> bool {
        self.deps.get(&pin).is_some_and(|set| set.contains(&dep))
    }

    /// Iterates over `(pin, dependencies)` in ascending pin order.
    pub fn iter(&self) -> impl Iterator<Item = (PinId, &BTreeSet<Dependency>)> + '_ {
        self.deps.iter().map(|(&p, set)| (p, set))
    }

    /// Number of pins with an entry.
    pub fn len(&self) -> usize {
        self.deps.len()
    }

    /// Returns true if no pin has an entry.
    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }
}

/// Depth-first walk from `origin`, recursing through relay pins only.
///
/// Inversion accumulates by XOR along each hop. A relay is expanded at most
/// once per inversion parity, which keeps relay loops finite.
fn walk(page: &Page, connectivity: &ConnectivityMap, origin: PinId) -> BTreeSet<Dependency> {
    let mut found = BTreeSet::new();
    let mut expanded: HashSet<(PinId, bool)> = HashSet::new();
    let mut stack = vec![(origin, false)];

    while let Some((current, inverted)) = stack.pop() {
        for (next, wire_inverted) in connectivity.neighbors(current) {
            if next == origin {
                continue;
            }
            let inverted = inverted ^ wire_inverted;
            found.insert(Dependency::new(next, inverted));

            if page.pin(next).kind == PinKind::Relay && expanded.insert((next, inverted)) {
                stack.push((next, inverted));
            }
        }
    }

    found
}
