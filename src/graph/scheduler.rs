//! Block evaluation order.
//!
//! Blocks are sorted so that every block runs after the blocks driving its
//! inputs. Stateful blocks (memories and timers) may sit on a feedback loop:
//! an edge that leaves a stateful block and comes back to it is dropped from
//! the ordering, so its consumers read the value it held on the previous
//! tick. Any loop left after that is made of combinational blocks only and
//! cannot be scheduled.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{CircuitError, CircuitResult};
use crate::graph::dependency::DependencyMap;
use crate::graph::inference::PinTypeMap;
use crate::page::{Block, Page};
use crate::types::BlockId;

/// A dependency edge between two blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct BlockDependency {
    /// The block that reads the signal.
    pub block: BlockId,
    /// The block driving it; it must run first.
    pub depends_on: BlockId,
}

impl BlockDependency {
    /// Creates a new dependency: `block` depends on `depends_on`.
    pub fn new(block: BlockId, depends_on: BlockId) -> Self {
        Self { block, depends_on }
    }
}

/// Upstream blocks of every block, derived from input pin dependencies.
pub fn block_dependencies(
    page: &Page,
    dependencies: &DependencyMap,
    pin_types: &PinTypeMap,
) -> BTreeMap<BlockId, BTreeSet<BlockId>> {
    let mut upstream: BTreeMap<BlockId, BTreeSet<BlockId>> = BTreeMap::new();

    for block in &page.blocks {
        let entry = upstream.entry(block.id).or_default();
        for &pin in block.pins.iter().filter(|&&p| pin_types.is_input(p)) {
            for dep in dependencies.of(pin) {
                if !pin_types.is_output(dep.pin) {
                    continue;
                }
                if let Some(owner) = page.pin(dep.pin).owner {
                    entry.insert(owner);
                }
            }
        }
    }

    upstream
}

/// Computes the evaluation order of all blocks of the page.
///
/// `is_stateful` tells which blocks hold state across ticks and may
/// therefore close a feedback loop.
///
/// # Errors
/// [`CircuitError::CombinationalLoop`] when a loop contains no stateful block.
pub fn schedule<F>(
    page: &Page,
    dependencies: &DependencyMap,
    pin_types: &PinTypeMap,
    is_stateful: F,
) -> CircuitResult<Vec<BlockId>>
where
    F: Fn(&Block) -> bool,
{
    let mut upstream = block_dependencies(page, dependencies, pin_types);

    let exempt: Vec<BlockDependency> = upstream
        .iter()
        .flat_map(|(&block, ups)| ups.iter().map(move |&up| BlockDependency::new(block, up)))
        .filter(|edge| is_stateful(page.block(edge.depends_on)))
        .filter(|edge| edge.block == edge.depends_on || reaches(&upstream, edge.depends_on, edge.block))
        .collect();

    for edge in &exempt {
        tracing::debug!(
            block = %edge.block,
            feedback_from = %edge.depends_on,
            "Feedback edge exempted from ordering"
        );
        if let Some(ups) = upstream.get_mut(&edge.block) {
            ups.remove(&edge.depends_on);
        }
    }

    let order = topological_order(&upstream)?;
    tracing::debug!(
        blocks = order.len(),
        feedback_edges = exempt.len(),
        "Scheduled blocks"
    );
    Ok(order)
}

/// Returns true if `from` depends on `target`, directly or transitively.
fn reaches(upstream: &BTreeMap<BlockId, BTreeSet<BlockId>>, from: BlockId, target: BlockId) -> bool {
    let mut seen = BTreeSet::new();
    let mut stack = vec![from];
    while let Some(current) = stack.pop() {
        if current == target {
            return true;
        }
        if !seen.insert(current) {
            continue;
        }
        if let Some(ups) = upstream.get(&current) {
            stack.extend(ups.iter().copied());
        }
    }
    false
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnStack,
    Done,
}

/// Depth-first topological sort emitting dependencies first.
fn topological_order(upstream: &BTreeMap<BlockId, BTreeSet<BlockId>>) -> CircuitResult<Vec<BlockId>> {
    let mut marks: BTreeMap<BlockId, Mark> = BTreeMap::new();
    let mut path = Vec::new();
    let mut order = Vec::with_capacity(upstream.len());

    for &block in upstream.keys() {
        visit(block, upstream, &mut marks, &mut path, &mut order)?;
    }
    Ok(order)
}

fn visit(
    block: BlockId,
    upstream: &BTreeMap<BlockId, BTreeSet<BlockId>>,
    marks: &mut BTreeMap<BlockId, Mark>,
    path: &mut Vec<BlockId>,
    order: &mut Vec<BlockId>,
) -> CircuitResult<()> {
    match marks.get(&block) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::OnStack) => {
            let start = path.iter().position(|&b| b == block).unwrap_or(0);
            let mut blocks = path[start..].to_vec();
            blocks.push(block);
            return Err(CircuitError::CombinationalLoop { blocks });
        }
        None => {}
    }

    marks.insert(block, Mark::OnStack);
    path.push(block);
    if let Some(ups) = upstream.get(&block) {
        for &up in ups {
            visit(up, upstream, marks, path, order)?;
        }
    }
    path.pop();
    marks.insert(block, Mark::Done);
    order.push(block);
    Ok(())
}
