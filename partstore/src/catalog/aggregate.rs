//! Aggregate product counts over a category snapshot.
//!
//! `total(c) = direct(c) + Σ total(child)`, computed with one pass that builds
//! the parent → children index and one bottom-up fold in reverse pre-order.

use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Descent stops at this depth; anything below is left out of ancestor totals.
/// Well-formed trees are three levels deep.
pub const MAX_TREE_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountNode {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub direct_count: u64,
}

/// Aggregate count for every node in the snapshot.
///
/// Nodes whose parent is missing from the snapshot are treated as roots. A
/// node that is never reached from a root (a cycle in malformed data) keeps
/// its direct count.
#[must_use]
pub fn aggregate_counts(nodes: &[CountNode]) -> HashMap<Uuid, u64> {
    let ids: HashSet<Uuid> = nodes.iter().map(|node| node.id).collect();
    let direct: HashMap<Uuid, u64> = nodes.iter().map(|node| (node.id, node.direct_count)).collect();

    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    let mut roots = Vec::new();
    for node in nodes {
        match node.parent_id {
            Some(parent) if parent != node.id && ids.contains(&parent) => {
                children.entry(parent).or_default().push(node.id);
            }
            _ => roots.push(node.id),
        }
    }

    // Pre-order walk; a parent always precedes its descendants in `order`
    let mut order = Vec::with_capacity(nodes.len());
    let mut visited = HashSet::with_capacity(nodes.len());
    let mut stack: Vec<(Uuid, usize)> = roots.into_iter().rev().map(|id| (id, 1)).collect();
    while let Some((id, depth)) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        order.push(id);
        if depth >= MAX_TREE_DEPTH {
            continue;
        }
        if let Some(kids) = children.get(&id) {
            stack.extend(kids.iter().rev().map(|&kid| (kid, depth + 1)));
        }
    }

    let mut totals: HashMap<Uuid, u64> = HashMap::with_capacity(nodes.len());
    for &id in order.iter().rev() {
        let own = direct.get(&id).copied().unwrap_or(0);
        let below: u64 = children
            .get(&id)
            .map(|kids| kids.iter().filter_map(|kid| totals.get(kid)).sum())
            .unwrap_or(0);
        totals.insert(id, own + below);
    }

    for node in nodes {
        totals.entry(node.id).or_insert(node.direct_count);
    }
    totals
}

/// Aggregate count for a single category; zero when it is not in the snapshot
#[must_use]
pub fn total_for(nodes: &[CountNode], target: Uuid) -> u64 {
    aggregate_counts(nodes).get(&target).copied().unwrap_or(0)
}
