//! Call tree reconstruction.
//!
//! Three passes over the node arena, run in order by [`Profile`](super::Profile):
//! 1. [`build_tree`] turns raw nodes into linked [`Node`]s
//! 2. [`relocate_natives`] optionally folds native frames into their parents
//! 3. [`compute_totals`] rolls self counts up into total counts

use super::category::Category;
use super::node::{CallSiteUid, Location, Node, NodeIndex};
use crate::parser::schema::RawProfile;
use crate::utils::error::ProfileError;
use log::{debug, warn};
use std::collections::HashMap;

/// Node arena plus the id lookup
#[derive(Debug, Default)]
pub(crate) struct Tree {
    pub nodes: Vec<Node>,
    pub index: HashMap<u64, NodeIndex>,
    pub roots: Vec<NodeIndex>,
}

impl Tree {
    pub fn get(&self, id: u64) -> Option<&Node> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }
}

/// Removed node id -> id of the parent it was folded into
#[derive(Debug, Default, Clone)]
pub(crate) struct Relocations(HashMap<u64, u64>);

impl Relocations {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Follow relocation hops until reaching a surviving node id
    pub fn resolve(&self, mut id: u64) -> u64 {
        let mut hops = 0;
        while let Some(&target) = self.0.get(&id) {
            id = target;
            hops += 1;
            debug_assert!(hops <= self.0.len(), "relocation cycle through node {id}");
        }
        id
    }
}

/// Build the linked tree from raw nodes
///
/// Self counts come from raw hit counts when the profile has them,
/// otherwise from counting the sample stream.
///
/// # Errors
/// * `ProfileError::MissingSampleData` - No hit counts and no samples
/// * `ProfileError::DuplicateNode` - Two raw nodes share an id
/// * `ProfileError::DanglingChild` - A child id names no node
/// * `ProfileError::UnknownSampleNode` - A sample names no node
pub(crate) fn build_tree(raw: &RawProfile) -> Result<Tree, ProfileError> {
    debug!("Building tree from {} raw nodes", raw.nodes.len());

    let mut tree = Tree::default();
    tree.nodes.reserve(raw.nodes.len());

    for raw_node in &raw.nodes {
        let index = tree.nodes.len();
        if tree.index.insert(raw_node.id, index).is_some() {
            return Err(ProfileError::DuplicateNode(raw_node.id));
        }

        let frame = &raw_node.call_frame;
        tree.nodes.push(Node {
            id: raw_node.id,
            index,
            call_uid: CallSiteUid::from_call_frame(frame),
            location: Location::from_call_frame(frame),
            bailout_reason: raw_node
                .deopt_reason
                .clone()
                .filter(|reason| !reason.is_empty()),
            category: Category::classify(&frame.url, &frame.function_name),
            self_count: raw_node.hit_count.unwrap_or(0),
            total_count: 0,
            timestamps: Vec::new(),
            parent: None,
            children: Vec::new(),
            line_ticks: raw_node.position_ticks.clone().unwrap_or_default(),
            enter: 0,
            exit: 0,
        });
    }

    let has_hit_counts = raw.nodes.iter().any(|n| n.hit_count.is_some());
    match (&raw.samples, has_hit_counts) {
        (_, true) => {}
        (Some(samples), false) => {
            debug!("No hit counts, deriving from {} samples", samples.len());
            for &id in samples {
                let &index = tree
                    .index
                    .get(&id)
                    .ok_or(ProfileError::UnknownSampleNode(id))?;
                tree.nodes[index].self_count += 1;
            }
        }
        (None, false) => return Err(ProfileError::MissingSampleData),
    }

    for (parent, raw_node) in raw.nodes.iter().enumerate() {
        for &child_id in raw_node.children.iter().flatten() {
            let &child = tree
                .index
                .get(&child_id)
                .ok_or(ProfileError::DanglingChild {
                    parent: raw_node.id,
                    child: child_id,
                })?;
            if tree.nodes[child].parent.is_some() {
                warn!("Node {} listed under more than one parent", child_id);
                continue;
            }
            tree.nodes[child].parent = Some(parent);
            tree.nodes[parent].children.push(child);
        }
    }

    tree.roots = root_indices(&tree.nodes);
    Ok(tree)
}

/// Fold every native node into its nearest surviving ancestor
///
/// Children are spliced into the parent's child list at the removed node's
/// position and its self count moves to the parent. Runs in two linear
/// passes: dead nodes are resolved in pre-order, then every surviving child
/// list is rebuilt once. Returns the relocation map needed to rewrite
/// sample ids.
pub(crate) fn relocate_natives(tree: &mut Tree) -> Relocations {
    let alive: Vec<bool> = tree
        .nodes
        .iter()
        .map(|node| node.category != Category::Native || node.parent.is_none())
        .collect();
    if alive.iter().all(|&keep| keep) {
        return Relocations::default();
    }

    // Pre-order, so a node's parent is resolved before the node itself
    let mut survivor: Vec<NodeIndex> = (0..tree.nodes.len()).collect();
    let mut relocations = HashMap::new();
    let mut stack: Vec<NodeIndex> = tree.roots.iter().rev().copied().collect();
    while let Some(index) = stack.pop() {
        let node = &tree.nodes[index];
        if let Some(parent) = node.parent.filter(|_| !alive[index]) {
            let target = survivor[parent];
            survivor[index] = target;
            relocations.insert(tree.nodes[index].id, tree.nodes[target].id);

            let moved = std::mem::take(&mut tree.nodes[index].self_count);
            tree.nodes[target].self_count += moved;
        }
        stack.extend(tree.nodes[index].children.iter().rev());
    }

    // Expand dead children in place, keeping sibling order
    for index in 0..tree.nodes.len() {
        if !alive[index] || tree.nodes[index].children.iter().all(|&c| alive[c]) {
            continue;
        }
        let children = std::mem::take(&mut tree.nodes[index].children);
        let mut expanded = Vec::with_capacity(children.len());
        let mut pending: Vec<NodeIndex> = children.into_iter().rev().collect();
        while let Some(child) = pending.pop() {
            if alive[child] {
                tree.nodes[child].parent = Some(index);
                expanded.push(child);
            } else {
                pending.extend(tree.nodes[child].children.iter().rev());
            }
        }
        tree.nodes[index].children = expanded;
    }

    let relocations = Relocations(relocations);
    debug!("Relocated {} native nodes", relocations.len());
    compact(tree, &alive);

    relocations
}

/// Drop dead nodes from the arena and renumber the survivors
fn compact(tree: &mut Tree, alive: &[bool]) {
    let mut remap = vec![usize::MAX; tree.nodes.len()];
    let mut next = 0;
    for (old, &keep) in alive.iter().enumerate() {
        if keep {
            remap[old] = next;
            next += 1;
        }
    }

    let nodes = std::mem::take(&mut tree.nodes);
    tree.nodes = nodes
        .into_iter()
        .zip(alive)
        .filter(|(_, &keep)| keep)
        .map(|(mut node, _)| {
            node.index = remap[node.index];
            node.parent = node.parent.map(|p| remap[p]);
            for child in &mut node.children {
                *child = remap[*child];
                debug_assert_ne!(*child, usize::MAX, "child points at removed node");
            }
            node
        })
        .collect();

    tree.index = tree
        .nodes
        .iter()
        .map(|node| (node.id, node.index))
        .collect();
    tree.roots = root_indices(&tree.nodes);
}

/// Compute total counts and pre-order intervals in one sweep
///
/// Total counts are accumulated in reverse pre-order, so every child is
/// finished before its parent.
pub(crate) fn compute_totals(tree: &mut Tree) {
    let mut preorder = Vec::with_capacity(tree.nodes.len());
    let mut stack: Vec<NodeIndex> = tree.roots.iter().rev().copied().collect();

    while let Some(index) = stack.pop() {
        tree.nodes[index].enter = preorder.len();
        preorder.push(index);
        stack.extend(tree.nodes[index].children.iter().rev());
    }
    debug_assert_eq!(preorder.len(), tree.nodes.len(), "tree has unreachable nodes");

    for &index in preorder.iter().rev() {
        let node = &tree.nodes[index];
        let (children_total, exit) = node.children.iter().fold(
            (0u64, node.enter),
            |(total, exit), &child| {
                let child = &tree.nodes[child];
                (total + child.total_count, exit.max(child.exit))
            },
        );

        let node = &mut tree.nodes[index];
        node.total_count = node.self_count + children_total;
        node.exit = exit;
    }
}

fn root_indices(nodes: &[Node]) -> Vec<NodeIndex> {
    nodes
        .iter()
        .filter(|node| node.parent.is_none())
        .map(|node| node.index)
        .collect()
}
