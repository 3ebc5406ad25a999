// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Structural ISCHILDNODE join
//!
//! Children are found through the store's parent-to-children index and kept
//! when they belong to the child selector's candidate set. Tuples are grouped
//! by parent in parent order; within a parent, children keep insertion order.

use rayon::prelude::*;
use std::collections::HashSet;

use crate::ast::JoinType;
use crate::exec::error::ExecutionError;
use crate::storage::{NodeId, NodeStore};

/// One (parent, child) pair; `child` is `None` for a null-extended outer row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JoinTuple {
    pub parent: NodeId,
    pub child: Option<NodeId>,
}

impl JoinTuple {
    pub fn new(parent: NodeId, child: Option<NodeId>) -> Self {
        Self { parent, child }
    }

    /// Tuple for a query without a join
    pub fn parent_only(parent: NodeId) -> Self {
        Self::new(parent, None)
    }
}

/// Join tuples produced by a single parent
///
/// INNER yields one tuple per matching child. LEFT OUTER additionally yields
/// exactly one `(parent, None)` when no child matches.
pub fn tuples_for_parent(
    store: &NodeStore,
    candidates: &HashSet<NodeId>,
    join_type: JoinType,
    parent: NodeId,
) -> Result<Vec<JoinTuple>, ExecutionError> {
    let mut tuples: Vec<JoinTuple> = store
        .child_ids(&parent)?
        .iter()
        .filter(|child| candidates.contains(*child))
        .map(|child| JoinTuple::new(parent, Some(*child)))
        .collect();

    match join_type {
        JoinType::Inner => {}
        JoinType::LeftOuter => {
            if tuples.is_empty() {
                tuples.push(JoinTuple::new(parent, None));
            }
        }
        other => {
            return Err(ExecutionError::InvalidQuery(format!(
                "{} JOIN is not supported",
                other
            )))
        }
    }

    Ok(tuples)
}

/// Eager join over whole collections
///
/// Parent lookups run on the rayon pool once `parents.len()` reaches
/// `parallel_threshold`; output order is the same either way.
pub fn join(
    store: &NodeStore,
    parents: &[NodeId],
    children: &[NodeId],
    join_type: JoinType,
    parallel_threshold: usize,
) -> Result<Vec<JoinTuple>, ExecutionError> {
    let candidates: HashSet<NodeId> = children.iter().copied().collect();

    let groups: Vec<Vec<JoinTuple>> = if parents.len() < parallel_threshold {
        parents
            .iter()
            .map(|parent| tuples_for_parent(store, &candidates, join_type, *parent))
            .collect::<Result<_, _>>()?
    } else {
        parents
            .par_iter()
            .map(|parent| tuples_for_parent(store, &candidates, join_type, *parent))
            .collect::<Result<_, _>>()?
    };

    Ok(groups.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tree {
        store: NodeStore,
        parents: Vec<NodeId>,
        children: Vec<NodeId>,
    }

    /// p1 has c1 and c2, p2 has none, p3 has one non-candidate child
    fn tree() -> Tree {
        let mut store = NodeStore::new();
        let root = store.root_id();
        let p1 = store.create_node(root, "p1", "test:Parent").unwrap();
        let p2 = store.create_node(root, "p2", "test:Parent").unwrap();
        let p3 = store.create_node(root, "p3", "test:Parent").unwrap();
        let c1 = store.create_node(p1, "c1", "test:Child").unwrap();
        let c2 = store.create_node(p1, "c2", "test:Child").unwrap();
        store.create_node(p3, "other", "test:Other").unwrap();
        Tree {
            store,
            parents: vec![p1, p2, p3],
            children: vec![c1, c2],
        }
    }

    #[test]
    fn test_inner_join_drops_childless_parents() {
        let t = tree();
        let tuples = join(&t.store, &t.parents, &t.children, JoinType::Inner, 1024).unwrap();
        assert_eq!(
            tuples,
            vec![
                JoinTuple::new(t.parents[0], Some(t.children[0])),
                JoinTuple::new(t.parents[0], Some(t.children[1])),
            ]
        );
    }

    #[test]
    fn test_left_outer_join_null_extends_once() {
        let t = tree();
        let tuples = join(&t.store, &t.parents, &t.children, JoinType::LeftOuter, 1024).unwrap();
        assert_eq!(
            tuples,
            vec![
                JoinTuple::new(t.parents[0], Some(t.children[0])),
                JoinTuple::new(t.parents[0], Some(t.children[1])),
                JoinTuple::new(t.parents[1], None),
                JoinTuple::new(t.parents[2], None),
            ]
        );
    }

    #[test]
    fn test_parallel_join_matches_sequential() {
        let t = tree();
        let sequential =
            join(&t.store, &t.parents, &t.children, JoinType::LeftOuter, usize::MAX).unwrap();
        let parallel = join(&t.store, &t.parents, &t.children, JoinType::LeftOuter, 1).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_unsupported_join_type() {
        let t = tree();
        assert!(matches!(
            join(&t.store, &t.parents, &t.children, JoinType::Cross, 1024),
            Err(ExecutionError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_missing_parent_is_not_found() {
        let t = tree();
        let candidates: HashSet<NodeId> = t.children.iter().copied().collect();
        assert!(matches!(
            tuples_for_parent(&t.store, &candidates, JoinType::Inner, NodeId::new()),
            Err(ExecutionError::NotFound(_))
        ));
    }
}
