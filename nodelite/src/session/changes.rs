// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Pending change log
//!
//! A session records every write as a change. Commit replays the log, in
//! order, against the latest committed store; the outcome tells the
//! repository which nodes need re-indexing and which left the tree.

use std::collections::BTreeSet;

use crate::storage::{Node, NodeId, NodeStore, StorageError, Value};

/// A single unsaved write
#[derive(Debug, Clone, PartialEq)]
pub enum PendingChange {
    /// A node was created; the id is assigned up front so later changes can refer to it
    CreateNode {
        id: NodeId,
        parent: NodeId,
        name: String,
        primary_type: String,
    },
    /// A property was set or replaced
    SetProperty {
        id: NodeId,
        name: String,
        value: Value,
    },
    /// A property was removed
    RemoveProperty { id: NodeId, name: String },
    /// A node and its subtree were deleted
    DeleteNode { id: NodeId },
}

impl PendingChange {
    /// Node the change applies to
    pub fn target(&self) -> NodeId {
        match self {
            PendingChange::CreateNode { id, .. }
            | PendingChange::SetProperty { id, .. }
            | PendingChange::RemoveProperty { id, .. }
            | PendingChange::DeleteNode { id } => *id,
        }
    }

    /// Apply to a store, returning the ids removed by a delete
    pub fn apply(&self, store: &mut NodeStore) -> Result<Vec<NodeId>, StorageError> {
        match self {
            PendingChange::CreateNode {
                id,
                parent,
                name,
                primary_type,
            } => {
                store.add_node(Node::new(
                    *id,
                    name.clone(),
                    primary_type.clone(),
                    Some(*parent),
                ))?;
                Ok(Vec::new())
            }
            PendingChange::SetProperty { id, name, value } => {
                store.set_property(id, name, value.clone())?;
                Ok(Vec::new())
            }
            PendingChange::RemoveProperty { id, name } => {
                store.remove_property(id, name)?;
                Ok(Vec::new())
            }
            PendingChange::DeleteNode { id } => Ok(store
                .remove_node(id)?
                .into_iter()
                .map(|node| node.id)
                .collect()),
        }
    }
}

/// Nodes affected by a replay
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayOutcome {
    /// Created or modified nodes still present after the replay
    pub touched: BTreeSet<NodeId>,
    /// Nodes removed from the tree, subtrees included
    pub removed: BTreeSet<NodeId>,
}

/// Ordered log of a session's unsaved writes
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    changes: Vec<PendingChange>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_change(&mut self, change: PendingChange) {
        self.changes.push(change);
    }

    pub fn changes(&self) -> &[PendingChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }

    /// Apply every change in order
    ///
    /// Stops at the first failing change; the store is then partially
    /// modified and should be discarded.
    pub fn replay(&self, store: &mut NodeStore) -> Result<ReplayOutcome, StorageError> {
        let mut outcome = ReplayOutcome::default();
        for change in &self.changes {
            let removed = change.apply(store)?;
            if removed.is_empty() {
                outcome.touched.insert(change.target());
            }
            outcome.removed.extend(removed);
        }
        outcome.touched.retain(|id| store.contains_node(id));
        outcome.removed.retain(|id| !store.contains_node(id));
        Ok(outcome)
    }
}
