// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory node store
//!
//! Arena-style storage of nodes keyed by stable identity. Tree edges are
//! kept as parent ids on the nodes plus a parent-id to child-ids index, and
//! a primary-type index gives fast selector scans.

use crate::storage::types::{Node, NodeId, StorageError};
use crate::storage::value::Value;
use std::collections::HashMap;

/// In-memory node tree with indices for fast lookups
#[derive(Debug, Clone)]
pub struct NodeStore {
    /// Identity of the workspace root
    root: NodeId,

    /// All nodes indexed by ID
    nodes: HashMap<NodeId, Node>,

    /// Index: primary type -> node IDs in insertion order
    type_index: HashMap<String, Vec<NodeId>>,

    /// Index: parent ID -> child IDs in insertion order
    children: HashMap<NodeId, Vec<NodeId>>,
}

impl NodeStore {
    /// Create a store holding only the root node
    pub fn new() -> Self {
        let root = Node::root();
        let root_id = root.id;
        let mut store = Self {
            root: root_id,
            nodes: HashMap::new(),
            type_index: HashMap::new(),
            children: HashMap::new(),
        };
        store.insert_unchecked(root);
        store
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Add a node below an existing parent
    pub fn add_node(&mut self, node: Node) -> Result<(), StorageError> {
        if self.nodes.contains_key(&node.id) {
            return Err(StorageError::ItemExists(node.id));
        }

        match node.parent {
            Some(parent) if !self.nodes.contains_key(&parent) => {
                return Err(StorageError::NodeNotFound(parent));
            }
            None => {
                return Err(StorageError::InvalidOperation(format!(
                    "node '{}' has no parent; only the root may be parentless",
                    node.name
                )));
            }
            _ => {}
        }

        if let Some(parent) = node.parent {
            self.children.entry(parent).or_default().push(node.id);
        }
        self.insert_unchecked(node);
        Ok(())
    }

    /// Create a new child node and return its identity
    pub fn create_node(
        &mut self,
        parent: NodeId,
        name: &str,
        primary_type: &str,
    ) -> Result<NodeId, StorageError> {
        let id = NodeId::new();
        self.add_node(Node::new(
            id,
            name.to_string(),
            primary_type.to_string(),
            Some(parent),
        ))?;
        Ok(id)
    }

    fn insert_unchecked(&mut self, node: Node) {
        self.type_index
            .entry(node.primary_type.clone())
            .or_default()
            .push(node.id);
        self.children.entry(node.id).or_default();
        self.nodes.insert(node.id, node);
    }

    /// Get a node by ID
    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get a node by ID, failing with `NodeNotFound`
    pub fn node(&self, id: &NodeId) -> Result<&Node, StorageError> {
        self.nodes.get(id).ok_or(StorageError::NodeNotFound(*id))
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Set a property value on an existing node
    pub fn set_property(
        &mut self,
        id: &NodeId,
        name: &str,
        value: Value,
    ) -> Result<(), StorageError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or(StorageError::NodeNotFound(*id))?;
        node.set_property(name.to_string(), value);
        Ok(())
    }

    /// Remove a property, returning the old value if it was set
    pub fn remove_property(
        &mut self,
        id: &NodeId,
        name: &str,
    ) -> Result<Option<Value>, StorageError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or(StorageError::NodeNotFound(*id))?;
        Ok(node.remove_property(name))
    }

    /// Identities of all nodes with the given primary type, in insertion order
    pub fn ids_by_type(&self, type_tag: &str) -> Vec<NodeId> {
        self.type_index.get(type_tag).cloned().unwrap_or_default()
    }

    /// Direct children of a node
    pub fn children_of(&self, id: &NodeId) -> Result<Vec<&Node>, StorageError> {
        Ok(self
            .child_ids(id)?
            .iter()
            .filter_map(|child| self.nodes.get(child))
            .collect())
    }

    /// Identities of the direct children of a node
    pub fn child_ids(&self, id: &NodeId) -> Result<&[NodeId], StorageError> {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .ok_or(StorageError::NodeNotFound(*id))
    }

    /// Structural predicate behind ISCHILDNODE
    pub fn is_child_of(&self, child: &NodeId, parent: &NodeId) -> Result<bool, StorageError> {
        let child = self.node(child)?;
        if !self.nodes.contains_key(parent) {
            return Err(StorageError::NodeNotFound(*parent));
        }
        Ok(child.parent.as_ref() == Some(parent))
    }

    /// Remove a node together with its whole subtree
    ///
    /// Returns the removed nodes, the requested node first.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<Vec<Node>, StorageError> {
        if *id == self.root {
            return Err(StorageError::InvalidOperation(
                "the root node cannot be removed".to_string(),
            ));
        }
        let parent = self.node(id)?.parent;

        if let Some(parent) = parent {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|sibling| sibling != id);
            }
        }

        let mut removed = Vec::new();
        let mut pending = vec![*id];
        while let Some(current) = pending.pop() {
            if let Some(children) = self.children.remove(&current) {
                pending.extend(children);
            }
            if let Some(node) = self.nodes.remove(&current) {
                if let Some(ids) = self.type_index.get_mut(&node.primary_type) {
                    ids.retain(|other| *other != current);
                    if ids.is_empty() {
                        self.type_index.remove(&node.primary_type);
                    }
                }
                removed.push(node);
            }
        }

        Ok(removed)
    }

    /// Absolute path of a node, `/` for the root
    pub fn path_of(&self, id: &NodeId) -> Result<String, StorageError> {
        let mut segments = Vec::new();
        let mut current = self.node(id)?;
        while let Some(parent) = current.parent {
            segments.push(current.name.as_str());
            current = self.node(&parent)?;
        }
        segments.reverse();
        Ok(format!("/{}", segments.join("/")))
    }

    /// Resolve an absolute path; the first same-name sibling wins
    pub fn node_by_path(&self, path: &str) -> Result<&Node, StorageError> {
        if !path.starts_with('/') {
            return Err(StorageError::PathNotFound(path.to_string()));
        }
        let mut current = self.node(&self.root)?;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = self
                .child_ids(&current.id)?
                .iter()
                .filter_map(|child| self.nodes.get(child))
                .find(|child| child.name == segment)
                .ok_or_else(|| StorageError::PathNotFound(path.to_string()))?;
        }
        Ok(current)
    }

    /// Iterate over every node, root included
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get node count, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}
