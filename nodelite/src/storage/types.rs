// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Node data structures and error types
//!
//! Defines the Node structure stored in the workspace tree,
//! along with error types for storage operations.

use crate::storage::fulltext::IndexError;
use crate::storage::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Primary type carried by the workspace root
pub const ROOT_TYPE: &str = "nl:root";

/// Error types for storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("No node at path: {0}")]
    PathNotFound(String),

    #[error("Node already exists: {0}")]
    ItemExists(NodeId),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),
}

/// Stable node identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generate a fresh random identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for NodeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hierarchical node with identity, primary type, properties and parent link
///
/// Children are not embedded; the [`NodeStore`](crate::storage::NodeStore)
/// keeps a parent-id to child-ids index instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub primary_type: String,
    pub parent: Option<NodeId>,
    pub properties: BTreeMap<String, Value>,
}

impl Node {
    /// Create a new node without properties
    pub fn new(id: NodeId, name: String, primary_type: String, parent: Option<NodeId>) -> Self {
        Self {
            id,
            name,
            primary_type,
            parent,
            properties: BTreeMap::new(),
        }
    }

    /// Create the workspace root
    pub fn root() -> Self {
        Self::new(NodeId::new(), String::new(), ROOT_TYPE.to_string(), None)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Set a property value
    pub fn set_property(&mut self, key: String, value: Value) {
        self.properties.insert(key, value);
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Remove a property
    pub fn remove_property(&mut self, key: &str) -> Option<Value> {
        self.properties.remove(key)
    }

    /// Check if node has a specific property
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{primaryType={}", self.name, self.primary_type)?;
        for (key, value) in &self.properties {
            write!(f, ", {}={}", key, value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_accessors() {
        let mut node = Node::new(
            NodeId::new(),
            "p1".to_string(),
            "test:Parent".to_string(),
            None,
        );
        node.set_property("test:parentName".to_string(), Value::from("name1"));

        assert!(node.has_property("test:parentName"));
        assert_eq!(
            node.get_property("test:parentName"),
            Some(&Value::String("name1".to_string()))
        );
        assert!(node.remove_property("test:parentName").is_some());
        assert!(!node.has_property("test:parentName"));
    }

    #[test]
    fn test_display_lists_properties() {
        let mut node = Node::new(NodeId::new(), "c1".to_string(), "test:Child".to_string(), None);
        node.set_property("test:childName".to_string(), Value::from("name2"));
        assert_eq!(
            node.to_string(),
            "c1 {primaryType=test:Child, test:childName=name2}"
        );
    }
}
