// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Content tree loading
//!
//! The data file holds the children of the workspace root:
//!
//! ```json
//! {
//!   "nodes": [
//!     { "name": "p1", "type": "test:Parent",
//!       "properties": { "test:parentName": "name1" },
//!       "children": [
//!         { "name": "c1", "type": "test:Child",
//!           "properties": { "test:childName": "name2" } }
//!       ] }
//!   ]
//! }
//! ```

use log::info;
use nodelite::{NodeId, Session, Value};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct ContentTree {
    #[serde(default)]
    pub nodes: Vec<NodeEntry>,
}

#[derive(Debug, Deserialize)]
pub struct NodeEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub primary_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    #[serde(default)]
    pub children: Vec<NodeEntry>,
}

impl ContentTree {
    pub fn read(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {:?}: {}", path, e))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(serde_json::from_str(text)?)
    }

    /// Create every node through the session and save them as one commit
    pub fn load(&self, session: &mut Session) -> Result<usize, Box<dyn std::error::Error>> {
        let root = session.root_node_id();
        let mut created = 0;
        for entry in &self.nodes {
            created += create_subtree(session, root, entry)?;
        }
        session.save()?;
        info!("Loaded {} nodes", created);
        Ok(created)
    }
}

fn create_subtree(
    session: &mut Session,
    parent: NodeId,
    entry: &NodeEntry,
) -> Result<usize, Box<dyn std::error::Error>> {
    let id = session.create_node(parent, &entry.name, &entry.primary_type)?;
    for (name, value) in &entry.properties {
        session.set_property(id, name, value.clone())?;
    }
    let mut created = 1;
    for child in &entry.children {
        created += create_subtree(session, id, child)?;
    }
    Ok(created)
}
