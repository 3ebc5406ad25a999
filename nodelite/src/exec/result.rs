// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query result types

use std::fmt;
use std::sync::Arc;

use crate::exec::error::ExecutionError;
use crate::exec::row_iterator::RowIterator;
use crate::repository::WorkspaceSnapshot;
use crate::storage::{Node, NodeId};

/// One result row: a node (or nothing, for an outer-joined side) per selector
///
/// Rows keep the snapshot they were produced from alive, so nodes stay
/// readable after later commits.
#[derive(Clone)]
pub struct Row {
    snapshot: Arc<WorkspaceSnapshot>,
    selectors: Arc<[String]>,
    nodes: Vec<Option<NodeId>>,
}

impl Row {
    pub(crate) fn new(
        snapshot: Arc<WorkspaceSnapshot>,
        selectors: Arc<[String]>,
        nodes: Vec<Option<NodeId>>,
    ) -> Self {
        Self {
            snapshot,
            selectors,
            nodes,
        }
    }

    pub fn selector_names(&self) -> &[String] {
        &self.selectors
    }

    /// Identity of the node bound to `alias`; `None` for an absent outer side
    pub fn node_id(&self, alias: &str) -> Result<Option<NodeId>, ExecutionError> {
        let slot = self
            .selectors
            .iter()
            .position(|name| name == alias)
            .ok_or_else(|| {
                ExecutionError::InvalidQuery(format!(
                    "selector '{}' is not part of this result",
                    alias
                ))
            })?;
        Ok(self.nodes.get(slot).copied().flatten())
    }

    /// Node bound to `alias`; `None` for an absent outer side
    pub fn node(&self, alias: &str) -> Result<Option<&Node>, ExecutionError> {
        match self.node_id(alias)? {
            Some(id) => Ok(Some(self.snapshot.store().node(&id)?)),
            None => Ok(None),
        }
    }

    /// Absolute path of the node bound to `alias`
    pub fn path(&self, alias: &str) -> Result<Option<String>, ExecutionError> {
        match self.node_id(alias)? {
            Some(id) => Ok(Some(self.snapshot.store().path_of(&id)?)),
            None => Ok(None),
        }
    }

    /// Snapshot version the row was read from
    pub fn version(&self) -> u64 {
        self.snapshot.version()
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut row = f.debug_map();
        for (alias, id) in self.selectors.iter().zip(&self.nodes) {
            let path = id.and_then(|id| self.snapshot.store().path_of(&id).ok());
            row.entry(alias, &path);
        }
        row.finish()
    }
}

/// Result of executing a query
///
/// Rows are produced lazily and can be consumed once.
pub struct QueryResult {
    selectors: Arc<[String]>,
    columns: Vec<String>,
    rows: Box<dyn RowIterator + Send>,
}

impl QueryResult {
    pub(crate) fn new(
        selectors: Arc<[String]>,
        columns: Vec<String>,
        rows: Box<dyn RowIterator + Send>,
    ) -> Self {
        Self {
            selectors,
            columns,
            rows,
        }
    }

    /// Every selector bound by the query, FROM selector first
    pub fn selector_names(&self) -> &[String] {
        &self.selectors
    }

    /// Projected selectors
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Row count if known without consuming the result
    pub fn size_hint_rows(&self) -> Option<usize> {
        self.rows.size_hint_rows()
    }

    /// Single-pass row sequence
    pub fn rows(self) -> Box<dyn RowIterator + Send> {
        self.rows
    }

    /// Nodes of a single-selector query
    pub fn nodes(self) -> Result<impl Iterator<Item = Result<Node, ExecutionError>>, ExecutionError> {
        if self.selectors.len() != 1 {
            return Err(ExecutionError::InvalidQuery(format!(
                "nodes() needs a single-selector query, this one binds {}",
                self.selectors.join(", ")
            )));
        }
        let alias = self.selectors[0].clone();
        Ok(self.rows.map(move |row| {
            let row = row?;
            let node = row.node(&alias)?.cloned();
            node.ok_or_else(|| ExecutionError::NotFound(format!("no node bound to '{}'", alias)))
        }))
    }

    /// Drain every row, failing on the first error
    pub fn collect_rows(self) -> Result<Vec<Row>, ExecutionError> {
        self.rows.collect()
    }
}

impl fmt::Debug for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryResult")
            .field("selectors", &self.selectors)
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}
