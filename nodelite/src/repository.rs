// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Repository: committed workspace state and the commit protocol
//!
//! The committed workspace is an immutable [`WorkspaceSnapshot`] behind an
//! `Arc`. Queries clone the `Arc` when they start and never see later
//! commits. A commit builds the next snapshot off to the side under the
//! commit lock and publishes it with a single pointer swap, so store
//! visibility and index updates become effective together.

use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use crate::config::{ConfigError, RepositoryConfig};
use crate::coordinator::QueryManager;
use crate::exec::QueryExecutor;
use crate::session::{ChangeLog, Session};
use crate::storage::{
    FullTextIndex, IndexError, NodeId, NodeStore, ScanMatcher, StorageError, TextMatcher,
    Tokenizer,
};

/// Immutable view of the workspace at one commit
#[derive(Debug, Clone)]
pub struct WorkspaceSnapshot {
    version: u64,
    store: NodeStore,
    index: Option<FullTextIndex>,
    scan: ScanMatcher,
}

impl WorkspaceSnapshot {
    fn empty(tokenizer: Tokenizer, indexing: bool) -> Self {
        let store = NodeStore::new();
        let index = indexing.then(|| FullTextIndex::build(tokenizer.clone(), &store));
        Self {
            version: 0,
            store,
            index,
            scan: ScanMatcher::new(tokenizer),
        }
    }

    /// Number of commits applied; 0 for a fresh repository
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// `None` when indexing is disabled
    pub fn full_text_index(&self) -> Option<&FullTextIndex> {
        self.index.as_ref()
    }

    /// Matcher answering CONTAINS on this snapshot
    pub fn matcher(&self) -> &dyn TextMatcher {
        match &self.index {
            Some(index) => index as &dyn TextMatcher,
            None => &self.scan,
        }
    }

    /// Fail if the index lacks any of the given nodes
    pub fn check_index_coverage<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a NodeId>,
    ) -> Result<(), IndexError> {
        match &self.index {
            Some(index) => index.check_coverage(ids),
            None => Ok(()),
        }
    }
}

/// Content repository exposing a single workspace
pub struct Repository {
    config: RepositoryConfig,
    executor: QueryExecutor,
    committed: RwLock<Arc<WorkspaceSnapshot>>,
    commit_lock: Mutex<()>,
}

impl Repository {
    /// Create an empty repository
    ///
    /// Configuration errors are fatal; warnings are logged.
    pub fn new(config: RepositoryConfig) -> Result<Arc<Self>, ConfigError> {
        let problems = config.validate();
        if problems.has_errors() {
            return Err(ConfigError::Invalid(problems));
        }
        for warning in &problems.warnings {
            warn!("Repository '{}': {}", config.name, warning);
        }

        let tokenizer = Tokenizer::from_config(&config.indexing)?;
        let snapshot = WorkspaceSnapshot::empty(tokenizer, config.indexing.enabled);

        info!(
            "Started repository '{}' with workspace '{}' (full-text index {})",
            config.name,
            config.workspace,
            if config.indexing.enabled { "enabled" } else { "disabled" }
        );

        Ok(Arc::new(Self {
            executor: QueryExecutor::new(config.query.clone()),
            config,
            committed: RwLock::new(Arc::new(snapshot)),
            commit_lock: Mutex::new(()),
        }))
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn workspace_name(&self) -> &str {
        &self.config.workspace
    }

    /// Open a session on the current committed state
    pub fn login(self: &Arc<Self>) -> Session {
        Session::new(Arc::clone(self))
    }

    /// Query entry point
    pub fn query_manager(self: &Arc<Self>) -> QueryManager {
        QueryManager::new(Arc::clone(self))
    }

    /// Latest committed snapshot
    pub fn snapshot(&self) -> Arc<WorkspaceSnapshot> {
        self.committed.read().clone()
    }

    pub(crate) fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    /// Replay a change log onto the latest snapshot and publish the result
    ///
    /// On failure nothing is published.
    pub(crate) fn commit(&self, log: &ChangeLog) -> Result<Arc<WorkspaceSnapshot>, StorageError> {
        let _guard = self.commit_lock.lock();
        let current = self.snapshot();

        let mut store = current.store.clone();
        let outcome = log.replay(&mut store)?;

        let index = current.index.as_ref().map(|index| {
            let mut index = index.clone();
            for id in &outcome.removed {
                index.remove_node(id);
            }
            for id in &outcome.touched {
                if let Some(node) = store.get_node(id) {
                    index.index_node(node);
                }
            }
            index
        });

        let next = Arc::new(WorkspaceSnapshot {
            version: current.version + 1,
            store,
            index,
            scan: current.scan.clone(),
        });
        *self.committed.write() = Arc::clone(&next);

        info!(
            "Committed {} changes to workspace '{}': version {}, {} touched, {} removed, {} nodes",
            log.len(),
            self.config.workspace,
            next.version,
            outcome.touched.len(),
            outcome.removed.len(),
            next.store.node_count()
        );
        Ok(next)
    }

    /// Check the committed full-text index against the committed store
    pub fn verify_full_text_index(&self) -> Result<(), IndexError> {
        let snapshot = self.snapshot();
        match &snapshot.index {
            Some(index) => index.verify(&snapshot.store),
            None => Ok(()),
        }
    }

    /// Rebuild the full-text index from the committed store
    ///
    /// The snapshot version is unchanged since node content is unchanged.
    pub fn rebuild_full_text_index(&self) {
        let _guard = self.commit_lock.lock();
        let current = self.snapshot();
        let Some(index) = &current.index else {
            debug!("Full-text indexing is disabled; nothing to rebuild");
            return;
        };

        let mut index = index.clone();
        index.rebuild(&current.store);
        let rebuilt = Arc::new(WorkspaceSnapshot {
            version: current.version,
            store: current.store.clone(),
            index: Some(index),
            scan: current.scan.clone(),
        });
        *self.committed.write() = rebuilt;
        info!(
            "Rebuilt full-text index for workspace '{}' at version {}",
            self.config.workspace, current.version
        );
    }

    #[cfg(test)]
    pub(crate) fn replace_snapshot(&self, snapshot: WorkspaceSnapshot) {
        *self.committed.write() = Arc::new(snapshot);
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("name", &self.config.name)
            .field("workspace", &self.config.workspace)
            .field("version", &self.snapshot().version)
            .finish()
    }
}
