// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Write session over a repository workspace
//!
//! A session reads from the snapshot it was opened (or last saved or
//! refreshed) on. The first write copies that snapshot's store into a
//! private working copy; reads then come from the working copy, so a session
//! sees its own unsaved changes while queries and other sessions do not.

use log::{debug, warn};
use std::sync::Arc;
use uuid::Uuid;

use crate::coordinator::QueryManager;
use crate::repository::{Repository, WorkspaceSnapshot};
use crate::session::changes::{ChangeLog, PendingChange};
use crate::storage::{Node, NodeId, NodeStore, StorageError, Value};

/// Client session: node reads plus buffered writes applied atomically by `save`
pub struct Session {
    session_id: String,
    repository: Arc<Repository>,
    base: Arc<WorkspaceSnapshot>,
    working: Option<NodeStore>,
    changes: ChangeLog,
}

impl Session {
    pub(crate) fn new(repository: Arc<Repository>) -> Self {
        let base = repository.snapshot();
        let session_id = Uuid::new_v4().to_string();
        debug!(
            "Opened session {} on workspace '{}' at version {}",
            session_id,
            repository.workspace_name(),
            base.version()
        );
        Self {
            session_id,
            repository,
            base,
            working: None,
            changes: ChangeLog::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn repository(&self) -> &Arc<Repository> {
        &self.repository
    }

    /// Version of the committed snapshot this session is based on
    pub fn base_version(&self) -> u64 {
        self.base.version()
    }

    fn store(&self) -> &NodeStore {
        self.working.as_ref().unwrap_or_else(|| self.base.store())
    }

    fn working_mut(&mut self) -> &mut NodeStore {
        let base = &self.base;
        self.working.get_or_insert_with(|| base.store().clone())
    }

    pub fn root_node_id(&self) -> NodeId {
        self.store().root_id()
    }

    pub fn node(&self, id: &NodeId) -> Result<&Node, StorageError> {
        self.store().node(id)
    }

    pub fn node_by_path(&self, path: &str) -> Result<&Node, StorageError> {
        self.store().node_by_path(path)
    }

    pub fn path_of(&self, id: &NodeId) -> Result<String, StorageError> {
        self.store().path_of(id)
    }

    pub fn children_of(&self, id: &NodeId) -> Result<Vec<&Node>, StorageError> {
        self.store().children_of(id)
    }

    /// Create a child node; visible to other readers only after `save`
    pub fn create_node(
        &mut self,
        parent: NodeId,
        name: &str,
        primary_type: &str,
    ) -> Result<NodeId, StorageError> {
        if name.is_empty() || name.contains('/') {
            return Err(StorageError::InvalidOperation(format!(
                "invalid node name '{}'",
                name
            )));
        }
        if primary_type.trim().is_empty() {
            return Err(StorageError::InvalidOperation(format!(
                "node '{}' needs a primary type",
                name
            )));
        }

        let id = NodeId::new();
        self.working_mut().add_node(Node::new(
            id,
            name.to_string(),
            primary_type.to_string(),
            Some(parent),
        ))?;
        self.changes.log_change(PendingChange::CreateNode {
            id,
            parent,
            name: name.to_string(),
            primary_type: primary_type.to_string(),
        });
        Ok(id)
    }

    /// Set or replace a property value
    pub fn set_property(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), StorageError> {
        if name.is_empty() {
            return Err(StorageError::InvalidOperation(
                "property name must not be empty".to_string(),
            ));
        }
        let value = value.into();
        self.working_mut().set_property(&id, name, value.clone())?;
        self.changes.log_change(PendingChange::SetProperty {
            id,
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    /// Remove a property, returning its previous value
    pub fn remove_property(&mut self, id: NodeId, name: &str) -> Result<Option<Value>, StorageError> {
        let previous = self.working_mut().remove_property(&id, name)?;
        if previous.is_some() {
            self.changes.log_change(PendingChange::RemoveProperty {
                id,
                name: name.to_string(),
            });
        }
        Ok(previous)
    }

    /// Delete a node together with its subtree
    pub fn delete_node(&mut self, id: NodeId) -> Result<(), StorageError> {
        let removed = self.working_mut().remove_node(&id)?;
        debug!("Session {} deleted {} nodes", self.session_id, removed.len());
        self.changes.log_change(PendingChange::DeleteNode { id });
        Ok(())
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn pending_changes(&self) -> &[PendingChange] {
        self.changes.changes()
    }

    /// Commit pending changes atomically
    ///
    /// On failure the committed workspace is untouched and the pending
    /// changes are kept, so the caller may `refresh` or retry.
    pub fn save(&mut self) -> Result<(), StorageError> {
        if self.changes.is_empty() {
            // a failed or no-op write may still have copied the store
            self.working = None;
            self.base = self.repository.snapshot();
            return Ok(());
        }
        let committed = self.repository.commit(&self.changes)?;
        debug!(
            "Session {} saved {} changes as version {}",
            self.session_id,
            self.changes.len(),
            committed.version()
        );
        self.base = committed;
        self.working = None;
        self.changes.clear();
        Ok(())
    }

    /// Same as [`save`](Self::save)
    pub fn commit(&mut self) -> Result<(), StorageError> {
        self.save()
    }

    /// Discard pending changes and move to the latest committed snapshot
    pub fn refresh(&mut self) {
        if self.has_pending_changes() {
            debug!(
                "Session {} discarded {} pending changes",
                self.session_id,
                self.changes.len()
            );
        }
        self.changes.clear();
        self.working = None;
        self.base = self.repository.snapshot();
    }

    pub fn query_manager(&self) -> QueryManager {
        self.repository.query_manager()
    }

    /// Close the session, discarding unsaved changes
    pub fn logout(self) {
        if self.has_pending_changes() {
            warn!(
                "Session {} logged out with {} unsaved changes",
                self.session_id,
                self.changes.len()
            );
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("session_id", &self.session_id)
            .field("base_version", &self.base.version())
            .field("pending_changes", &self.changes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RepositoryConfig;
    use crate::repository::Repository;
    use crate::storage::StorageError;

    #[test]
    fn test_session_reads_own_writes_before_save() {
        let repository = Repository::new(RepositoryConfig::default()).unwrap();
        let mut session = repository.login();
        let root = session.root_node_id();
        let p = session.create_node(root, "p", "test:Parent").unwrap();

        assert_eq!(session.path_of(&p).unwrap(), "/p");
        assert!(repository.snapshot().store().get_node(&p).is_none());
        assert_eq!(session.pending_changes().len(), 1);
    }

    #[test]
    fn test_invalid_names_rejected() {
        let repository = Repository::new(RepositoryConfig::default()).unwrap();
        let mut session = repository.login();
        let root = session.root_node_id();
        assert!(matches!(
            session.create_node(root, "a/b", "test:Parent"),
            Err(StorageError::InvalidOperation(_))
        ));
        assert!(matches!(
            session.create_node(root, "", "test:Parent"),
            Err(StorageError::InvalidOperation(_))
        ));
        assert!(matches!(
            session.create_node(root, "a", " "),
            Err(StorageError::InvalidOperation(_))
        ));
        assert!(!session.has_pending_changes());
    }

    #[test]
    fn test_removing_absent_property_logs_nothing() {
        let repository = Repository::new(RepositoryConfig::default()).unwrap();
        let mut session = repository.login();
        let root = session.root_node_id();
        let p = session.create_node(root, "p", "test:Parent").unwrap();
        assert_eq!(session.remove_property(p, "missing").unwrap(), None);
        assert_eq!(session.pending_changes().len(), 1);
    }

    #[test]
    fn test_root_cannot_be_deleted() {
        let repository = Repository::new(RepositoryConfig::default()).unwrap();
        let mut session = repository.login();
        let root = session.root_node_id();
        assert!(matches!(
            session.delete_node(root),
            Err(StorageError::InvalidOperation(_))
        ));
    }
}
