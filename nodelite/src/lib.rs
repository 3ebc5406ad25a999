// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! NodeLite - An embedded hierarchical content store with a SQL2 query layer
//!
//! NodeLite keeps a tree of typed nodes with properties, indexes property
//! text for full-text search, and answers queries that join parent and child
//! nodes structurally and filter them with CONTAINS predicates.
//!
//! # Features
//!
//! - **Node Tree**: typed nodes addressed by id or path, subtree deletion
//! - **Full-Text Search**: `CONTAINS(alias.*, 'term')` over every property or one property
//! - **Structural Joins**: `ISCHILDNODE` with INNER and LEFT OUTER semantics
//! - **Atomic Commits**: session writes become visible together on save
//! - **Snapshot Queries**: each execution reads one committed version
//!
//! # Usage
//!
//! ```rust,ignore
//! use nodelite::{Repository, RepositoryConfig};
//!
//! let repository = Repository::new(RepositoryConfig::default())?;
//! let mut session = repository.login();
//! let root = session.root_node_id();
//! let p = session.create_node(root, "p1", "test:Parent")?;
//! session.set_property(p, "test:parentName", "name1")?;
//! session.save()?;
//!
//! let query = repository.query_manager().create_query(
//!     "SELECT * FROM [test:Parent] AS p WHERE CONTAINS(p.*, 'name1')",
//! )?;
//! for row in query.execute()?.rows() {
//!     println!("{:?}", row?.path("p")?);
//! }
//! ```

// Public modules - exposed to external users
pub mod ast;
pub mod config;
pub mod coordinator;
pub mod storage;

// Internal modules - only visible within nodelite crate
pub(crate) mod exec;
pub(crate) mod plan;
pub(crate) mod repository;
pub(crate) mod session;

// Re-export the public API
pub use ast::{Columns, Constraint, JoinType, QueryDescriptor, Selector};
pub use config::{ConfigError, Problems, RepositoryConfig};
pub use coordinator::{Query, QueryManager, QueryResult, Row};
pub use exec::{ExecutionError, RowIterator};
pub use plan::QueryPlan;
pub use repository::{Repository, WorkspaceSnapshot};
pub use session::{PendingChange, Session};
pub use storage::{Node, NodeId, StorageError, Value};

/// NodeLite version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// NodeLite crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
