// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Repository configuration
//!
//! Configuration is read from JSON. Every field has a default, so an empty
//! object is a valid configuration:
//!
//! ```json
//! {
//!   "name": "content",
//!   "indexing": { "enabled": true, "min_token_length": 1, "stop_words": [] },
//!   "query": { "parallel_join_threshold": 1024 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::storage::IndexError;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration:\n{0}")]
    Invalid(Problems),

    #[error("Invalid indexing configuration: {0}")]
    Indexing(#[from] IndexError),
}

/// Top-level repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Repository name, reported in logs
    pub name: String,

    /// Name of the single workspace exposed by the repository
    pub workspace: String,

    /// Full-text indexing settings
    pub indexing: IndexingConfig,

    /// Query execution settings
    pub query: QueryConfig,
}

/// Full-text indexing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    /// Maintain an inverted index; when disabled, CONTAINS scans property values
    pub enabled: bool,

    /// Shortest token kept by the tokenizer (in characters)
    pub min_token_length: usize,

    /// Terms never indexed nor matched
    pub stop_words: Vec<String>,
}

/// Query execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Parent count from which the eager join looks up children in parallel
    pub parallel_join_threshold: usize,

    /// Row limit applied to queries that do not set one
    pub default_limit: Option<usize>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            name: "nodelite".to_string(),
            workspace: "default".to_string(),
            indexing: IndexingConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_token_length: 1,
            stop_words: Vec::new(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            parallel_join_threshold: 1024,
            default_limit: None,
        }
    }
}

impl RepositoryConfig {
    /// Read a configuration file
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration document
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Collect configuration problems without failing
    pub fn validate(&self) -> Problems {
        let mut problems = Problems::default();

        if self.name.trim().is_empty() {
            problems.error("repository name must not be empty");
        }
        if self.workspace.trim().is_empty() {
            problems.error("workspace name must not be empty");
        }
        if self.indexing.min_token_length == 0 {
            problems.error("indexing.min_token_length must be at least 1");
        }
        if self.query.parallel_join_threshold == 0 {
            problems.error("query.parallel_join_threshold must be at least 1");
        }
        if self.query.default_limit == Some(0) {
            problems.warning("query.default_limit of 0 makes every query return no rows");
        }
        if !self.indexing.enabled {
            problems.warning("full-text indexing is disabled; CONTAINS will scan property values");
        }

        problems
    }
}

/// Validation report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Problems {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Problems {
    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

impl fmt::Display for Problems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "ERROR: {}", error)?;
        }
        for warning in &self.warnings {
            writeln!(f, "WARNING: {}", warning)?;
        }
        Ok(())
    }
}
