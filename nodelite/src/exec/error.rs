// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution error types

use crate::ast::parser::ParserError;
use crate::storage::{IndexError, StorageError};
use thiserror::Error;

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Full-text index corruption: {0}")]
    IndexCorruption(String),

    #[error("Syntax error: {0}")]
    SyntaxError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl ExecutionError {
    pub fn is_index_corruption(&self) -> bool {
        matches!(self, ExecutionError::IndexCorruption(_))
    }
}

impl From<StorageError> for ExecutionError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NodeNotFound(_) | StorageError::PathNotFound(_) => {
                ExecutionError::NotFound(error.to_string())
            }
            StorageError::Index(index_error) => index_error.into(),
            other => ExecutionError::StorageError(other.to_string()),
        }
    }
}

impl From<IndexError> for ExecutionError {
    fn from(error: IndexError) -> Self {
        match error {
            IndexError::CorruptionError(message) => ExecutionError::IndexCorruption(message),
            other => ExecutionError::StorageError(other.to_string()),
        }
    }
}

impl From<ParserError> for ExecutionError {
    fn from(error: ParserError) -> Self {
        ExecutionError::SyntaxError(error.to_string())
    }
}
