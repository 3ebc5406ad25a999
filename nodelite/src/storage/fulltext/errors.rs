// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the full-text indexing system

use thiserror::Error;

/// Errors that can occur during index operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("Invalid index configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Index corruption detected: {0}")]
    CorruptionError(String),
}

impl IndexError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create a corruption error
    pub fn corruption<S: Into<String>>(msg: S) -> Self {
        Self::CorruptionError(msg.into())
    }

    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::CorruptionError(_))
    }
}
