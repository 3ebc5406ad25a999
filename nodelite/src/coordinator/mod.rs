// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query entry points
//!
//! The QueryManager turns query text or descriptors into prepared queries
//! that execute against the repository's committed snapshot.

pub mod query_manager;

pub use query_manager::{Query, QueryManager};

// Re-export types needed for the public API
pub use crate::exec::{QueryResult, Row};
