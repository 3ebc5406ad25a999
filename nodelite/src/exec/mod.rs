// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query execution engine
//!
//! This module provides:
//! - Structural ISCHILDNODE join (inner and left outer)
//! - Constraint evaluation with false-for-absent leaves
//! - Lazy row iteration over a committed snapshot

pub mod error;
pub mod executor;
pub mod join;
pub mod predicate;
pub mod result;
pub mod row_iterator;

pub use error::ExecutionError;
pub use executor::{ExecutionRequest, QueryExecutor};
pub use join::JoinTuple;
pub use predicate::PredicateEvaluator;
pub use result::{QueryResult, Row};
pub use row_iterator::{QueryRowIterator, RowIterator, VecRowIterator};
