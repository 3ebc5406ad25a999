// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Hierarchical node storage
//!
//! This module provides:
//! - Value type system for node properties
//! - In-memory node tree with type and parent-child indices
//! - Full-text index over node properties

pub mod fulltext;
pub mod node_store;
pub mod types;
pub mod value;

pub use fulltext::{FullTextIndex, IndexError, ScanMatcher, TextMatcher, Tokenizer};
pub use node_store::NodeStore;
pub use types::{Node, NodeId, StorageError, ROOT_TYPE};
pub use value::Value;
