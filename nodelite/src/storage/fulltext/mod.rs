// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Full-text indexing for node properties
//!
//! Inverted index from normalized term to node identities, plus a forward
//! map used for point lookups during predicate evaluation.

pub mod errors;
pub mod index;
pub mod tokenizer;
pub mod traits;

pub use errors::IndexError;
pub use index::FullTextIndex;
pub use tokenizer::Tokenizer;
pub use traits::{ScanMatcher, TextMatcher};
