// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Term extraction for full-text indexing and matching
//!
//! A token is a maximal run of Unicode letters and digits. Tokens are
//! lower-cased; no stemming is applied.

use super::IndexError;
use crate::config::IndexingConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("token pattern is a valid regex"));

/// Case-insensitive tokenizer shared by indexing and query matching
#[derive(Debug, Clone)]
pub struct Tokenizer {
    min_token_length: usize,
    stop_words: HashSet<String>,
}

impl Tokenizer {
    pub fn new(min_token_length: usize, stop_words: impl IntoIterator<Item = String>) -> Self {
        Self {
            min_token_length: min_token_length.max(1),
            stop_words: stop_words
                .into_iter()
                .map(|word| word.to_lowercase())
                .collect(),
        }
    }

    /// Build from indexing settings
    ///
    /// A stop word must itself be a single token, otherwise it could never
    /// match anything the tokenizer produces.
    pub fn from_config(config: &IndexingConfig) -> Result<Self, IndexError> {
        for word in &config.stop_words {
            let is_single_token = TOKEN_PATTERN
                .find(word)
                .map(|m| m.start() == 0 && m.end() == word.len())
                .unwrap_or(false);
            if !is_single_token {
                return Err(IndexError::config(format!(
                    "stop word '{}' is not a single token",
                    word
                )));
            }
        }
        Ok(Self::new(
            config.min_token_length,
            config.stop_words.iter().cloned(),
        ))
    }

    /// Split text into normalized terms, in order of appearance
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        TOKEN_PATTERN
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .filter(|term| term.chars().count() >= self.min_token_length)
            .filter(|term| !self.stop_words.contains(term))
            .collect()
    }

    /// Distinct terms of a full-text search expression
    ///
    /// A node satisfies the expression when it contains every term.
    pub fn query_terms(&self, expression: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tokenize(expression)
            .into_iter()
            .filter(|term| seen.insert(term.clone()))
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(1, Vec::new())
    }
}
