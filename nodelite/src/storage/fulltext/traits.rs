// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Matcher seam used by predicate evaluation

use super::{FullTextIndex, IndexError, Tokenizer};
use crate::storage::Node;
use std::collections::HashSet;

/// Answers `CONTAINS(alias.*, expr)` and `CONTAINS(alias.prop, expr)` for one node
pub trait TextMatcher: Send + Sync {
    /// `property == None` searches every property of the node
    fn matches(
        &self,
        node: &Node,
        property: Option<&str>,
        expression: &str,
    ) -> Result<bool, IndexError>;

    /// Short name used in plan output and logs
    fn name(&self) -> &'static str;
}

impl TextMatcher for FullTextIndex {
    fn matches(
        &self,
        node: &Node,
        property: Option<&str>,
        expression: &str,
    ) -> Result<bool, IndexError> {
        match property {
            Some(property) => self.contains_in_property(&node.id, property, expression),
            None => self.contains(&node.id, expression),
        }
    }

    fn name(&self) -> &'static str {
        "FullTextIndex"
    }
}

/// Index-less matcher that tokenizes property values on demand
///
/// Used when indexing is disabled in the repository configuration.
#[derive(Debug, Clone, Default)]
pub struct ScanMatcher {
    tokenizer: Tokenizer,
}

impl ScanMatcher {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }
}

impl TextMatcher for ScanMatcher {
    fn matches(
        &self,
        node: &Node,
        property: Option<&str>,
        expression: &str,
    ) -> Result<bool, IndexError> {
        let terms = self.tokenizer.query_terms(expression);
        if terms.is_empty() {
            return Ok(false);
        }

        let node_terms: HashSet<String> = node
            .properties
            .iter()
            .filter(|(name, _)| property.map_or(true, |wanted| wanted == name.as_str()))
            .flat_map(|(_, value)| value.text_fragments())
            .flat_map(|fragment| self.tokenizer.tokenize(&fragment))
            .collect();

        Ok(terms.iter().all(|term| node_terms.contains(term)))
    }

    fn name(&self) -> &'static str {
        "PropertyScan"
    }
}
