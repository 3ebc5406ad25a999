// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Inverted full-text index over node properties

use log::{debug, warn};
use std::collections::{BTreeSet, HashMap};

use super::{IndexError, Tokenizer};
use crate::storage::{Node, NodeId, NodeStore};

/// Terms recorded for one node, grouped by property name
type PropertyTerms = HashMap<String, BTreeSet<String>>;

/// Full-text index mapping terms to the nodes whose properties contain them
#[derive(Debug, Clone, Default)]
pub struct FullTextIndex {
    tokenizer: Tokenizer,

    /// Posting lists: term -> node IDs
    postings: HashMap<String, BTreeSet<NodeId>>,

    /// Forward map: node ID -> property -> terms
    forward: HashMap<NodeId, PropertyTerms>,
}

impl FullTextIndex {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            postings: HashMap::new(),
            forward: HashMap::new(),
        }
    }

    /// Build an index covering every node of a store
    pub fn build(tokenizer: Tokenizer, store: &NodeStore) -> Self {
        let mut index = Self::new(tokenizer);
        for node in store.nodes() {
            index.index_node(node);
        }
        debug!(
            "Built full-text index: {} nodes, {} terms",
            index.indexed_node_count(),
            index.term_count()
        );
        index
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Tokenize every property value of a node and record its postings
    ///
    /// Re-indexing a node replaces its previous postings.
    pub fn index_node(&mut self, node: &Node) {
        self.remove_node(&node.id);

        let mut terms_by_property = PropertyTerms::new();
        for (name, value) in &node.properties {
            let terms: BTreeSet<String> = value
                .text_fragments()
                .iter()
                .flat_map(|fragment| self.tokenizer.tokenize(fragment))
                .collect();
            for term in &terms {
                self.postings.entry(term.clone()).or_default().insert(node.id);
            }
            terms_by_property.insert(name.clone(), terms);
        }
        self.forward.insert(node.id, terms_by_property);
    }

    /// Delete all postings for a node; returns whether the node was indexed
    pub fn remove_node(&mut self, id: &NodeId) -> bool {
        let Some(terms_by_property) = self.forward.remove(id) else {
            return false;
        };
        for term in terms_by_property.values().flatten() {
            if let Some(nodes) = self.postings.get_mut(term) {
                nodes.remove(id);
                if nodes.is_empty() {
                    self.postings.remove(term);
                }
            }
        }
        true
    }

    /// Point lookup: does any property of the node contain every term of `expression`
    pub fn contains(&self, id: &NodeId, expression: &str) -> Result<bool, IndexError> {
        let terms_by_property = self.forward_entry(id)?;
        let terms = self.tokenizer.query_terms(expression);
        if terms.is_empty() {
            return Ok(false);
        }
        Ok(terms.iter().all(|term| {
            terms_by_property
                .values()
                .any(|property_terms| property_terms.contains(term))
        }))
    }

    /// Point lookup restricted to a single property
    pub fn contains_in_property(
        &self,
        id: &NodeId,
        property: &str,
        expression: &str,
    ) -> Result<bool, IndexError> {
        let terms_by_property = self.forward_entry(id)?;
        let terms = self.tokenizer.query_terms(expression);
        if terms.is_empty() {
            return Ok(false);
        }
        Ok(terms_by_property
            .get(property)
            .map(|property_terms| terms.iter().all(|term| property_terms.contains(term)))
            .unwrap_or(false))
    }

    /// All nodes containing every term of `expression`
    ///
    /// A term matching nothing yields an empty set.
    pub fn search(&self, expression: &str) -> BTreeSet<NodeId> {
        let terms = self.tokenizer.query_terms(expression);
        let mut postings = terms.iter().map(|term| self.postings.get(term));

        let mut result = match postings.next() {
            Some(Some(first)) => first.clone(),
            _ => return BTreeSet::new(),
        };
        for posting in postings {
            match posting {
                Some(nodes) => result.retain(|id| nodes.contains(id)),
                None => return BTreeSet::new(),
            }
        }
        result
    }

    /// Check that postings, forward map and store agree
    pub fn verify(&self, store: &NodeStore) -> Result<(), IndexError> {
        for (term, nodes) in &self.postings {
            for id in nodes {
                if !store.contains_node(id) {
                    return Err(IndexError::corruption(format!(
                        "posting list for '{}' references deleted node {}",
                        term, id
                    )));
                }
                let recorded = self
                    .forward
                    .get(id)
                    .map(|props| props.values().any(|terms| terms.contains(term)))
                    .unwrap_or(false);
                if !recorded {
                    return Err(IndexError::corruption(format!(
                        "posting for '{}' on node {} has no forward entry",
                        term, id
                    )));
                }
            }
        }
        for node in store.nodes() {
            if !self.forward.contains_key(&node.id) {
                return Err(IndexError::corruption(format!(
                    "node {} is missing from the full-text index",
                    node.id
                )));
            }
        }
        if self.forward.len() != store.node_count() {
            return Err(IndexError::corruption(format!(
                "index tracks {} nodes but the store holds {}",
                self.forward.len(),
                store.node_count()
            )));
        }
        Ok(())
    }

    /// Discard all postings and re-index every node of the store
    pub fn rebuild(&mut self, store: &NodeStore) {
        warn!("Rebuilding full-text index over {} nodes", store.node_count());
        *self = Self::build(self.tokenizer.clone(), store);
    }

    /// Fail if any of the given nodes has no forward entry
    ///
    /// Cheaper than [`verify`](Self::verify); covers exactly what point lookups read.
    pub fn check_coverage<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a NodeId>,
    ) -> Result<(), IndexError> {
        for id in ids {
            self.forward_entry(id)?;
        }
        Ok(())
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn indexed_node_count(&self) -> usize {
        self.forward.len()
    }

    fn forward_entry(&self, id: &NodeId) -> Result<&PropertyTerms, IndexError> {
        self.forward.get(id).ok_or_else(|| {
            IndexError::corruption(format!("node {} is missing from the full-text index", id))
        })
    }
}
