// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Boolean constraint evaluation over join tuples

use crate::exec::error::ExecutionError;
use crate::exec::join::JoinTuple;
use crate::plan::{BoundConstraint, Side};
use crate::storage::{NodeStore, TextMatcher};

/// Evaluates bound constraints against join tuples
///
/// A leaf bound to an absent side is `false`; `NOT` over it is therefore
/// `true`. `AND` and `OR` short-circuit left to right.
pub struct PredicateEvaluator<'a> {
    store: &'a NodeStore,
    matcher: &'a dyn TextMatcher,
}

impl<'a> PredicateEvaluator<'a> {
    pub fn new(store: &'a NodeStore, matcher: &'a dyn TextMatcher) -> Self {
        Self { store, matcher }
    }

    /// Whether the tuple survives the filter
    pub fn evaluate(
        &self,
        constraint: &BoundConstraint,
        tuple: &JoinTuple,
    ) -> Result<bool, ExecutionError> {
        match constraint {
            BoundConstraint::Contains {
                side,
                property,
                expression,
                ..
            } => {
                let id = match side {
                    Side::Parent => Some(tuple.parent),
                    Side::Child => tuple.child,
                };
                let Some(id) = id else {
                    return Ok(false);
                };
                let node = self.store.node(&id)?;
                Ok(self
                    .matcher
                    .matches(node, property.as_deref(), expression)?)
            }
            BoundConstraint::And(left, right) => {
                Ok(self.evaluate(left, tuple)? && self.evaluate(right, tuple)?)
            }
            BoundConstraint::Or(left, right) => {
                Ok(self.evaluate(left, tuple)? || self.evaluate(right, tuple)?)
            }
            BoundConstraint::Not(inner) => Ok(!self.evaluate(inner, tuple)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FullTextIndex, NodeId, Tokenizer, Value};

    fn leaf(side: Side, expression: &str) -> BoundConstraint {
        BoundConstraint::Contains {
            side,
            alias: match side {
                Side::Parent => "p".to_string(),
                Side::Child => "c".to_string(),
            },
            property: None,
            expression: expression.to_string(),
        }
    }

    fn or(left: BoundConstraint, right: BoundConstraint) -> BoundConstraint {
        BoundConstraint::Or(Box::new(left), Box::new(right))
    }

    fn and(left: BoundConstraint, right: BoundConstraint) -> BoundConstraint {
        BoundConstraint::And(Box::new(left), Box::new(right))
    }

    fn not(inner: BoundConstraint) -> BoundConstraint {
        BoundConstraint::Not(Box::new(inner))
    }

    fn fixture() -> (NodeStore, FullTextIndex, NodeId, NodeId, NodeId) {
        let mut store = NodeStore::new();
        let root = store.root_id();
        let p1 = store.create_node(root, "p1", "test:Parent").unwrap();
        let p2 = store.create_node(root, "p2", "test:Parent").unwrap();
        let c1 = store.create_node(p1, "c1", "test:Child").unwrap();
        store.set_property(&p1, "test:parentName", Value::from("name1")).unwrap();
        store.set_property(&p2, "test:parentName", Value::from("name2")).unwrap();
        store.set_property(&c1, "test:childName", Value::from("name2")).unwrap();
        let index = FullTextIndex::build(Tokenizer::default(), &store);
        (store, index, p1, p2, c1)
    }

    #[test]
    fn test_or_across_sides() {
        let (store, index, p1, p2, c1) = fixture();
        let evaluator = PredicateEvaluator::new(&store, &index);
        let filter = or(leaf(Side::Parent, "name2"), leaf(Side::Child, "name2"));

        assert!(evaluator.evaluate(&filter, &JoinTuple::new(p1, Some(c1))).unwrap());
        assert!(evaluator.evaluate(&filter, &JoinTuple::new(p2, None)).unwrap());
    }

    #[test]
    fn test_and_fails_on_absent_child() {
        let (store, index, p1, p2, c1) = fixture();
        let evaluator = PredicateEvaluator::new(&store, &index);
        let filter = and(leaf(Side::Parent, "name2"), leaf(Side::Child, "name2"));

        assert!(!evaluator.evaluate(&filter, &JoinTuple::new(p2, None)).unwrap());
        assert!(!evaluator.evaluate(&filter, &JoinTuple::new(p1, Some(c1))).unwrap());
    }

    #[test]
    fn test_not_over_absent_side_is_true() {
        let (store, index, _, p2, _) = fixture();
        let evaluator = PredicateEvaluator::new(&store, &index);
        let filter = not(leaf(Side::Child, "name2"));
        assert!(evaluator.evaluate(&filter, &JoinTuple::new(p2, None)).unwrap());
    }

    #[test]
    fn test_short_circuit_skips_missing_node() {
        let (store, index, p1, _, _) = fixture();
        let evaluator = PredicateEvaluator::new(&store, &index);
        let ghost = JoinTuple::new(p1, Some(NodeId::new()));

        // The right-hand leaf would fail with NotFound if it were evaluated
        let filter = or(leaf(Side::Parent, "name1"), leaf(Side::Child, "x"));
        assert!(evaluator.evaluate(&filter, &ghost).unwrap());

        let filter = and(leaf(Side::Parent, "name1"), leaf(Side::Child, "x"));
        assert!(matches!(
            evaluator.evaluate(&filter, &ghost),
            Err(ExecutionError::NotFound(_))
        ));
    }

    #[test]
    fn test_unindexed_node_is_corruption() {
        let (mut store, index, p1, _, _) = fixture();
        let late = store.create_node(p1, "late", "test:Child").unwrap();
        let evaluator = PredicateEvaluator::new(&store, &index);
        assert!(matches!(
            evaluator.evaluate(&leaf(Side::Child, "x"), &JoinTuple::new(p1, Some(late))),
            Err(ExecutionError::IndexCorruption(_))
        ));
    }
}
