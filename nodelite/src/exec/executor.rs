// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query executor
//!
//! Resolves the selector collections on a snapshot, checks that the
//! full-text index covers every node the filter will read, and hands back
//! either a lazy row stream or a fully materialized result.

use log::debug;
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::QueryConfig;
use crate::exec::error::ExecutionError;
use crate::exec::join::{join, JoinTuple};
use crate::exec::predicate::PredicateEvaluator;
use crate::exec::result::{QueryResult, Row};
use crate::exec::row_iterator::{QueryRowIterator, RowIterator, VecRowIterator};
use crate::plan::{BoundConstraint, QueryPlan, Side};
use crate::repository::WorkspaceSnapshot;
use crate::storage::NodeId;

/// Row window requested by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub limit: Option<usize>,
    pub offset: usize,
}

/// Runs query plans against workspace snapshots
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    config: QueryConfig,
}

impl QueryExecutor {
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    /// Start a lazy execution
    ///
    /// Index corruption affecting this query fails here, before any row is
    /// produced.
    pub fn execute(
        &self,
        plan: Arc<QueryPlan>,
        snapshot: Arc<WorkspaceSnapshot>,
        request: ExecutionRequest,
    ) -> Result<QueryResult, ExecutionError> {
        let (parents, candidates) = self.resolve(&plan, &snapshot)?;
        let limit = request.limit.or(self.config.default_limit);

        debug!(
            "Executing on version {} with {}: {} parent candidates, {} child candidates, limit {:?}, offset {}",
            snapshot.version(),
            snapshot.matcher().name(),
            parents.len(),
            candidates.len(),
            limit,
            request.offset
        );

        let selectors: Arc<[String]> = plan.selectors.clone().into();
        let columns = plan.columns.clone();
        let rows = QueryRowIterator::new(
            snapshot,
            plan,
            parents,
            candidates,
            request.offset,
            limit,
        );
        Ok(QueryResult::new(selectors, columns, rows.boxed()))
    }

    /// Execute eagerly: join whole collections, filter every tuple, then page
    ///
    /// Join lookups and filtering use the rayon pool above
    /// `parallel_join_threshold`.
    pub fn execute_collect(
        &self,
        plan: &QueryPlan,
        snapshot: Arc<WorkspaceSnapshot>,
        request: ExecutionRequest,
    ) -> Result<QueryResult, ExecutionError> {
        let (parents, candidates) = self.resolve(plan, &snapshot)?;
        let threshold = self.config.parallel_join_threshold;

        let tuples = match &plan.join {
            Some(child_join) => {
                let children: Vec<NodeId> = candidates.into_iter().collect();
                join(
                    snapshot.store(),
                    &parents,
                    &children,
                    child_join.join_type,
                    threshold,
                )?
            }
            None => parents.into_iter().map(JoinTuple::parent_only).collect(),
        };

        let survivors = match &plan.filter {
            Some(filter) => {
                let evaluator = PredicateEvaluator::new(snapshot.store(), snapshot.matcher());
                let keep: Vec<bool> = if tuples.len() < threshold {
                    tuples
                        .iter()
                        .map(|tuple| evaluator.evaluate(filter, tuple))
                        .collect::<Result<_, _>>()?
                } else {
                    tuples
                        .par_iter()
                        .map(|tuple| evaluator.evaluate(filter, tuple))
                        .collect::<Result<_, _>>()?
                };
                tuples
                    .into_iter()
                    .zip(keep)
                    .filter_map(|(tuple, keep)| keep.then_some(tuple))
                    .collect()
            }
            None => tuples,
        };

        let limit = request
            .limit
            .or(self.config.default_limit)
            .unwrap_or(usize::MAX);
        let selectors: Arc<[String]> = plan.selectors.clone().into();
        let joined = plan.join.is_some();
        let rows: Vec<Row> = survivors
            .into_iter()
            .skip(request.offset)
            .take(limit)
            .map(|tuple| {
                let mut nodes = vec![Some(tuple.parent)];
                if joined {
                    nodes.push(tuple.child);
                }
                Row::new(Arc::clone(&snapshot), Arc::clone(&selectors), nodes)
            })
            .collect();

        debug!("Materialized {} rows on version {}", rows.len(), snapshot.version());

        Ok(QueryResult::new(
            selectors,
            plan.columns.clone(),
            VecRowIterator::new(rows).boxed(),
        ))
    }

    /// Parent ids in store order plus the child candidate set
    fn resolve(
        &self,
        plan: &QueryPlan,
        snapshot: &WorkspaceSnapshot,
    ) -> Result<(Vec<NodeId>, HashSet<NodeId>), ExecutionError> {
        let store = snapshot.store();
        let mut parents = store.ids_by_type(&plan.parent.node_type);
        let candidates: HashSet<NodeId> = match &plan.join {
            Some(join) => store.ids_by_type(&join.child.node_type).into_iter().collect(),
            None => HashSet::new(),
        };

        if let Some(filter) = &plan.filter {
            if filter.references(Side::Parent) {
                snapshot.check_index_coverage(parents.iter())?;
            }
            if filter.references(Side::Child) {
                snapshot.check_index_coverage(candidates.iter())?;
            }

            if let (Some(index), Some(expression)) =
                (snapshot.full_text_index(), required_parent_expression(filter))
            {
                let hits = index.search(expression);
                let before = parents.len();
                parents.retain(|id| hits.contains(id));
                debug!(
                    "Index search for '{}' narrowed parents from {} to {}",
                    expression,
                    before,
                    parents.len()
                );
            }
        }

        Ok((parents, candidates))
    }
}

/// Expression of a parent-side `CONTAINS(alias.*, ...)` every surviving row must satisfy
///
/// Only leaves reachable through `AND` qualify; a leaf under `OR` or `NOT`
/// does not constrain the parent set.
fn required_parent_expression(filter: &BoundConstraint) -> Option<&str> {
    match filter {
        BoundConstraint::Contains {
            side: Side::Parent,
            property: None,
            expression,
            ..
        } => Some(expression.as_str()),
        BoundConstraint::And(left, right) => {
            required_parent_expression(left).or_else(|| required_parent_expression(right))
        }
        _ => None,
    }
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new(QueryConfig::default())
    }
}
