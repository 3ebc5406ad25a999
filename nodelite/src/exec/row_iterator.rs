// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Row iterators for lazy query evaluation
//!
//! Tuples are produced one parent at a time, filtered and projected as they
//! are pulled. Stopping early never computes the rest of the join.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use crate::exec::error::ExecutionError;
use crate::exec::join::{tuples_for_parent, JoinTuple};
use crate::exec::predicate::PredicateEvaluator;
use crate::exec::result::Row;
use crate::plan::QueryPlan;
use crate::repository::WorkspaceSnapshot;
use crate::storage::NodeId;

/// Iterator trait for lazy row evaluation
pub trait RowIterator: Iterator<Item = Result<Row, ExecutionError>> {
    /// Row count if it is known without scanning
    fn size_hint_rows(&self) -> Option<usize> {
        None
    }

    /// Convert to a boxed trait object
    fn boxed(self) -> Box<dyn RowIterator + Send>
    where
        Self: Sized + Send + 'static,
    {
        Box::new(self)
    }
}

/// Streaming scan / join / filter pipeline over one snapshot
///
/// The snapshot handle is dropped as soon as the sequence is exhausted or an
/// error is returned; after that the iterator only yields `None`.
pub struct QueryRowIterator {
    snapshot: Option<Arc<WorkspaceSnapshot>>,
    plan: Arc<QueryPlan>,
    selectors: Arc<[String]>,
    parents: std::vec::IntoIter<NodeId>,
    /// Child-selector members, present when the plan joins
    candidates: HashSet<NodeId>,
    pending: VecDeque<JoinTuple>,
    skip: usize,
    remaining: Option<usize>,
}

impl QueryRowIterator {
    pub fn new(
        snapshot: Arc<WorkspaceSnapshot>,
        plan: Arc<QueryPlan>,
        parents: Vec<NodeId>,
        candidates: HashSet<NodeId>,
        offset: usize,
        limit: Option<usize>,
    ) -> Self {
        let selectors: Arc<[String]> = plan.selectors.clone().into();
        Self {
            snapshot: Some(snapshot),
            plan,
            selectors,
            parents: parents.into_iter(),
            candidates,
            pending: VecDeque::new(),
            skip: offset,
            remaining: limit,
        }
    }

    /// Whether the snapshot has been let go
    pub fn is_released(&self) -> bool {
        self.snapshot.is_none()
    }

    fn release(&mut self) {
        self.snapshot = None;
        self.pending.clear();
        self.parents = Vec::new().into_iter();
        self.candidates = HashSet::new();
    }

    fn fail(&mut self, error: ExecutionError) -> Option<Result<Row, ExecutionError>> {
        self.release();
        Some(Err(error))
    }

    /// Next tuple before filtering, refilling from the next parent as needed
    fn next_tuple(
        &mut self,
        snapshot: &WorkspaceSnapshot,
    ) -> Option<Result<JoinTuple, ExecutionError>> {
        loop {
            if let Some(tuple) = self.pending.pop_front() {
                return Some(Ok(tuple));
            }
            let parent = self.parents.next()?;
            match &self.plan.join {
                None => return Some(Ok(JoinTuple::parent_only(parent))),
                Some(join) => match tuples_for_parent(
                    snapshot.store(),
                    &self.candidates,
                    join.join_type,
                    parent,
                ) {
                    Ok(tuples) => self.pending.extend(tuples),
                    Err(error) => return Some(Err(error)),
                },
            }
        }
    }

    fn to_row(&self, snapshot: Arc<WorkspaceSnapshot>, tuple: JoinTuple) -> Row {
        let mut nodes = vec![Some(tuple.parent)];
        if self.plan.join.is_some() {
            nodes.push(tuple.child);
        }
        Row::new(snapshot, Arc::clone(&self.selectors), nodes)
    }
}

impl Iterator for QueryRowIterator {
    type Item = Result<Row, ExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        let snapshot = Arc::clone(self.snapshot.as_ref()?);
        let plan = Arc::clone(&self.plan);

        loop {
            if self.remaining == Some(0) {
                self.release();
                return None;
            }

            let tuple = match self.next_tuple(&snapshot) {
                Some(Ok(tuple)) => tuple,
                Some(Err(error)) => return self.fail(error),
                None => {
                    self.release();
                    return None;
                }
            };

            if let Some(filter) = &plan.filter {
                let evaluator = PredicateEvaluator::new(snapshot.store(), snapshot.matcher());
                match evaluator.evaluate(filter, &tuple) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(error) => return self.fail(error),
                }
            }

            if self.skip > 0 {
                self.skip -= 1;
                continue;
            }
            let row = self.to_row(snapshot, tuple);
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
                if *remaining == 0 {
                    self.release();
                }
            }
            return Some(Ok(row));
        }
    }
}

impl RowIterator for QueryRowIterator {}

/// Iterator over materialized rows
pub struct VecRowIterator {
    rows: std::vec::IntoIter<Row>,
    count: usize,
}

impl VecRowIterator {
    pub fn new(rows: Vec<Row>) -> Self {
        let count = rows.len();
        Self {
            rows: rows.into_iter(),
            count,
        }
    }
}

impl Iterator for VecRowIterator {
    type Item = Result<Row, ExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(Ok)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl RowIterator for VecRowIterator {
    fn size_hint_rows(&self) -> Option<usize> {
        Some(self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parser::parse_query;
    use crate::config::RepositoryConfig;
    use crate::repository::Repository;

    fn pipeline(limit: Option<usize>) -> (Arc<WorkspaceSnapshot>, QueryRowIterator) {
        let repository = Repository::new(RepositoryConfig::default()).unwrap();
        let mut session = repository.login();
        let root = session.root_node_id();
        for name in ["p1", "p2", "p3"] {
            let id = session.create_node(root, name, "test:Parent").unwrap();
            session.set_property(id, "title", "shared").unwrap();
        }
        session.save().unwrap();

        let descriptor = parse_query(
            "SELECT * FROM [test:Parent] AS p WHERE CONTAINS(p.*, 'shared')",
        )
        .unwrap();
        let plan = Arc::new(QueryPlan::build(&descriptor).unwrap());
        let snapshot = repository.snapshot();
        let parents = snapshot.store().ids_by_type("test:Parent");
        let rows = QueryRowIterator::new(
            Arc::clone(&snapshot),
            plan,
            parents,
            HashSet::new(),
            0,
            limit,
        );
        (snapshot, rows)
    }

    #[test]
    fn test_snapshot_released_when_exhausted() {
        let (snapshot, mut rows) = pipeline(None);
        assert_eq!(Arc::strong_count(&snapshot), 2);

        let first = rows.next().unwrap().unwrap();
        assert!(!rows.is_released());
        assert_eq!(rows.by_ref().count(), 2);
        assert!(rows.is_released());
        assert!(rows.next().is_none());

        // held by this test and the retained row only
        assert_eq!(Arc::strong_count(&snapshot), 2);
        drop(first);
        assert_eq!(Arc::strong_count(&snapshot), 1);
    }

    #[test]
    fn test_snapshot_released_with_last_row_of_limit() {
        let (_snapshot, mut rows) = pipeline(Some(2));
        assert!(rows.next().is_some());
        assert!(!rows.is_released());
        assert!(rows.next().is_some());
        assert!(rows.is_released());
        assert!(rows.next().is_none());
    }
}
