// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query manager: the query entry point of a repository
//!
//! Queries are parsed, validated and planned once when created. Every
//! `execute` runs the plan against the committed snapshot of that moment.

use log::{debug, error};
use std::sync::Arc;

use crate::ast::parser::parse_query;
use crate::ast::QueryDescriptor;
use crate::exec::{ExecutionError, ExecutionRequest, QueryResult};
use crate::plan::QueryPlan;
use crate::repository::Repository;

/// Creates queries against one repository
#[derive(Debug, Clone)]
pub struct QueryManager {
    repository: Arc<Repository>,
}

impl QueryManager {
    pub(crate) fn new(repository: Arc<Repository>) -> Self {
        Self { repository }
    }

    /// Parse, validate and plan query text
    ///
    /// Malformed text fails with `SyntaxError`; well-formed text the engine
    /// cannot run (unknown aliases, unsupported joins) with `InvalidQuery`.
    pub fn create_query(&self, statement: &str) -> Result<Query, ExecutionError> {
        let descriptor = parse_query(statement)?;
        self.prepare(statement.trim().to_string(), &descriptor)
    }

    /// Validate and plan a structured descriptor
    pub fn create_query_from_descriptor(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<Query, ExecutionError> {
        self.prepare(descriptor.to_string(), descriptor)
    }

    /// Check query text without keeping the query
    pub fn validate_query(&self, statement: &str) -> Result<(), ExecutionError> {
        self.create_query(statement).map(|_| ())
    }

    pub fn is_valid_query(&self, statement: &str) -> bool {
        self.validate_query(statement).is_ok()
    }

    fn prepare(&self, statement: String, descriptor: &QueryDescriptor) -> Result<Query, ExecutionError> {
        let plan = QueryPlan::build(descriptor)?;
        debug!("Planned query: {}\n{}", statement, plan.format_plan());
        Ok(Query {
            repository: Arc::clone(&self.repository),
            statement,
            plan: Arc::new(plan),
            limit: None,
            offset: 0,
        })
    }
}

/// Prepared query
#[derive(Debug, Clone)]
pub struct Query {
    repository: Arc<Repository>,
    statement: String,
    plan: Arc<QueryPlan>,
    limit: Option<usize>,
    offset: usize,
}

impl Query {
    /// Query text; SQL2 rendering for descriptor-built queries
    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn plan(&self) -> &QueryPlan {
        &self.plan
    }

    /// Maximum number of rows to return
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = Some(limit);
    }

    /// Number of matching rows to skip
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Logical plan as an indented operator tree
    pub fn explain(&self) -> String {
        self.plan.format_plan()
    }

    fn request(&self) -> ExecutionRequest {
        ExecutionRequest {
            limit: self.limit,
            offset: self.offset,
        }
    }

    /// Run against the latest committed snapshot, producing rows lazily
    pub fn execute(&self) -> Result<QueryResult, ExecutionError> {
        let snapshot = self.repository.snapshot();
        let result =
            self.repository
                .executor()
                .execute(Arc::clone(&self.plan), snapshot, self.request());
        self.recover(result)
    }

    /// Run against the latest committed snapshot, computing every row up front
    pub fn execute_collect(&self) -> Result<QueryResult, ExecutionError> {
        let snapshot = self.repository.snapshot();
        let result = self
            .repository
            .executor()
            .execute_collect(&self.plan, snapshot, self.request());
        self.recover(result)
    }

    /// Rebuild the index when execution hit corruption; the error is still returned
    fn recover(
        &self,
        result: Result<QueryResult, ExecutionError>,
    ) -> Result<QueryResult, ExecutionError> {
        if let Err(err) = &result {
            if err.is_index_corruption() {
                error!("Query '{}' failed: {}; rebuilding full-text index", self.statement, err);
                self.repository.rebuild_full_text_index();
            }
        }
        result
    }
}
