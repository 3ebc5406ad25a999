// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query planning
//!
//! Converts validated query descriptors into the scan / join / filter plan
//! the executor runs, and renders that plan for EXPLAIN.

pub mod logical;

pub use logical::{BoundConstraint, ChildJoin, QueryPlan, SelectorScan, Side};
