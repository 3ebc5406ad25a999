// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Sessions: the write API of a repository
//!
//! This module provides:
//! - `Session`, reading through a private working copy and buffering writes
//! - `ChangeLog`, the ordered pending writes replayed atomically on save

pub mod changes;
pub mod models;

pub use changes::{ChangeLog, PendingChange, ReplayOutcome};
pub use models::Session;
