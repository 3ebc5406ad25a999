// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for NodeLite
//!
//! Loads a content tree from a JSON document into an in-memory repository
//! and runs one query against it.

pub mod commands;
pub mod handlers;
pub mod loader;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{handle_query, handle_validate};
