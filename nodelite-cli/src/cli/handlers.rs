// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for NodeLite

use colored::Colorize;
use std::path::PathBuf;
use std::time::Instant;

use super::commands::OutputFormat;
use super::loader::ContentTree;
use super::output::{QueryOutput, ResultFormatter};
use nodelite::{Repository, RepositoryConfig};

/// Handle the query command (one-off query execution)
pub fn handle_query(
    data: PathBuf,
    config: Option<PathBuf>,
    query: String,
    format: OutputFormat,
    explain: bool,
    limit: Option<usize>,
    offset: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    if !data.exists() {
        return Err(format!("Data file not found at {:?}", data).into());
    }

    let config = match config {
        Some(path) => RepositoryConfig::read(&path)?,
        None => RepositoryConfig::default(),
    };
    let repository = Repository::new(config)?;

    let mut session = repository.login();
    ContentTree::read(&data)?.load(&mut session)?;
    session.logout();

    let mut prepared = match repository.query_manager().create_query(&query) {
        Ok(prepared) => prepared,
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            return Err(e.into());
        }
    };

    if explain {
        println!("{}", "Query Plan".bold().green());
        println!("{}", prepared.explain());
        return Ok(());
    }

    if let Some(limit) = limit {
        prepared.set_limit(limit);
    }
    prepared.set_offset(offset);

    let started = Instant::now();
    let result = prepared.execute().and_then(|result| {
        let columns = result.column_names().to_vec();
        result.collect_rows().map(|rows| (columns, rows))
    });

    match result {
        Ok((columns, rows)) => {
            let output = QueryOutput {
                columns,
                rows,
                execution_time_ms: started.elapsed().as_millis(),
            };
            println!("{}", ResultFormatter::format(&output, format)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            Err(e.into())
        }
    }
}

/// Handle the validate command
pub fn handle_validate(query: String) -> Result<(), Box<dyn std::error::Error>> {
    let repository = Repository::new(RepositoryConfig::default())?;
    match repository.query_manager().validate_query(&query) {
        Ok(()) => {
            println!("{}", "Query is valid".green());
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", format!("Invalid query: {}", e).red());
            Err(e.into())
        }
    }
}
