// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! NodeLite CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // -v wins over --log-level; RUST_LOG can still override per module
    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    match cli.command {
        Commands::Version => {
            println!("{} {}", "NodeLite".bold().green(), nodelite::VERSION);
            println!("Hierarchical content store with structural join queries");
            Ok(())
        }

        Commands::Query {
            query,
            data,
            config,
            format,
            explain,
            limit,
            offset,
        } => cli::handle_query(data, config, query, format, explain, limit, offset),

        Commands::Validate { query } => cli::handle_validate(query),
    }
}
