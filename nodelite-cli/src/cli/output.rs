// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result formatting for CLI output

use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use nodelite::{ExecutionError, Node, Row, Value};

use super::commands::OutputFormat;

/// Drained query result ready for printing
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub execution_time_ms: u128,
}

/// Result formatter for different output formats
pub struct ResultFormatter;

impl ResultFormatter {
    pub fn format(output: &QueryOutput, format: OutputFormat) -> Result<String, ExecutionError> {
        match format {
            OutputFormat::Table => Self::format_table(output),
            OutputFormat::Json => Self::format_json(output),
            OutputFormat::Csv => Self::format_csv(output),
        }
    }

    /// One cell per column holding the node path, NULL for an absent outer side
    fn format_table(output: &QueryOutput) -> Result<String, ExecutionError> {
        if output.rows.is_empty() {
            return Ok(format!("{}\n", "No results found".yellow()));
        }

        let mut text = String::new();
        text.push_str(&format!("{}\n", "Query Results".bold().green()));
        text.push_str(&format!("Execution time: {} ms\n", output.execution_time_ms));
        text.push_str(&format!("Rows returned: {}\n\n", output.rows.len()));

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(
            output
                .columns
                .iter()
                .map(|col| Cell::new(col).fg(Color::Green))
                .collect::<Vec<_>>(),
        );

        for row in &output.rows {
            let mut cells = Vec::with_capacity(output.columns.len());
            for col in &output.columns {
                let cell = match row.node(col)? {
                    Some(node) => format!("{}\n{}", row.path(col)?.unwrap_or_default(), node.primary_type),
                    None => "NULL".to_string(),
                };
                cells.push(cell);
            }
            table.add_row(cells);
        }

        text.push_str(&table.to_string());
        text.push('\n');
        Ok(text)
    }

    fn format_json(output: &QueryOutput) -> Result<String, ExecutionError> {
        let mut rows = Vec::with_capacity(output.rows.len());
        for row in &output.rows {
            let mut object = serde_json::Map::new();
            for col in &output.columns {
                let value = match row.node(col)? {
                    Some(node) => Self::node_to_json(node, row.path(col)?),
                    None => serde_json::Value::Null,
                };
                object.insert(col.clone(), value);
            }
            rows.push(serde_json::Value::Object(object));
        }

        let document = serde_json::json!({
            "columns": output.columns,
            "rows": rows,
            "rows_returned": output.rows.len(),
            "execution_time_ms": output.execution_time_ms,
        });
        Ok(serde_json::to_string_pretty(&document).unwrap_or_else(|_| "{}".to_string()))
    }

    /// Paths per column; an absent side is an empty field
    fn format_csv(output: &QueryOutput) -> Result<String, ExecutionError> {
        let mut text = String::new();
        text.push_str(&output.columns.join(","));
        text.push('\n');

        for row in &output.rows {
            let mut fields = Vec::with_capacity(output.columns.len());
            for col in &output.columns {
                fields.push(Self::csv_field(&row.path(col)?.unwrap_or_default()));
            }
            text.push_str(&fields.join(","));
            text.push('\n');
        }
        Ok(text)
    }

    fn node_to_json(node: &Node, path: Option<String>) -> serde_json::Value {
        let properties: serde_json::Map<String, serde_json::Value> = node
            .properties
            .iter()
            .map(|(name, value)| (name.clone(), Self::value_to_json(value)))
            .collect();
        serde_json::json!({
            "id": node.id.to_string(),
            "path": path,
            "type": node.primary_type,
            "properties": properties,
        })
    }

    fn value_to_json(value: &Value) -> serde_json::Value {
        match value {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Number(n) => serde_json::json!(n),
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::List(values) => {
                serde_json::Value::Array(values.iter().map(Self::value_to_json).collect())
            }
        }
    }

    fn csv_field(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}
