// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Value type system for node properties
//!
//! Supports the scalar types a content node carries:
//! - Basic types: String, Number, Boolean
//! - Multi-valued properties: List

use serde::{Deserialize, Serialize};
use std::fmt;

/// Property value attached to a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Number(f64),
    Boolean(bool),
    List(Vec<Value>),
}

impl Value {
    /// Textual fragments fed to the full-text tokenizer
    ///
    /// Multi-valued properties contribute one fragment per element.
    pub fn text_fragments(&self) -> Vec<String> {
        match self {
            Value::List(values) => values.iter().flat_map(|v| v.text_fragments()).collect(),
            other => vec![other.to_string()],
        }
    }

    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Value::List(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::List(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_fragments_flatten() {
        let value = Value::from(vec!["alpha beta", "gamma"]);
        assert_eq!(
            value.text_fragments(),
            vec!["alpha beta".to_string(), "gamma".to_string()]
        );
    }

    #[test]
    fn test_scalar_fragments_use_display_form() {
        assert_eq!(Value::from(42i64).text_fragments(), vec!["42".to_string()]);
        assert_eq!(Value::from(true).text_fragments(), vec!["true".to_string()]);
    }

    #[test]
    fn test_untagged_json_roundtrip_shape() {
        let value: Value = serde_json::from_str(r#"["a", 1, false]"#).unwrap();
        assert_eq!(
            value,
            Value::List(vec![
                Value::String("a".to_string()),
                Value::Number(1.0),
                Value::Boolean(false)
            ])
        );
    }
}
