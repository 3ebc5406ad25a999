// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Validator for query descriptors
//!
//! # Validation Categories
//!
//! ## Structural
//! - Join type must be INNER or LEFT OUTER
//! - Join condition must be ISCHILDNODE
//! - The parent side of ISCHILDNODE must be the FROM selector
//!
//! ## Semantic
//! - Selector aliases are unique
//! - Every alias used by a column or a CONTAINS leaf is bound in FROM
//!
//! ## Syntax
//! - Node type names, aliases and property names are not empty

use super::ast::*;
use std::collections::HashSet;
use std::fmt;

/// Validation error with context
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub message: String,
    pub error_type: ValidationErrorType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorType {
    Structural,
    Semantic,
    Syntax,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.error_type, self.message)
    }
}

impl ValidationError {
    fn structural(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_type: ValidationErrorType::Structural,
        }
    }

    fn semantic(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_type: ValidationErrorType::Semantic,
        }
    }

    fn syntax(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_type: ValidationErrorType::Syntax,
        }
    }
}

/// Validate a descriptor, collecting every problem found
pub fn validate_query(query: &QueryDescriptor) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_selector(&query.left, &mut errors);
    if let Some(join) = &query.join {
        validate_selector(&join.right, &mut errors);
        validate_join(&query.left, join, &mut errors);
    }

    let bound: HashSet<&str> = query.selector_names().into_iter().collect();

    if let Columns::Selectors(selectors) = &query.columns {
        if selectors.is_empty() {
            errors.push(ValidationError::syntax("column list is empty"));
        }
        for selector in selectors {
            if !bound.contains(selector.as_str()) {
                errors.push(ValidationError::semantic(format!(
                    "column references unknown selector '{}'",
                    selector
                )));
            }
        }
    }

    if let Some(constraint) = &query.constraint {
        validate_constraint(constraint, &bound, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_selector(selector: &Selector, errors: &mut Vec<ValidationError>) {
    if selector.node_type.trim().is_empty() {
        errors.push(ValidationError::syntax(format!(
            "selector '{}' has an empty node type",
            selector.alias
        )));
    }
    if selector.alias.trim().is_empty() {
        errors.push(ValidationError::syntax("selector alias must not be empty"));
    }
}

fn validate_join(left: &Selector, join: &Join, errors: &mut Vec<ValidationError>) {
    if !join.join_type.is_supported() {
        errors.push(ValidationError::structural(format!(
            "{} JOIN is not supported; use INNER or LEFT OUTER",
            join.join_type
        )));
    }

    if join.right.alias == left.alias {
        errors.push(ValidationError::semantic(format!(
            "selector alias '{}' is bound twice",
            left.alias
        )));
    }

    match &join.condition {
        JoinCondition::ChildNode {
            child_selector,
            parent_selector,
        } => {
            if parent_selector != &left.alias || child_selector != &join.right.alias {
                errors.push(ValidationError::structural(format!(
                    "ISCHILDNODE({}, {}) must name the joined selector '{}' as child and the FROM selector '{}' as parent",
                    child_selector, parent_selector, join.right.alias, left.alias
                )));
            }
        }
        other => errors.push(ValidationError::structural(format!(
            "join condition {} is not supported; only ISCHILDNODE is",
            other
        ))),
    }
}

fn validate_constraint(
    constraint: &Constraint,
    bound: &HashSet<&str>,
    errors: &mut Vec<ValidationError>,
) {
    match constraint {
        Constraint::FullTextSearch {
            selector, property, ..
        } => {
            if !bound.contains(selector.as_str()) {
                errors.push(ValidationError::semantic(format!(
                    "CONTAINS references unknown selector '{}'",
                    selector
                )));
            }
            if let Some(property) = property {
                if property.trim().is_empty() {
                    errors.push(ValidationError::syntax(format!(
                        "CONTAINS on '{}' names an empty property",
                        selector
                    )));
                }
            }
        }
        Constraint::And(left, right) | Constraint::Or(left, right) => {
            validate_constraint(left, bound, errors);
            validate_constraint(right, bound, errors);
        }
        Constraint::Not(inner) => validate_constraint(inner, bound, errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent_child(join_type: JoinType) -> QueryDescriptor {
        QueryDescriptor::select("test:Parent", "p").join_children(join_type, "test:Child", "c")
    }

    #[test]
    fn test_valid_join_query() {
        let query = parent_child(JoinType::LeftOuter)
            .filter(Constraint::contains("p", "x").or(Constraint::contains("c", "x")));
        assert!(validate_query(&query).is_ok());
    }

    #[test]
    fn test_unsupported_join_types() {
        for join_type in [JoinType::RightOuter, JoinType::FullOuter, JoinType::Cross] {
            let errors = validate_query(&parent_child(join_type)).unwrap_err();
            assert_eq!(errors[0].error_type, ValidationErrorType::Structural);
        }
    }

    #[test]
    fn test_reversed_child_condition() {
        let mut query = parent_child(JoinType::Inner);
        if let Some(join) = query.join.as_mut() {
            join.condition = JoinCondition::ChildNode {
                child_selector: "p".to_string(),
                parent_selector: "c".to_string(),
            };
        }
        assert!(validate_query(&query).is_err());
    }

    #[test]
    fn test_descendant_condition_rejected() {
        let mut query = parent_child(JoinType::Inner);
        if let Some(join) = query.join.as_mut() {
            join.condition = JoinCondition::DescendantNode {
                descendant_selector: "c".to_string(),
                ancestor_selector: "p".to_string(),
            };
        }
        assert!(validate_query(&query).is_err());
    }

    #[test]
    fn test_unknown_selector_in_constraint() {
        let query =
            QueryDescriptor::select("test:Parent", "p").filter(Constraint::contains("c", "name2"));
        let errors = validate_query(&query).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_type, ValidationErrorType::Semantic);
    }

    #[test]
    fn test_duplicate_alias_and_unknown_column() {
        let query = QueryDescriptor::select("a", "x")
            .join_children(JoinType::Inner, "b", "x")
            .columns(Columns::Selectors(vec!["y".to_string()]));
        let errors = validate_query(&query).unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("bound twice")));
        assert!(errors.iter().any(|e| e.message.contains("unknown selector 'y'")));
    }

    #[test]
    fn test_empty_type_name() {
        let errors = validate_query(&QueryDescriptor::select("", "p")).unwrap_err();
        assert_eq!(errors[0].error_type, ValidationErrorType::Syntax);
    }
}
