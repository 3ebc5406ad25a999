// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Structured query descriptor
//!
//! The descriptor is what the parser produces and what programmatic callers
//! build directly: one or two selectors, an optional structural join and a
//! boolean constraint over full-text leaves.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named binding of an alias to all nodes of one primary type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    pub node_type: String,
    pub alias: String,
}

impl Selector {
    pub fn new(node_type: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            alias: alias.into(),
        }
    }
}

/// Join modes recognised by the query surface
///
/// Only `Inner` and `LeftOuter` are executable; the others are rejected
/// during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Cross,
}

impl JoinType {
    pub fn is_supported(&self) -> bool {
        matches!(self, JoinType::Inner | JoinType::LeftOuter)
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            JoinType::Inner => "INNER",
            JoinType::LeftOuter => "LEFT OUTER",
            JoinType::RightOuter => "RIGHT OUTER",
            JoinType::FullOuter => "FULL OUTER",
            JoinType::Cross => "CROSS",
        };
        write!(f, "{}", text)
    }
}

/// Structural relationship between the two selectors of a join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinCondition {
    /// ISCHILDNODE(child, parent)
    ChildNode {
        child_selector: String,
        parent_selector: String,
    },
    /// ISDESCENDANTNODE(descendant, ancestor)
    DescendantNode {
        descendant_selector: String,
        ancestor_selector: String,
    },
    /// ISSAMENODE(a, b)
    SameNode {
        selector1: String,
        selector2: String,
    },
}

impl fmt::Display for JoinCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinCondition::ChildNode {
                child_selector,
                parent_selector,
            } => write!(f, "ISCHILDNODE({}, {})", child_selector, parent_selector),
            JoinCondition::DescendantNode {
                descendant_selector,
                ancestor_selector,
            } => write!(
                f,
                "ISDESCENDANTNODE({}, {})",
                descendant_selector, ancestor_selector
            ),
            JoinCondition::SameNode {
                selector1,
                selector2,
            } => write!(f, "ISSAMENODE({}, {})", selector1, selector2),
        }
    }
}

/// Join clause: `<join_type> JOIN <right> ON <condition>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Join {
    pub join_type: JoinType,
    pub right: Selector,
    pub condition: JoinCondition,
}

/// Boolean constraint over full-text leaves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    /// CONTAINS(selector.*, 'expression') or CONTAINS(selector.[property], 'expression')
    FullTextSearch {
        selector: String,
        property: Option<String>,
        expression: String,
    },
    And(Box<Constraint>, Box<Constraint>),
    Or(Box<Constraint>, Box<Constraint>),
    Not(Box<Constraint>),
}

impl Constraint {
    /// Full-text leaf over every property of the selector's node
    pub fn contains(selector: impl Into<String>, expression: impl Into<String>) -> Self {
        Constraint::FullTextSearch {
            selector: selector.into(),
            property: None,
            expression: expression.into(),
        }
    }

    /// Full-text leaf restricted to one property
    pub fn contains_property(
        selector: impl Into<String>,
        property: impl Into<String>,
        expression: impl Into<String>,
    ) -> Self {
        Constraint::FullTextSearch {
            selector: selector.into(),
            property: Some(property.into()),
            expression: expression.into(),
        }
    }

    pub fn and(self, other: Constraint) -> Self {
        Constraint::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Constraint) -> Self {
        Constraint::Or(Box::new(self), Box::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Constraint::Not(Box::new(self))
    }

    /// Selector aliases referenced by any leaf, in order of appearance
    pub fn referenced_selectors(&self) -> Vec<&str> {
        let mut selectors = Vec::new();
        self.collect_selectors(&mut selectors);
        selectors
    }

    fn collect_selectors<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Constraint::FullTextSearch { selector, .. } => {
                if !out.contains(&selector.as_str()) {
                    out.push(selector);
                }
            }
            Constraint::And(left, right) | Constraint::Or(left, right) => {
                left.collect_selectors(out);
                right.collect_selectors(out);
            }
            Constraint::Not(inner) => inner.collect_selectors(out),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::FullTextSearch {
                selector,
                property,
                expression,
            } => {
                let target = match property {
                    Some(property) => format!("[{}]", property),
                    None => "*".to_string(),
                };
                write!(
                    f,
                    "CONTAINS({}.{}, '{}')",
                    selector,
                    target,
                    expression.replace('\'', "''")
                )
            }
            Constraint::And(left, right) => write!(f, "({} AND {})", left, right),
            Constraint::Or(left, right) => write!(f, "({} OR {})", left, right),
            Constraint::Not(inner) => write!(f, "NOT {}", inner),
        }
    }
}

/// Projected columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Columns {
    /// SELECT *
    All,
    /// SELECT a.*, b.*
    Selectors(Vec<String>),
}

/// Complete structured query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub columns: Columns,
    pub left: Selector,
    pub join: Option<Join>,
    pub constraint: Option<Constraint>,
}

impl QueryDescriptor {
    /// Start a single-selector query: `SELECT * FROM [node_type] AS alias`
    pub fn select(node_type: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            columns: Columns::All,
            left: Selector::new(node_type, alias),
            join: None,
            constraint: None,
        }
    }

    /// Join the children selector: `... JOIN [node_type] AS alias ON ISCHILDNODE(alias, left)`
    pub fn join_children(
        mut self,
        join_type: JoinType,
        node_type: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        let right = Selector::new(node_type, alias);
        let condition = JoinCondition::ChildNode {
            child_selector: right.alias.clone(),
            parent_selector: self.left.alias.clone(),
        };
        self.join = Some(Join {
            join_type,
            right,
            condition,
        });
        self
    }

    pub fn filter(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn columns(mut self, columns: Columns) -> Self {
        self.columns = columns;
        self
    }

    /// Aliases bound by the FROM clause, left selector first
    pub fn selector_names(&self) -> Vec<&str> {
        let mut names = vec![self.left.alias.as_str()];
        if let Some(join) = &self.join {
            names.push(join.right.alias.as_str());
        }
        names
    }
}

impl fmt::Display for QueryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.columns {
            Columns::All => write!(f, "SELECT *")?,
            Columns::Selectors(selectors) => {
                let list: Vec<String> = selectors.iter().map(|s| format!("{}.*", s)).collect();
                write!(f, "SELECT {}", list.join(", "))?
            }
        }
        write!(f, " FROM [{}] AS {}", self.left.node_type, self.left.alias)?;
        if let Some(join) = &self.join {
            write!(
                f,
                " {} JOIN [{}] AS {} ON {}",
                join.join_type, join.right.node_type, join.right.alias, join.condition
            )?;
        }
        if let Some(constraint) = &self.constraint {
            write!(f, " WHERE {}", constraint)?;
        }
        Ok(())
    }
}
