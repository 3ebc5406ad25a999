// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Logical query plan representation
//!
//! Every query compiles to the same fixed shape: scan the parent selector,
//! optionally join the child selector on ISCHILDNODE, filter, project.
//! Constraint leaves are bound to the join side they read so the evaluator
//! never resolves aliases per tuple.

use crate::ast::validator::validate_query;
use crate::ast::{Columns, Constraint, JoinType, QueryDescriptor};
use crate::exec::error::ExecutionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a join tuple a leaf reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Parent,
    Child,
}

/// Scan all nodes of one primary type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorScan {
    pub alias: String,
    pub node_type: String,
}

/// Structural join of the child selector onto the parent scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildJoin {
    pub join_type: JoinType,
    pub child: SelectorScan,
}

/// Constraint with every leaf bound to a join side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundConstraint {
    Contains {
        side: Side,
        alias: String,
        property: Option<String>,
        expression: String,
    },
    And(Box<BoundConstraint>, Box<BoundConstraint>),
    Or(Box<BoundConstraint>, Box<BoundConstraint>),
    Not(Box<BoundConstraint>),
}

impl BoundConstraint {
    /// Whether any leaf reads the given side
    pub fn references(&self, side: Side) -> bool {
        match self {
            BoundConstraint::Contains { side: leaf, .. } => *leaf == side,
            BoundConstraint::And(left, right) | BoundConstraint::Or(left, right) => {
                left.references(side) || right.references(side)
            }
            BoundConstraint::Not(inner) => inner.references(side),
        }
    }
}

impl fmt::Display for BoundConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundConstraint::Contains {
                alias,
                property,
                expression,
                ..
            } => {
                let expression = expression.replace('\'', "''");
                match property {
                    Some(property) => {
                        write!(f, "CONTAINS({}.[{}], '{}')", alias, property, expression)
                    }
                    None => write!(f, "CONTAINS({}.*, '{}')", alias, expression),
                }
            }
            BoundConstraint::And(left, right) => write!(f, "({} AND {})", left, right),
            BoundConstraint::Or(left, right) => write!(f, "({} OR {})", left, right),
            BoundConstraint::Not(inner) => write!(f, "NOT {}", inner),
        }
    }
}

/// Executable query plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub parent: SelectorScan,
    pub join: Option<ChildJoin>,
    pub filter: Option<BoundConstraint>,
    /// Row slots, parent first
    pub selectors: Vec<String>,
    /// Projected selectors
    pub columns: Vec<String>,
}

impl QueryPlan {
    /// Validate a descriptor and compile it into a plan
    pub fn build(descriptor: &QueryDescriptor) -> Result<Self, ExecutionError> {
        if let Err(errors) = validate_query(descriptor) {
            let messages: Vec<String> = errors.iter().map(|e| e.message.clone()).collect();
            return Err(ExecutionError::InvalidQuery(messages.join("; ")));
        }

        let parent = SelectorScan {
            alias: descriptor.left.alias.clone(),
            node_type: descriptor.left.node_type.clone(),
        };
        let join = descriptor.join.as_ref().map(|join| ChildJoin {
            join_type: join.join_type,
            child: SelectorScan {
                alias: join.right.alias.clone(),
                node_type: join.right.node_type.clone(),
            },
        });

        let selectors: Vec<String> = descriptor
            .selector_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let columns = match &descriptor.columns {
            Columns::All => selectors.clone(),
            Columns::Selectors(list) => list.clone(),
        };

        let mut plan = Self {
            parent,
            join,
            filter: None,
            selectors,
            columns,
        };
        plan.filter = descriptor
            .constraint
            .as_ref()
            .map(|constraint| plan.bind(constraint))
            .transpose()?;
        Ok(plan)
    }

    fn bind(&self, constraint: &Constraint) -> Result<BoundConstraint, ExecutionError> {
        Ok(match constraint {
            Constraint::FullTextSearch {
                selector,
                property,
                expression,
            } => BoundConstraint::Contains {
                side: self.side_of(selector)?,
                alias: selector.clone(),
                property: property.clone(),
                expression: expression.clone(),
            },
            Constraint::And(left, right) => {
                BoundConstraint::And(Box::new(self.bind(left)?), Box::new(self.bind(right)?))
            }
            Constraint::Or(left, right) => {
                BoundConstraint::Or(Box::new(self.bind(left)?), Box::new(self.bind(right)?))
            }
            Constraint::Not(inner) => BoundConstraint::Not(Box::new(self.bind(inner)?)),
        })
    }

    fn side_of(&self, alias: &str) -> Result<Side, ExecutionError> {
        if alias == self.parent.alias {
            return Ok(Side::Parent);
        }
        match &self.join {
            Some(join) if join.child.alias == alias => Ok(Side::Child),
            _ => Err(ExecutionError::InvalidQuery(format!(
                "selector '{}' is not bound by the query",
                alias
            ))),
        }
    }

    /// Render the plan as an indented operator tree
    pub fn format_plan(&self) -> String {
        let mut output = String::new();
        let mut indent = 0;

        output.push_str(&format!("Project({})\n", self.columns.join(", ")));
        indent += 1;

        if let Some(filter) = &self.filter {
            output.push_str(&format!("{}Filter({})\n", "  ".repeat(indent), filter));
            indent += 1;
        }

        let prefix = "  ".repeat(indent);
        match &self.join {
            Some(join) => {
                output.push_str(&format!(
                    "{}ChildJoin({} ON ISCHILDNODE({}, {}))\n",
                    prefix, join.join_type, join.child.alias, self.parent.alias
                ));
                output.push_str(&format_scan(&self.parent, indent + 1));
                output.push_str(&format_scan(&join.child, indent + 1));
            }
            None => output.push_str(&format_scan(&self.parent, indent)),
        }

        output
    }
}

fn format_scan(scan: &SelectorScan, indent: usize) -> String {
    format!(
        "{}SelectorScan({} [{}])\n",
        "  ".repeat(indent),
        scan.alias,
        scan.node_type
    )
}

impl fmt::Display for QueryPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_plan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn or_join() -> QueryDescriptor {
        QueryDescriptor::select("test:Parent", "p")
            .join_children(JoinType::LeftOuter, "test:Child", "c")
            .filter(Constraint::contains("p", "name2").or(Constraint::contains("c", "name2")))
    }

    #[test]
    fn test_leaves_bound_to_sides() {
        let plan = QueryPlan::build(&or_join()).unwrap();
        let filter = plan.filter.as_ref().unwrap();
        assert!(filter.references(Side::Parent));
        assert!(filter.references(Side::Child));
        assert_eq!(plan.selectors, vec!["p", "c"]);
        assert_eq!(plan.columns, vec!["p", "c"]);
    }

    #[test]
    fn test_explain_tree() {
        let plan = QueryPlan::build(&or_join()).unwrap();
        assert_eq!(
            plan.format_plan(),
            "Project(p, c)\n\
             \x20 Filter((CONTAINS(p.*, 'name2') OR CONTAINS(c.*, 'name2')))\n\
             \x20   ChildJoin(LEFT OUTER ON ISCHILDNODE(c, p))\n\
             \x20     SelectorScan(p [test:Parent])\n\
             \x20     SelectorScan(c [test:Child])\n"
        );
    }

    #[test]
    fn test_explain_escapes_quotes() {
        let descriptor = QueryDescriptor::select("test:Parent", "p")
            .filter(Constraint::contains("p", "it's"));
        let plan = QueryPlan::build(&descriptor).unwrap();
        assert!(plan
            .format_plan()
            .contains("Filter(CONTAINS(p.*, 'it''s'))"));
    }

    #[test]
    fn test_projection_subset() {
        let descriptor = or_join().columns(Columns::Selectors(vec!["c".to_string()]));
        let plan = QueryPlan::build(&descriptor).unwrap();
        assert_eq!(plan.columns, vec!["c"]);
        assert_eq!(plan.selectors, vec!["p", "c"]);
    }

    #[test]
    fn test_invalid_descriptor_is_invalid_query() {
        let descriptor =
            QueryDescriptor::select("test:Parent", "p").filter(Constraint::contains("c", "x"));
        assert!(matches!(
            QueryPlan::build(&descriptor),
            Err(ExecutionError::InvalidQuery(_))
        ));

        let descriptor = QueryDescriptor::select("a", "p").join_children(JoinType::Cross, "b", "c");
        assert!(matches!(
            QueryPlan::build(&descriptor),
            Err(ExecutionError::InvalidQuery(_))
        ));
    }
}
