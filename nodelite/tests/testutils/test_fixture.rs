//! Test fixture for NodeLite integration tests
//!
//! Provides isolated in-memory repositories using ONLY the public API.

use nodelite::{ExecutionError, NodeId, Repository, RepositoryConfig, Row};
use std::collections::HashMap;
use std::sync::Arc;

pub const PARENT_TYPE: &str = "test:Parent";
pub const CHILD_TYPE: &str = "test:Child";

/// `parents LEFT OUTER JOIN children ... WHERE parent OR child contains <term>`
pub fn or_join_query(term: &str) -> String {
    format!(
        "SELECT * FROM [test:Parent] as p \
         LEFT OUTER JOIN [test:Child] as c ON ISCHILDNODE(c, p) \
         WHERE  contains(p.*, '{term}') or contains(c.*, '{term}')"
    )
}

/// Same as [`or_join_query`] with AND
pub fn and_join_query(term: &str) -> String {
    format!(
        "SELECT * FROM [test:Parent] as p \
         LEFT OUTER JOIN [test:Child] as c ON ISCHILDNODE(c, p) \
         WHERE  contains(p.*, '{term}') and contains(c.*, '{term}')"
    )
}

/// Test fixture with an isolated repository
pub struct TestFixture {
    repository: Arc<Repository>,
    ids: HashMap<String, NodeId>,
}

impl TestFixture {
    /// Create an empty repository with default configuration
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_config(RepositoryConfig::default())
    }

    pub fn with_config(config: RepositoryConfig) -> Result<Self, Box<dyn std::error::Error>> {
        // RUST_LOG=nodelite=debug shows planning and commit logs
        let _ = env_logger::builder().is_test(true).try_init();
        Ok(Self {
            repository: Repository::new(config)?,
            ids: HashMap::new(),
        })
    }

    /// p1 (name1) with child c1 (name2), p2 (name2), p3 (name3)
    pub fn with_parent_child_data() -> Result<Self, Box<dyn std::error::Error>> {
        let mut fixture = Self::new()?;
        fixture.insert_parent_child_data()?;
        Ok(fixture)
    }

    /// Insert the parent/child sample tree and save it in one commit
    pub fn insert_parent_child_data(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut session = self.repository.login();
        let root = session.root_node_id();

        for (name, value) in [("p1", "name1"), ("p2", "name2"), ("p3", "name3")] {
            let id = session.create_node(root, name, PARENT_TYPE)?;
            session.set_property(id, "test:parentName", value)?;
            self.ids.insert(name.to_string(), id);
        }

        let c1 = session.create_node(self.id("p1"), "c1", CHILD_TYPE)?;
        session.set_property(c1, "test:childName", "name2")?;
        self.ids.insert("c1".to_string(), c1);

        session.save()?;
        Ok(())
    }

    pub fn repository(&self) -> &Arc<Repository> {
        &self.repository
    }

    /// Identity of a node created by the fixture
    pub fn id(&self, name: &str) -> NodeId {
        *self
            .ids
            .get(name)
            .unwrap_or_else(|| panic!("fixture has no node named '{}'", name))
    }

    /// Execute query text and drain every row
    pub fn query(&self, query_text: &str) -> Result<Vec<Row>, ExecutionError> {
        self.repository
            .query_manager()
            .create_query(query_text)?
            .execute()?
            .collect_rows()
    }

    /// Execute query and assert success
    pub fn assert_query_succeeds(&self, query: &str) -> Vec<Row> {
        self.query(query)
            .unwrap_or_else(|e| panic!("Query failed: {}\nError: {}", query, e))
    }

    /// Execute query and assert failure, returning the error
    pub fn assert_query_fails(&self, query: &str) -> ExecutionError {
        match self.query(query) {
            Ok(rows) => panic!("Query should have failed: {} ({} rows)", query, rows.len()),
            Err(e) => e,
        }
    }

    pub fn assert_row_count(&self, query: &str, expected: usize) -> Vec<Row> {
        let rows = self.assert_query_succeeds(query);
        assert_eq!(rows.len(), expected, "row count for: {}", query);
        rows
    }
}

/// Node names per selector, `None` for an absent outer side
pub fn row_names(rows: &[Row], selectors: &[&str]) -> Vec<Vec<Option<String>>> {
    let mut names: Vec<Vec<Option<String>>> = rows
        .iter()
        .map(|row| {
            selectors
                .iter()
                .map(|alias| {
                    row.node(alias)
                        .expect("selector bound by query")
                        .map(|node| node.name.clone())
                })
                .collect()
        })
        .collect();
    names.sort();
    names
}

pub fn named(name: &str) -> Option<String> {
    Some(name.to_string())
}
