//! Session write API tests
//!
//! Commit visibility, snapshot isolation and subtree deletion as seen
//! through queries.

#[path = "testutils/mod.rs"]
mod testutils;

use nodelite::{ExecutionError, StorageError, Value};
use testutils::test_fixture::{named, or_join_query, row_names, TestFixture, CHILD_TYPE};

#[test]
fn test_unsaved_changes_are_invisible_to_queries() {
    let fixture = TestFixture::with_parent_child_data().expect("Failed to create test fixture");
    let mut session = fixture.repository().login();

    session
        .set_property(fixture.id("p3"), "test:parentName", "name2")
        .unwrap();
    fixture.assert_row_count(&or_join_query("name2"), 2);

    session.save().unwrap();
    let rows = fixture.assert_row_count(&or_join_query("name2"), 3);
    assert_eq!(
        row_names(&rows, &["p", "c"]),
        vec![
            vec![named("p1"), named("c1")],
            vec![named("p2"), None],
            vec![named("p3"), None],
        ]
    );
}

#[test]
fn test_running_query_keeps_its_snapshot() {
    let fixture = TestFixture::with_parent_child_data().expect("Failed to create test fixture");
    let result = fixture
        .repository()
        .query_manager()
        .create_query(&or_join_query("name2"))
        .unwrap()
        .execute()
        .unwrap();

    let mut session = fixture.repository().login();
    session.delete_node(fixture.id("p2")).unwrap();
    session.save().unwrap();

    // Started before the delete, so p2 is still there
    let rows = result.collect_rows().unwrap();
    assert_eq!(
        row_names(&rows, &["p", "c"]),
        vec![vec![named("p1"), named("c1")], vec![named("p2"), None]]
    );
    assert!(rows.iter().all(|row| row.version() == 1));

    fixture.assert_row_count(&or_join_query("name2"), 1);
}

#[test]
fn test_deleting_parent_removes_subtree_from_results() {
    let fixture = TestFixture::with_parent_child_data().expect("Failed to create test fixture");
    let mut session = fixture.repository().login();
    session.delete_node(fixture.id("p1")).unwrap();
    assert!(matches!(
        session.node(&fixture.id("c1")),
        Err(StorageError::NodeNotFound(_))
    ));
    session.save().unwrap();

    fixture.assert_row_count("SELECT * FROM [test:Child] AS c", 0);
    let rows = fixture.assert_row_count(&or_join_query("name2"), 1);
    assert_eq!(row_names(&rows, &["p", "c"]), vec![vec![named("p2"), None]]);
    assert!(fixture.repository().verify_full_text_index().is_ok());
}

#[test]
fn test_property_changes_reindex_on_save() {
    let fixture = TestFixture::with_parent_child_data().expect("Failed to create test fixture");
    let mut session = fixture.repository().login();

    let previous = session
        .remove_property(fixture.id("c1"), "test:childName")
        .unwrap();
    assert_eq!(previous, Some(Value::from("name2")));
    let c2 = session.create_node(fixture.id("p3"), "c2", CHILD_TYPE).unwrap();
    session
        .set_property(c2, "tags", vec!["Name2", "other"])
        .unwrap();
    session.save().unwrap();

    let rows = fixture.assert_row_count(&or_join_query("name2"), 2);
    assert_eq!(
        row_names(&rows, &["p", "c"]),
        vec![vec![named("p2"), None], vec![named("p3"), named("c2")]]
    );
}

#[test]
fn test_refresh_discards_pending_changes() {
    let fixture = TestFixture::with_parent_child_data().expect("Failed to create test fixture");
    let mut session = fixture.repository().login();
    let root = session.root_node_id();

    session.create_node(root, "p4", "test:Parent").unwrap();
    assert!(session.has_pending_changes());
    session.refresh();
    assert!(!session.has_pending_changes());
    assert!(session.node_by_path("/p4").is_err());

    session.save().unwrap();
    fixture.assert_row_count("SELECT * FROM [test:Parent] AS p", 3);
}

#[test]
fn test_refresh_picks_up_other_sessions_commits() {
    let fixture = TestFixture::with_parent_child_data().expect("Failed to create test fixture");
    let mut reader = fixture.repository().login();
    let mut writer = fixture.repository().login();

    let root = writer.root_node_id();
    writer.create_node(root, "p4", "test:Parent").unwrap();
    writer.save().unwrap();

    assert!(reader.node_by_path("/p4").is_err());
    reader.refresh();
    assert_eq!(reader.node_by_path("/p4").unwrap().name, "p4");
    assert_eq!(reader.base_version(), 2);
}

#[test]
fn test_failed_commit_keeps_state_and_pending_changes() {
    let fixture = TestFixture::with_parent_child_data().expect("Failed to create test fixture");
    let mut stale = fixture.repository().login();
    let mut deleter = fixture.repository().login();

    stale
        .set_property(fixture.id("p2"), "test:parentName", "renamed")
        .unwrap();
    deleter.delete_node(fixture.id("p2")).unwrap();
    deleter.save().unwrap();

    let version = fixture.repository().snapshot().version();
    assert!(matches!(stale.save(), Err(StorageError::NodeNotFound(_))));
    assert!(stale.has_pending_changes());
    assert_eq!(fixture.repository().snapshot().version(), version);
}

#[test]
fn test_paths_and_children() {
    let fixture = TestFixture::with_parent_child_data().expect("Failed to create test fixture");
    let session = fixture.repository().login();

    assert_eq!(session.path_of(&fixture.id("c1")).unwrap(), "/p1/c1");
    assert_eq!(session.node_by_path("/p1/c1").unwrap().id, fixture.id("c1"));
    let children = session.children_of(&fixture.id("p1")).unwrap();
    assert_eq!(children.len(), 1);
    assert!(matches!(
        session.node_by_path("/p1/missing"),
        Err(StorageError::PathNotFound(_))
    ));
}

#[test]
fn test_save_without_changes_is_noop() {
    let fixture = TestFixture::with_parent_child_data().expect("Failed to create test fixture");
    let mut session = fixture.repository().login();
    session.save().unwrap();
    assert_eq!(fixture.repository().snapshot().version(), 1);
    session.logout();
}

#[test]
fn test_unknown_node_is_not_found() {
    let fixture = TestFixture::with_parent_child_data().expect("Failed to create test fixture");
    let mut session = fixture.repository().login();
    session.delete_node(fixture.id("p3")).unwrap();
    assert!(matches!(
        session.delete_node(fixture.id("p3")),
        Err(StorageError::NodeNotFound(_))
    ));

    let error: ExecutionError = StorageError::NodeNotFound(fixture.id("p3")).into();
    assert!(matches!(error, ExecutionError::NotFound(_)));
}

#[test]
fn test_save_after_noop_write_reads_latest_commit() {
    let fixture = TestFixture::with_parent_child_data().expect("Failed to create test fixture");
    let mut session = fixture.repository().login();
    let mut writer = fixture.repository().login();

    assert_eq!(session.remove_property(fixture.id("p1"), "missing").unwrap(), None);
    assert!(!session.has_pending_changes());

    let root = writer.root_node_id();
    let p4 = writer.create_node(root, "p4", "test:Parent").unwrap();
    writer.save().unwrap();

    session.save().unwrap();
    assert_eq!(session.base_version(), 2);
    assert_eq!(session.node_by_path("/p4").unwrap().id, p4);

    session.set_property(p4, "test:parentName", "name4").unwrap();
    session.save().unwrap();
    fixture.assert_row_count(
        "SELECT * FROM [test:Parent] AS p WHERE CONTAINS(p.*, 'name4')",
        1,
    );
}
