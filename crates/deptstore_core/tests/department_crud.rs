use deptstore_core::db::open_db_in_memory;
use deptstore_core::{Department, DepartmentRepository, RepoError, SqliteDepartmentRepository};
use rusqlite::{Connection, OptionalExtension};

#[test]
fn create_table_twice_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDepartmentRepository::new(&conn);

    repo.create_table().unwrap();
    repo.create_table().unwrap();

    assert!(repo.table_exists().unwrap());
}

#[test]
fn save_assigns_id_retrievable_by_find_by_id() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDepartmentRepository::new(&conn);
    repo.create_table().unwrap();

    let mut department = Department::new("Payroll", "Building A, 5th Floor");
    let id = repo.save(&mut department).unwrap();

    assert_eq!(department.id, Some(id));
    assert!(repo.cache().contains(id));
    let (row_id, _, _) = fetch_row(&conn, id).unwrap();
    assert_eq!(row_id, id);

    let found = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(found, department);
}

#[test]
fn create_round_trips_against_direct_row_fetch() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDepartmentRepository::new(&conn);
    repo.create_table().unwrap();

    let department = repo.create("Payroll", "Building A, 5th Floor").unwrap();
    let id = department.id.unwrap();

    let (row_id, name, location) = fetch_row(&conn, id).unwrap();
    assert_eq!(row_id, id);
    assert_eq!(name.as_deref(), Some(department.name.as_str()));
    assert_eq!(location.as_deref(), Some(department.location.as_str()));
}

#[test]
fn update_changes_only_the_target_row() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDepartmentRepository::new(&conn);
    repo.create_table().unwrap();

    let mut payroll = repo.create("Payroll", "Building A, 5th Floor").unwrap();
    let human_resources = repo.create("Human Resources", "Building C, East Wing").unwrap();

    payroll.name = "Payroll and Benefits".to_string();
    payroll.location = "Building B, 2nd Floor".to_string();
    repo.update(&payroll).unwrap();

    let (_, name, location) = fetch_row(&conn, payroll.id.unwrap()).unwrap();
    assert_eq!(name.as_deref(), Some("Payroll and Benefits"));
    assert_eq!(location.as_deref(), Some("Building B, 2nd Floor"));

    let other = repo.find_by_id(human_resources.id.unwrap()).unwrap().unwrap();
    assert_eq!(other.name, "Human Resources");
    assert_eq!(other.location, "Building C, East Wing");
    let (_, name, location) = fetch_row(&conn, human_resources.id.unwrap()).unwrap();
    assert_eq!(name.as_deref(), Some("Human Resources"));
    assert_eq!(location.as_deref(), Some("Building C, East Wing"));
}

#[test]
fn update_refreshes_cached_entry() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDepartmentRepository::new(&conn);
    repo.create_table().unwrap();

    let mut department = repo.create("Legal", "Annex").unwrap();
    let id = department.id.unwrap();
    department.location = "Main Building".to_string();
    repo.update(&department).unwrap();

    assert_eq!(repo.cache().get(id).unwrap().location, "Main Building");
    assert_eq!(repo.find_by_id(id).unwrap().unwrap(), department);
}

#[test]
fn update_unsaved_entity_is_rejected_without_mutation() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDepartmentRepository::new(&conn);
    repo.create_table().unwrap();
    repo.create("Payroll", "Building A").unwrap();

    let transient = Department::new("Payroll", "Somewhere Else");
    let err = repo.update(&transient).unwrap_err();

    assert!(matches!(err, RepoError::UnsavedEntity));
    assert_eq!(err.to_string(), "cannot update unsaved entity");
    assert_eq!(count_rows(&conn), 1);
    let (_, _, location) = fetch_row(&conn, 1).unwrap();
    assert_eq!(location.as_deref(), Some("Building A"));
}

#[test]
fn delete_clears_id_row_and_cache_entry() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDepartmentRepository::new(&conn);
    repo.create_table().unwrap();

    let mut department = repo.create("Payroll", "Building A, 5th Floor").unwrap();
    let id = department.id.unwrap();

    repo.delete(&mut department).unwrap();

    assert_eq!(department.id, None);
    assert!(!repo.cache().contains(id));
    assert!(repo.find_by_id(id).unwrap().is_none());
    assert!(fetch_row(&conn, id).is_none());
}

#[test]
fn delete_transient_entity_is_noop() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDepartmentRepository::new(&conn);
    repo.create_table().unwrap();
    repo.create("Payroll", "Building A").unwrap();

    let mut transient = Department::new("Payroll", "Building A");
    repo.delete(&mut transient).unwrap();

    assert_eq!(transient.id, None);
    assert_eq!(count_rows(&conn), 1);
    assert_eq!(repo.cache().len(), 1);
}

#[test]
fn get_all_returns_rows_in_creation_order() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDepartmentRepository::new(&conn);
    repo.create_table().unwrap();

    let first = repo.create("Payroll", "Building A, 5th Floor").unwrap();
    let second = repo.create("Human Resources", "Building C, East Wing").unwrap();

    let all = repo.get_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], first);
    assert_eq!(all[1], second);
    assert_eq!(repo.cache().ids(), vec![first.id.unwrap(), second.id.unwrap()]);
}

#[test]
fn get_all_on_empty_table_returns_empty_list() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDepartmentRepository::new(&conn);
    repo.create_table().unwrap();

    assert!(repo.get_all().unwrap().is_empty());
    assert!(repo.cache().is_empty());
}

#[test]
fn find_by_id_for_unknown_id_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDepartmentRepository::new(&conn);
    repo.create_table().unwrap();
    repo.create("Payroll", "Building A").unwrap();

    assert!(repo.find_by_id(0).unwrap().is_none());
    assert!(repo.find_by_id(999).unwrap().is_none());
    assert!(!repo.cache().contains(0));
}

#[test]
fn find_by_name_returns_matching_row_or_none() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDepartmentRepository::new(&conn);
    repo.create_table().unwrap();

    let payroll = repo.create("Payroll", "Building A, 5th Floor").unwrap();
    repo.create("Human Resources", "Building C, East Wing").unwrap();

    let found = repo.find_by_name("Payroll").unwrap().unwrap();
    assert_eq!(found, payroll);
    assert!(repo.find_by_name("Unknown").unwrap().is_none());
}

#[test]
fn drop_table_removes_table_and_empties_cache() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDepartmentRepository::new(&conn);
    repo.create_table().unwrap();
    repo.create("Payroll", "Building A").unwrap();
    repo.create("Human Resources", "Building C").unwrap();
    assert_eq!(repo.cache().len(), 2);

    repo.drop_table().unwrap();

    assert!(!repo.table_exists().unwrap());
    assert!(repo.cache().is_empty());
    repo.drop_table().unwrap();
}

#[test]
fn operations_on_missing_table_surface_storage_errors() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDepartmentRepository::new(&conn);

    let err = repo.create("Payroll", "Building A").unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(std::error::Error::source(&err).is_some());

    let err = repo.find_by_id(1).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(repo.cache().is_empty());
}

fn fetch_row(conn: &Connection, id: i64) -> Option<(i64, Option<String>, Option<String>)> {
    conn.query_row(
        "SELECT id, name, location FROM departments WHERE id = ?1;",
        [id],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )
    .optional()
    .unwrap()
}

fn count_rows(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM departments;", [], |row| row.get(0))
        .unwrap()
}
