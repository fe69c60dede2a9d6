//! Department repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Own the `departments` table lifecycle (create/drop).
//! - Map `Department` entities onto rows and rows back onto entities.
//! - Keep the repository-owned `IdentityCache` in step with every write.
//!
//! # Invariants
//! - Every public operation issues at most one SQL statement.
//! - `update` is the only operation with explicit validation: it rejects an
//!   entity without id before touching SQLite.
//! - Rehydration always builds a fresh entity and overwrites the cache entry.
//! - `find_by_id` trusts the cache once an id is present; rows changed
//!   behind the repository's back are not noticed until the entry is evicted.
//! - `save` on an already persisted entity inserts a second row and moves
//!   the entity onto it; the previous row stays in storage.

use crate::db::DbError;
use crate::model::department::{Department, DepartmentId, DepartmentRow};
use crate::repo::identity_cache::IdentityCache;
use log::{debug, info, warn};
use rusqlite::{params, Connection, Params, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEPARTMENTS_TABLE: &str = "departments";

const DEPARTMENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    location
FROM departments";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by department repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// `update` was called on an entity that has never been saved.
    UnsavedEntity,
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsavedEntity => write!(f, "cannot update unsaved entity"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnsavedEntity => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for department table and entity lifecycle.
pub trait DepartmentRepository {
    /// Creates the backing table if it does not exist yet.
    fn create_table(&self) -> RepoResult<()>;
    /// Drops the backing table if present and empties the identity cache.
    fn drop_table(&mut self) -> RepoResult<()>;
    /// Reports whether the backing table currently exists.
    fn table_exists(&self) -> RepoResult<bool>;
    /// Inserts a new row for `department` and assigns the generated id.
    fn save(&mut self, department: &mut Department) -> RepoResult<DepartmentId>;
    /// Overwrites the row matching `department.id`.
    fn update(&mut self, department: &Department) -> RepoResult<()>;
    /// Deletes the row matching `department.id` and clears the id.
    fn delete(&mut self, department: &mut Department) -> RepoResult<()>;
    /// Builds an entity from a raw row and caches it under the row id.
    fn instance_from_db(&mut self, row: DepartmentRow) -> Department;
    /// Loads every row in store order, replacing the whole cache.
    fn get_all(&mut self) -> RepoResult<Vec<Department>>;
    /// Cache-first lookup by id.
    fn find_by_id(&mut self, id: DepartmentId) -> RepoResult<Option<Department>>;
    /// Database lookup by exact name, ignoring cached entries.
    fn find_by_name(&mut self, name: &str) -> RepoResult<Option<Department>>;

    /// Constructs a transient department and saves it.
    fn create(&mut self, name: &str, location: &str) -> RepoResult<Department> {
        let mut department = Department::new(name, location);
        self.save(&mut department)?;
        Ok(department)
    }
}

/// SQLite-backed department repository owning its identity cache.
pub struct SqliteDepartmentRepository<'conn> {
    conn: &'conn Connection,
    cache: IdentityCache,
}

impl<'conn> SqliteDepartmentRepository<'conn> {
    /// Creates a repository with an empty identity cache.
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_cache(conn, IdentityCache::new())
    }

    /// Creates a repository that continues with an existing cache.
    pub fn with_cache(conn: &'conn Connection, cache: IdentityCache) -> Self {
        Self { conn, cache }
    }

    pub fn cache(&self) -> &IdentityCache {
        &self.cache
    }

    /// Releases the connection borrow and hands the cache back.
    pub fn into_cache(self) -> IdentityCache {
        self.cache
    }

    fn query_first<P: Params>(&self, sql: &str, args: P) -> RepoResult<Option<DepartmentRow>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(args)?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_department_row(row)?));
        }

        Ok(None)
    }
}

impl DepartmentRepository for SqliteDepartmentRepository<'_> {
    fn create_table(&self) -> RepoResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS departments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT,
                location TEXT
            );",
        )?;
        info!("event=table_create module=repo status=ok table={DEPARTMENTS_TABLE}");
        Ok(())
    }

    fn drop_table(&mut self) -> RepoResult<()> {
        self.conn.execute_batch("DROP TABLE IF EXISTS departments;")?;
        let evicted = self.cache.len();
        self.cache.clear();
        info!(
            "event=table_drop module=repo status=ok table={DEPARTMENTS_TABLE} evicted={evicted}"
        );
        Ok(())
    }

    fn table_exists(&self) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [DEPARTMENTS_TABLE],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn save(&mut self, department: &mut Department) -> RepoResult<DepartmentId> {
        self.conn.execute(
            "INSERT INTO departments (name, location) VALUES (?1, ?2);",
            params![department.name.as_str(), department.location.as_str()],
        )?;
        let id = self.conn.last_insert_rowid();

        if let Some(previous_id) = department.id.replace(id) {
            warn!(
                "event=department_save module=repo status=duplicate_row previous_id={previous_id} id={id}"
            );
        }
        self.cache.insert(id, department.clone());
        debug!("event=department_save module=repo status=ok id={id}");

        Ok(id)
    }

    fn update(&mut self, department: &Department) -> RepoResult<()> {
        let Some(id) = department.id else {
            return Err(RepoError::UnsavedEntity);
        };

        let changed = self.conn.execute(
            "UPDATE departments
             SET
                name = ?1,
                location = ?2
             WHERE id = ?3;",
            params![department.name.as_str(), department.location.as_str(), id],
        )?;
        self.cache.insert(id, department.clone());
        debug!("event=department_update module=repo status=ok id={id} changed={changed}");

        Ok(())
    }

    fn delete(&mut self, department: &mut Department) -> RepoResult<()> {
        let Some(id) = department.id else {
            return Ok(());
        };

        let changed = self
            .conn
            .execute("DELETE FROM departments WHERE id = ?1;", [id])?;
        self.cache.remove(id);
        department.id = None;
        debug!("event=department_delete module=repo status=ok id={id} changed={changed}");

        Ok(())
    }

    fn instance_from_db(&mut self, row: DepartmentRow) -> Department {
        let id = row.0;
        let department = Department::from(row);
        self.cache.insert(id, department.clone());
        department
    }

    fn get_all(&mut self) -> RepoResult<Vec<Department>> {
        let rows = {
            let mut stmt = self.conn.prepare(&format!("{DEPARTMENT_SELECT_SQL};"))?;
            let mapped = stmt.query_map([], parse_department_row)?;
            mapped.collect::<Result<Vec<_>, _>>()?
        };

        self.cache.clear();
        let departments: Vec<_> = rows
            .into_iter()
            .map(|row| self.instance_from_db(row))
            .collect();
        debug!(
            "event=department_list module=repo status=ok count={}",
            departments.len()
        );

        Ok(departments)
    }

    fn find_by_id(&mut self, id: DepartmentId) -> RepoResult<Option<Department>> {
        if let Some(cached) = self.cache.get(id) {
            debug!("event=department_find module=cache status=hit id={id}");
            return Ok(Some(cached));
        }

        debug!("event=department_find module=cache status=miss id={id}");
        let row = self.query_first(&format!("{DEPARTMENT_SELECT_SQL} WHERE id = ?1;"), [id])?;
        Ok(row.map(|row| self.instance_from_db(row)))
    }

    fn find_by_name(&mut self, name: &str) -> RepoResult<Option<Department>> {
        let row = self.query_first(
            &format!("{DEPARTMENT_SELECT_SQL} WHERE name = ?1 LIMIT 1;"),
            [name],
        )?;
        Ok(row.map(|row| self.instance_from_db(row)))
    }
}

fn parse_department_row(row: &Row<'_>) -> rusqlite::Result<DepartmentRow> {
    Ok((row.get("id")?, row.get("name")?, row.get("location")?))
}
