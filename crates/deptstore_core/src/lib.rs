//! Department mapping layer over SQLite.
//!
//! Provides CRUD for `departments` rows, row rehydration and a
//! repository-owned identity cache keyed by row id.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::department::{Department, DepartmentId, DepartmentRow};
pub use repo::department_repo::{
    DepartmentRepository, RepoError, RepoResult, SqliteDepartmentRepository, DEPARTMENTS_TABLE,
};
pub use repo::identity_cache::IdentityCache;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
