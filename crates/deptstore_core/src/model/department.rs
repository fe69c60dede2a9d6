//! Department entity.
//!
//! # Responsibility
//! - Hold the mutable attributes of one department row.
//! - Track whether the entity is transient or persisted via `id`.
//!
//! # Invariants
//! - `id` is `None` until the first successful insert and set to the
//!   database-generated rowid afterwards.
//! - `id` goes back to `None` when the row is deleted through a repository.
//! - Constructors never touch the database or the identity cache.

use serde::{Deserialize, Serialize};

/// Surrogate key generated by SQLite (`INTEGER PRIMARY KEY AUTOINCREMENT`).
pub type DepartmentId = i64;

/// Raw `(id, name, location)` tuple as stored in `departments`.
///
/// Text columns are nullable in the schema, hence the `Option`s.
pub type DepartmentRow = (DepartmentId, Option<String>, Option<String>);

/// One organizational department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// `None` while transient.
    pub id: Option<DepartmentId>,
    pub name: String,
    pub location: String,
}

impl Department {
    /// Creates a transient department.
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            location: location.into(),
        }
    }

    /// Creates a department carrying an existing row id.
    ///
    /// Used when rehydrating from storage.
    pub fn with_id(
        id: DepartmentId,
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            location: location.into(),
        }
    }

    /// Returns whether this entity has been assigned a row id.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

impl From<DepartmentRow> for Department {
    fn from((id, name, location): DepartmentRow) -> Self {
        Self::with_id(id, name.unwrap_or_default(), location.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::{Department, DepartmentRow};

    #[test]
    fn new_department_is_transient() {
        let department = Department::new("Payroll", "Building A, 5th Floor");
        assert_eq!(department.id, None);
        assert!(!department.is_persisted());
        assert_eq!(department.name, "Payroll");
        assert_eq!(department.location, "Building A, 5th Floor");
    }

    #[test]
    fn row_conversion_keeps_id_and_defaults_null_text() {
        let row: DepartmentRow = (7, Some("Human Resources".to_string()), None);
        let department = Department::from(row);
        assert_eq!(department.id, Some(7));
        assert!(department.is_persisted());
        assert_eq!(department.name, "Human Resources");
        assert_eq!(department.location, "");
    }
}
