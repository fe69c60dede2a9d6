//! Domain model for organizational departments.
//!
//! # Responsibility
//! - Define the in-memory entity mapped onto the `departments` table.
//!
//! # Invariants
//! - A department is identified by the integer rowid assigned by SQLite.
//! - Deletion is a hard delete; a deleted entity goes back to transient.

pub mod department;
