//! Repository layer: entity mapping, identity cache and SQLite access.
//!
//! # Responsibility
//! - Define the department persistence contract.
//! - Isolate SQL details from callers.
//!
//! # Invariants
//! - Each repository owns exactly one `IdentityCache`; there is no
//!   process-wide cache.
//! - Storage failures are passed through as `RepoError::Db` without retry.

pub mod department_repo;
pub mod identity_cache;
