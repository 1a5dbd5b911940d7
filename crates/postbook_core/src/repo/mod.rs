//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate posts before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to
//!   storage errors.

pub mod post_repo;
