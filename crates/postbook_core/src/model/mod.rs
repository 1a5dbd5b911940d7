//! Domain model for persisted posts.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every stored post is identified by a storage-assigned `PostId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod post;
