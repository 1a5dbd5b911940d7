//! Core domain logic for Postbook.
//! This crate is the single source of truth for post invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging};
pub use model::post::{NewPost, Post, PostId, PostValidationError, TITLE_MAX_CHARS};
pub use repo::post_repo::{
    PostListQuery, PostRepository, RepoError, RepoResult, SqlitePostRepository,
};
pub use service::post_service::PostService;

