//! Post domain model.
//!
//! # Responsibility
//! - Define the canonical post record and its create request.
//! - Own field-level validation shared by repository and wire paths.
//!
//! # Invariants
//! - `title` never exceeds `TITLE_MAX_CHARS` characters.
//! - `id` is assigned by storage, positive, and never reused.
//! - Timestamps are storage-owned; callers never set them on write.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned identifier of a post.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type PostId = i64;

/// Maximum title length, counted in Unicode scalar values.
pub const TITLE_MAX_CHARS: usize = 100;

/// Field constraint violation on a post or create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    /// Title is longer than `max` characters.
    TitleTooLong { max: usize, actual: usize },
    /// Identifier cannot belong to a stored post.
    InvalidId(PostId),
}

impl Display for PostValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TitleTooLong { max, actual } => {
                write!(f, "title has {actual} characters; at most {max} allowed")
            }
            Self::InvalidId(id) => write!(f, "post id must be positive, got {id}"),
        }
    }
}

impl Error for PostValidationError {}

/// Create request for a post that has no identity yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

impl NewPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Checks field constraints before the request reaches storage.
    pub fn validate(&self) -> Result<(), PostValidationError> {
        validate_title(&self.title)
    }
}

/// Canonical persisted post.
///
/// Loaded by id, mutated in memory, then written back in full through
/// `PostRepository::update_post`. There is no dirty tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PostWire")]
pub struct Post {
    /// Storage-assigned identifier.
    pub id: PostId,
    /// Short heading, bounded by `TITLE_MAX_CHARS`.
    pub title: String,
    /// Unbounded body text.
    pub content: String,
    /// Unix epoch milliseconds, set on insert.
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed on every update.
    pub updated_at: i64,
}

impl Post {
    /// Validates all field-level invariants.
    ///
    /// # Errors
    /// - `InvalidId` when `id <= 0`.
    /// - `TitleTooLong` when the title exceeds `TITLE_MAX_CHARS`.
    pub fn validate(&self) -> Result<(), PostValidationError> {
        if self.id <= 0 {
            return Err(PostValidationError::InvalidId(self.id));
        }
        validate_title(&self.title)
    }
}

#[derive(Deserialize)]
struct PostWire {
    id: PostId,
    title: String,
    content: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<PostWire> for Post {
    type Error = PostValidationError;

    fn try_from(value: PostWire) -> Result<Self, Self::Error> {
        let post = Self {
            id: value.id,
            title: value.title,
            content: value.content,
            created_at: value.created_at,
            updated_at: value.updated_at,
        };
        post.validate()?;
        Ok(post)
    }
}

fn validate_title(title: &str) -> Result<(), PostValidationError> {
    let actual = title.chars().count();
    if actual > TITLE_MAX_CHARS {
        return Err(PostValidationError::TitleTooLong {
            max: TITLE_MAX_CHARS,
            actual,
        });
    }
    Ok(())
}
