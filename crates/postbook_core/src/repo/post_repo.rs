//! Post repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the canonical `posts` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate input before any SQL mutation.
//! - Identifiers and timestamps are assigned by SQLite, never by callers.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Missing rows surface as `RepoError::NotFound`, never as empty success.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::post::{NewPost, Post, PostId, PostValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const POSTS_TABLE: &str = "posts";
const POSTS_REQUIRED_COLUMNS: &[&str] = &["id", "title", "content", "created_at", "updated_at"];

const POST_COLUMNS_SQL: &str = "id, title, content, created_at, updated_at";
const NOW_MS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for post persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// A field constraint was violated; nothing was written.
    Validation(PostValidationError),
    /// No stored post has this identifier.
    NotFound(PostId),
    /// The storage engine failed or could not be reached.
    StorageUnavailable(DbError),
    /// A stored row breaks model invariants.
    InvalidData(String),
    /// Connection schema is behind what this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation failed: {err}"),
            Self::NotFound(id) => write!(f, "post not found: {id}"),
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted post data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind required {expected_version}; open it with open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::StorageUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PostValidationError> for RepoError {
    fn from(value: PostValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::StorageUnavailable(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::StorageUnavailable(DbError::Sqlite(value))
    }
}

/// Paging options for listing posts.
///
/// Results are always ordered by ascending id, i.e. creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostListQuery {
    /// Maximum rows to return; `None` means no limit.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

/// Repository interface for post CRUD operations.
pub trait PostRepository {
    /// Inserts a post and returns it with storage-assigned id and timestamps.
    fn create_post(&self, post: &NewPost) -> RepoResult<Post>;
    /// Loads one post by id.
    fn get_post(&self, id: PostId) -> RepoResult<Post>;
    /// Returns a snapshot of posts matching the paging options.
    fn list_posts(&self, query: &PostListQuery) -> RepoResult<Vec<Post>>;
    /// Writes `title` and `content` back for `post.id`.
    fn update_post(&self, post: &Post) -> RepoResult<()>;
    /// Hard-deletes one post by id.
    fn delete_post(&self, id: PostId) -> RepoResult<()>;
    /// Returns the number of stored posts.
    fn count_posts(&self) -> RepoResult<u64>;
}

/// SQLite-backed post repository.
pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    /// Wraps a connection after checking it carries the expected schema.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema was
    ///   altered outside this crate.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema(conn)?;
        Ok(Self { conn })
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn create_post(&self, post: &NewPost) -> RepoResult<Post> {
        post.validate()?;

        let mut stmt = self.conn.prepare(&format!(
            "INSERT INTO posts (title, content)
             VALUES (?1, ?2)
             RETURNING {POST_COLUMNS_SQL};"
        ))?;
        let mut rows = stmt.query(params![post.title.as_str(), post.content.as_str()])?;
        match rows.next()? {
            Some(row) => parse_post_row(row),
            None => Err(RepoError::InvalidData("insert returned no row".to_string())),
        }
    }

    fn get_post(&self, id: PostId) -> RepoResult<Post> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {POST_COLUMNS_SQL} FROM posts WHERE id = ?1;"
        ))?;

        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => parse_post_row(row),
            None => Err(RepoError::NotFound(id)),
        }
    }

    fn list_posts(&self, query: &PostListQuery) -> RepoResult<Vec<Post>> {
        let mut sql = format!("SELECT {POST_COLUMNS_SQL} FROM posts ORDER BY id ASC");
        let mut bind_values: Vec<Value> = Vec::new();

        match (query.limit, query.offset) {
            (Some(limit), offset) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                bind_values.push(Value::Integer(i64::from(limit)));
                bind_values.push(Value::Integer(i64::from(offset)));
            }
            (None, 0) => {}
            (None, offset) => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                bind_values.push(Value::Integer(i64::from(offset)));
            }
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            posts.push(parse_post_row(row)?);
        }

        Ok(posts)
    }

    fn update_post(&self, post: &Post) -> RepoResult<()> {
        post.validate()?;

        let changed = self.conn.execute(
            &format!(
                "UPDATE posts
                 SET
                    title = ?1,
                    content = ?2,
                    updated_at = {NOW_MS_SQL}
                 WHERE id = ?3;"
            ),
            params![post.title.as_str(), post.content.as_str(), post.id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(post.id));
        }

        Ok(())
    }

    fn delete_post(&self, id: PostId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM posts WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn count_posts(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM posts;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative post count `{count}`")))
    }
}

fn ensure_schema(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [POSTS_TABLE],
        |row| row.get(0),
    )?;
    if !table_exists {
        return Err(RepoError::MissingRequiredTable(POSTS_TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([POSTS_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(missing) = POSTS_REQUIRED_COLUMNS
        .iter()
        .find(|required| !columns.iter().any(|column| column.as_str() == **required))
    {
        return Err(RepoError::MissingRequiredColumn {
            table: POSTS_TABLE,
            column: *missing,
        });
    }

    Ok(())
}

fn parse_post_row(row: &Row<'_>) -> RepoResult<Post> {
    let post = Post {
        id: row.get("id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    post.validate()
        .map_err(|err| RepoError::InvalidData(format!("post {}: {err}", post.id)))?;
    Ok(post)
}
