//! Post use-case service.
//!
//! # Responsibility
//! - Provide the CRUD entry points callers hold instead of a global model.
//! - Delegate persistence to repository implementations.
//! - Emit metadata-only diagnostic events per operation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.
//! - Titles and contents are never written to logs.

use crate::model::post::{NewPost, Post, PostId};
use crate::repo::post_repo::{PostListQuery, PostRepository, RepoError, RepoResult};
use log::{debug, error, info, warn};

/// Use-case service wrapper for post CRUD operations.
pub struct PostService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> PostService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a post and returns it with its generated id.
    ///
    /// # Errors
    /// - `Validation` when the title exceeds its bound.
    /// - `StorageUnavailable` when SQLite fails.
    pub fn create(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> RepoResult<Post> {
        let request = NewPost::new(title, content);
        let result = self.repo.create_post(&request);
        match &result {
            Ok(post) => info!(
                "event=post_create module=service status=ok post_id={}",
                post.id
            ),
            Err(err) => log_failure("post_create", None, err),
        }
        result
    }

    /// Returns every stored post in creation order.
    pub fn fetch_all(&self) -> RepoResult<Vec<Post>> {
        self.list(&PostListQuery::default())
    }

    /// Returns one page of posts in creation order.
    pub fn list(&self, query: &PostListQuery) -> RepoResult<Vec<Post>> {
        let result = self.repo.list_posts(query);
        match &result {
            Ok(posts) => debug!(
                "event=post_list module=service status=ok count={} offset={}",
                posts.len(),
                query.offset
            ),
            Err(err) => log_failure("post_list", None, err),
        }
        result
    }

    /// Loads one post by id.
    pub fn fetch_by_id(&self, id: PostId) -> RepoResult<Post> {
        let result = self.repo.get_post(id);
        if let Err(err) = &result {
            log_failure("post_get", Some(id), err);
        }
        result
    }

    /// Persists the in-memory fields of a previously fetched post.
    ///
    /// Returns repository-level not-found or validation errors unchanged.
    pub fn update(&self, post: &Post) -> RepoResult<()> {
        let result = self.repo.update_post(post);
        match &result {
            Ok(()) => info!(
                "event=post_update module=service status=ok post_id={}",
                post.id
            ),
            Err(err) => log_failure("post_update", Some(post.id), err),
        }
        result
    }

    /// Deletes a previously fetched post.
    pub fn delete(&self, post: &Post) -> RepoResult<()> {
        self.destroy(post.id)
    }

    /// Deletes a post by id without loading it first.
    ///
    /// A repeated delete of the same id returns `NotFound`.
    pub fn destroy(&self, id: PostId) -> RepoResult<()> {
        let result = self.repo.delete_post(id);
        match &result {
            Ok(()) => info!("event=post_delete module=service status=ok post_id={id}"),
            Err(err) => log_failure("post_delete", Some(id), err),
        }
        result
    }

    /// Returns the number of stored posts.
    pub fn count(&self) -> RepoResult<u64> {
        self.repo.count_posts()
    }
}

fn log_failure(event: &str, id: Option<PostId>, err: &RepoError) {
    let post_id = id.map_or_else(|| "none".to_string(), |id| id.to_string());
    match err {
        RepoError::Validation(_) | RepoError::NotFound(_) => warn!(
            "event={event} module=service status=rejected post_id={post_id} error={err}"
        ),
        _ => error!(
            "event={event} module=service status=error post_id={post_id} error={err}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::PostService;
    use crate::db::DbError;
    use crate::model::post::{NewPost, Post, PostId};
    use crate::repo::post_repo::{PostListQuery, PostRepository, RepoError, RepoResult};

    struct OfflineRepository;

    fn offline() -> RepoError {
        RepoError::StorageUnavailable(DbError::Sqlite(rusqlite::Error::InvalidQuery))
    }

    impl PostRepository for OfflineRepository {
        fn create_post(&self, _post: &NewPost) -> RepoResult<Post> {
            Err(offline())
        }
        fn get_post(&self, _id: PostId) -> RepoResult<Post> {
            Err(offline())
        }
        fn list_posts(&self, _query: &PostListQuery) -> RepoResult<Vec<Post>> {
            Err(offline())
        }
        fn update_post(&self, _post: &Post) -> RepoResult<()> {
            Err(offline())
        }
        fn delete_post(&self, _id: PostId) -> RepoResult<()> {
            Err(offline())
        }
        fn count_posts(&self) -> RepoResult<u64> {
            Err(offline())
        }
    }

    #[test]
    fn storage_errors_propagate_unchanged() {
        let service = PostService::new(OfflineRepository);

        assert!(matches!(
            service.create("t", "c"),
            Err(RepoError::StorageUnavailable(_))
        ));
        assert!(matches!(
            service.fetch_all(),
            Err(RepoError::StorageUnavailable(_))
        ));
        assert!(matches!(
            service.destroy(1),
            Err(RepoError::StorageUnavailable(_))
        ));
    }
}
