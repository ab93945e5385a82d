//! Feed assembly: the global, group and profile listings.

use crate::domain::{Group, Post, User};
use crate::error::{DomainError, RepoError};
use crate::pagination::{Page, Paginator};
use crate::ports::{GroupRepository, PostRepository, PostScope, UserRepository};

/// Load one page of posts in `scope`, resolving `requested` leniently.
pub async fn fetch_page(
    posts: &dyn PostRepository,
    scope: PostScope,
    requested: Option<&str>,
) -> Result<Page<Post>, RepoError> {
    let paginator = Paginator::new(posts.count(scope).await?);
    let number = paginator.resolve(requested);
    let (offset, limit) = paginator.window(number);
    let items = posts.list(scope, offset, limit).await?;

    Ok(paginator.page(number, items))
}

/// Posts of the group identified by `slug`, alongside the group itself.
pub async fn group_feed(
    groups: &dyn GroupRepository,
    posts: &dyn PostRepository,
    slug: &str,
    requested: Option<&str>,
) -> Result<(Group, Page<Post>), DomainError> {
    let group = groups
        .find_by_slug(slug)
        .await?
        .ok_or_else(|| DomainError::not_found("group", slug))?;
    let page = fetch_page(posts, PostScope::Group(group.id), requested).await?;

    Ok((group, page))
}

/// Posts written by `username`, alongside the author.
pub async fn profile_feed(
    users: &dyn UserRepository,
    posts: &dyn PostRepository,
    username: &str,
    requested: Option<&str>,
) -> Result<(User, Page<Post>), DomainError> {
    let author = users
        .find_by_username(username)
        .await?
        .ok_or_else(|| DomainError::not_found("user", username))?;
    let page = fetch_page(posts, PostScope::Author(author.id), requested).await?;

    Ok((author, page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PostDraft;
    use crate::ports::BaseRepository;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    /// Vec-backed post store, enough to drive the feed functions.
    struct VecPosts(Vec<Post>);

    #[async_trait]
    impl BaseRepository<Post, Uuid> for VecPosts {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
            Ok(self.0.iter().find(|p| p.id == id).cloned())
        }

        async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
            Ok(entity)
        }

        async fn update(&self, entity: Post) -> Result<Post, RepoError> {
            Ok(entity)
        }
    }

    #[async_trait]
    impl PostRepository for VecPosts {
        async fn count(&self, scope: PostScope) -> Result<u64, RepoError> {
            Ok(self.0.iter().filter(|p| scope.matches(p)).count() as u64)
        }

        async fn list(
            &self,
            scope: PostScope,
            offset: u64,
            limit: u64,
        ) -> Result<Vec<Post>, RepoError> {
            let mut matching: Vec<Post> =
                self.0.iter().filter(|p| scope.matches(p)).cloned().collect();
            matching.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
            Ok(matching
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect())
        }
    }

    fn posts(author: Uuid, group: Option<Uuid>, n: i64) -> Vec<Post> {
        let start = Utc::now();
        (0..n)
            .map(|i| {
                let mut post = Post::new(
                    author,
                    PostDraft {
                        text: format!("post {i}"),
                        group_id: group,
                        image: None,
                    },
                );
                post.pub_date = start + Duration::seconds(i);
                post
            })
            .collect()
    }

    #[tokio::test]
    async fn test_pages_of_thirteen() {
        let repo = VecPosts(posts(Uuid::new_v4(), None, 13));

        let first = fetch_page(&repo, PostScope::All, None).await.unwrap();
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.num_pages, 2);

        let second = fetch_page(&repo, PostScope::All, Some("2")).await.unwrap();
        assert_eq!(second.items.len(), 3);
        assert_eq!(second.number, 2);
    }

    #[tokio::test]
    async fn test_newest_first() {
        let repo = VecPosts(posts(Uuid::new_v4(), None, 5));
        let page = fetch_page(&repo, PostScope::All, None).await.unwrap();
        assert!(page.items.windows(2).all(|w| w[0].pub_date >= w[1].pub_date));
        assert_eq!(page.items[0].text, "post 4");
    }

    #[tokio::test]
    async fn test_scope_filters() {
        let group = Uuid::new_v4();
        let author = Uuid::new_v4();
        let mut all = posts(author, Some(group), 3);
        all.extend(posts(Uuid::new_v4(), None, 4));
        let repo = VecPosts(all);

        let grouped = fetch_page(&repo, PostScope::Group(group), None).await.unwrap();
        assert_eq!(grouped.count, 3);
        let authored = fetch_page(&repo, PostScope::Author(author), None).await.unwrap();
        assert_eq!(authored.count, 3);
        let everything = fetch_page(&repo, PostScope::All, None).await.unwrap();
        assert_eq!(everything.count, 7);
    }

    #[tokio::test]
    async fn test_page_past_end_serves_last() {
        let repo = VecPosts(posts(Uuid::new_v4(), None, 13));
        let page = fetch_page(&repo, PostScope::All, Some("7")).await.unwrap();
        assert_eq!(page.number, 2);
        assert_eq!(page.items.len(), 3);
    }
}
