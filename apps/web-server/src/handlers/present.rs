//! Domain to DTO conversion for responses.

use std::collections::{BTreeSet, HashMap};

use uuid::Uuid;

use yatube_core::domain::{Group, Post, PostDraft, User};
use yatube_core::pagination::Page;
use yatube_core::ports::{GroupRepository, UserRepository};
use yatube_shared::dto::{
    AuthorResponse, GroupChoice, GroupRef, GroupResponse, PageResponse, PostFormData,
    PostResponse,
};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

pub fn author(user: &User) -> AuthorResponse {
    AuthorResponse {
        id: user.id.to_string(),
        username: user.username.clone(),
    }
}

pub fn group(group: &Group) -> GroupResponse {
    GroupResponse {
        id: group.id.to_string(),
        title: group.title.clone(),
        slug: group.slug.clone(),
        description: group.description.clone(),
    }
}

pub fn group_choices(groups: &[Group]) -> Vec<GroupChoice> {
    groups
        .iter()
        .map(|g| GroupChoice {
            id: g.id.to_string(),
            title: g.to_string(),
        })
        .collect()
}

/// Form fields prefilled from a post.
pub fn form_from_draft(draft: PostDraft) -> PostFormData {
    PostFormData {
        text: draft.text,
        group: draft.group_id.map(|id| id.to_string()),
        image: draft.image,
    }
}

fn post(
    post: Post,
    authors: &HashMap<Uuid, User>,
    groups: &HashMap<Uuid, Group>,
) -> AppResult<PostResponse> {
    let author = authors
        .get(&post.author_id)
        .ok_or_else(|| AppError::Internal(format!("author of post {} is missing", post.id)))?;
    let group = post.group_id.and_then(|id| groups.get(&id)).map(|g| GroupRef {
        title: g.title.clone(),
        slug: g.slug.clone(),
    });

    Ok(PostResponse {
        id: post.id.to_string(),
        text: post.text,
        pub_date: post.pub_date.to_rfc3339(),
        author: self::author(author),
        group,
        image: post.image,
    })
}

/// Resolve authors and groups for a batch of posts in two lookups.
pub async fn posts(state: &AppState, posts: Vec<Post>) -> AppResult<Vec<PostResponse>> {
    let author_ids: Vec<Uuid> = posts
        .iter()
        .map(|p| p.author_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let group_ids: Vec<Uuid> = posts
        .iter()
        .filter_map(|p| p.group_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let authors: HashMap<Uuid, User> = state
        .users
        .find_by_ids(&author_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let groups: HashMap<Uuid, Group> = state
        .groups
        .find_by_ids(&group_ids)
        .await?
        .into_iter()
        .map(|g| (g.id, g))
        .collect();

    posts
        .into_iter()
        .map(|p| post(p, &authors, &groups))
        .collect()
}

pub async fn single_post(state: &AppState, p: Post) -> AppResult<PostResponse> {
    let mut converted = posts(state, vec![p]).await?;
    converted
        .pop()
        .ok_or_else(|| AppError::Internal("post vanished during conversion".to_string()))
}

pub async fn page(state: &AppState, page: Page<Post>) -> AppResult<PageResponse> {
    let has_next = page.has_next();
    let has_previous = page.has_previous();
    let (number, num_pages, count) = (page.number, page.num_pages, page.count);

    Ok(PageResponse {
        posts: posts(state, page.items).await?,
        number,
        num_pages,
        count,
        has_next,
        has_previous,
    })
}
