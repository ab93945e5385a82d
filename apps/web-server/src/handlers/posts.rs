//! Feed, detail and authoring handlers.

use std::collections::BTreeMap;

use actix_web::{HttpRequest, HttpResponse, web};
use uuid::Uuid;

use yatube_core::access::{self, Gate};
use yatube_core::domain::{Post, User};
use yatube_core::feed;
use yatube_core::ports::{BaseRepository, GroupRepository, PostRepository, PostScope};
use yatube_core::validation::PostInput;
use yatube_shared::dto::{
    GroupFeedResponse, IndexResponse, PageQuery, PostDetailResponse, PostFormData,
    PostFormResponse, ProfileResponse,
};

use super::{present, redirect};
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Resolve the request identity to a live user. Tokens of deleted users count
/// as anonymous.
async fn current_user(state: &AppState, identity: OptionalIdentity) -> AppResult<Option<User>> {
    let Some(identity) = identity.0 else {
        return Ok(None);
    };

    let user = state.users.find_by_id(identity.user_id).await?;
    if user.is_none() {
        tracing::debug!(username = %identity.username, "Token refers to a deleted user");
    }
    Ok(user)
}

async fn load_post(state: &AppState, raw_id: &str) -> AppResult<Post> {
    let not_found = || AppError::NotFound(format!("post '{}' not found", raw_id));
    let id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;

    state.posts.find_by_id(id).await?.ok_or_else(not_found)
}

async fn form_response(
    state: &AppState,
    form: PostFormData,
    errors: BTreeMap<String, Vec<String>>,
    editing: Option<Post>,
) -> AppResult<HttpResponse> {
    let groups = state.groups.list_all().await?;
    let post = match editing {
        Some(post) => Some(present::single_post(state, post).await?),
        None => None,
    };

    Ok(HttpResponse::Ok().json(PostFormResponse {
        is_edit: post.is_some(),
        form,
        errors,
        groups: present::group_choices(&groups),
        post,
    }))
}

fn into_input(form: PostFormData) -> PostInput {
    PostInput {
        text: form.text,
        group: form.group,
        image: form.image,
    }
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = feed::fetch_page(state.posts.as_ref(), PostScope::All, query.page.as_deref()).await?;

    Ok(HttpResponse::Ok().json(IndexResponse {
        page: present::page(&state, page).await?,
    }))
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let (group, page) = feed::group_feed(
        state.groups.as_ref(),
        state.posts.as_ref(),
        &path,
        query.page.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(GroupFeedResponse {
        group: present::group(&group),
        page: present::page(&state, page).await?,
    }))
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let (author, page) = feed::profile_feed(
        state.users.as_ref(),
        state.posts.as_ref(),
        &path,
        query.page.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        author: present::author(&author),
        posts_count: page.count,
        page: present::page(&state, page).await?,
    }))
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = load_post(&state, &path).await?;
    let author_posts_count = state.posts.count(PostScope::Author(post.author_id)).await?;

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post: present::single_post(&state, post).await?,
        author_posts_count,
    }))
}

/// GET /create/
pub async fn post_create_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let user = current_user(&state, identity).await?;
    if access::create_gate(user.map(|u| u.id)) != Gate::Allow {
        return Ok(redirect(access::login_redirect(req.path())));
    }

    form_response(&state, PostFormData::default(), BTreeMap::new(), None).await
}

/// POST /create/
pub async fn post_create(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    form: Option<web::Form<PostFormData>>,
) -> AppResult<HttpResponse> {
    let Some(user) = current_user(&state, identity).await? else {
        return Ok(redirect(access::login_redirect(req.path())));
    };

    let form = form.map(web::Form::into_inner).unwrap_or_default();
    let groups = state.groups.list_all().await?;

    let draft = match into_input(form.clone()).clean(&groups) {
        Ok(draft) => draft,
        Err(errors) => {
            tracing::debug!(%errors, "Rejected post submission");
            return form_response(&state, form, errors.into_fields(), None).await;
        }
    };

    let post = state.posts.insert(Post::new(user.id, draft)).await?;
    tracing::info!(post_id = %post.id, author = %user.username, "Post created");

    Ok(redirect(access::profile_url(&user.username)))
}

/// Shared gatekeeping for both edit endpoints: `Ok(post)` when the viewer is
/// the author, otherwise the redirect to send back.
async fn editable_post(
    req: &HttpRequest,
    state: &AppState,
    identity: OptionalIdentity,
    raw_id: &str,
) -> AppResult<Result<Post, HttpResponse>> {
    let user = current_user(state, identity).await?;
    if user.is_none() {
        return Ok(Err(redirect(access::login_redirect(req.path()))));
    }

    let post = load_post(state, raw_id).await?;
    match access::edit_gate(user.map(|u| u.id), &post) {
        Gate::Allow => Ok(Ok(post)),
        Gate::Login => Ok(Err(redirect(access::login_redirect(req.path())))),
        Gate::ViewPost(id) => Ok(Err(redirect(access::post_url(id)))),
    }
}

/// GET /posts/{post_id}/edit/
pub async fn post_edit_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = match editable_post(&req, &state, identity, &path).await? {
        Ok(post) => post,
        Err(response) => return Ok(response),
    };

    let form = present::form_from_draft(post.draft());
    form_response(&state, form, BTreeMap::new(), Some(post)).await
}

/// POST /posts/{post_id}/edit/
pub async fn post_edit(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    form: Option<web::Form<PostFormData>>,
) -> AppResult<HttpResponse> {
    let mut post = match editable_post(&req, &state, identity, &path).await? {
        Ok(post) => post,
        Err(response) => return Ok(response),
    };

    let form = form.map(web::Form::into_inner).unwrap_or_default();
    let groups = state.groups.list_all().await?;

    let draft = match into_input(form.clone()).clean(&groups) {
        Ok(draft) => draft,
        Err(errors) => {
            tracing::debug!(post_id = %post.id, %errors, "Rejected post edit");
            return form_response(&state, form, errors.into_fields(), Some(post)).await;
        }
    };

    post.apply(draft);
    let post = state.posts.update(post).await?;
    tracing::info!(post_id = %post.id, "Post edited");

    Ok(redirect(access::post_url(post.id)))
}
