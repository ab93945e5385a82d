//! End-to-end handler tests against the in-memory store.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{Duration, Utc};
use uuid::Uuid;

use yatube_core::access::post_edit_url;
use yatube_core::domain::{Group, Post, PostDraft, User};
use yatube_core::ports::{
    BaseRepository, GroupRepository, PostRepository, PostScope, UserRepository,
};
use yatube_core::validation::{INVALID_CHOICE_MESSAGE, REQUIRED_MESSAGE};
use yatube_infra::{InMemoryStore, JwtConfig, JwtTokenService};
use yatube_shared::dto::{
    GroupFeedResponse, IndexResponse, LoginRequest, PostDetailResponse, PostFormResponse,
    ProfileResponse, SignupRequest, UserResponse,
};

use super::configure_routes;
use crate::middleware::auth::TOKEN_COOKIE;
use crate::state::AppState;

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

fn fixture() -> (InMemoryStore, AppState) {
    let store = InMemoryStore::new();
    let tokens = Arc::new(JwtTokenService::new(JwtConfig {
        secret: "test-secret".to_string(),
        expiration_hours: 1,
        issuer: "yatube".to_string(),
    }));
    let state = AppState::in_memory(&store, tokens);
    (store, state)
}

async fn user(store: &InMemoryStore, username: &str) -> User {
    store
        .users()
        .insert(User::new(username.to_string(), "not-a-hash".to_string()))
        .await
        .unwrap()
}

async fn group(store: &InMemoryStore, slug: &str) -> Group {
    store
        .groups()
        .insert(Group::new(format!("Group {slug}"), slug, "Test group"))
        .await
        .unwrap()
}

/// `count` posts, oldest first, one minute apart.
async fn seed_posts(
    store: &InMemoryStore,
    author: &User,
    group: Option<&Group>,
    count: usize,
) -> Vec<Post> {
    let base = Utc::now() - Duration::hours(1);
    let mut posts = Vec::with_capacity(count);
    for i in 0..count {
        let mut post = Post::new(
            author.id,
            PostDraft {
                text: format!("Test post number {i}"),
                group_id: group.map(|g| g.id),
                image: None,
            },
        );
        post.pub_date = base + Duration::minutes(i as i64);
        posts.push(store.posts().insert(post).await.unwrap());
    }
    posts
}

fn bearer(state: &AppState, user: &User) -> (header::HeaderName, String) {
    let token = state
        .tokens
        .generate_token(user.id, &user.username)
        .unwrap();
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

fn location<B>(res: &ServiceResponse<B>) -> &str {
    res.headers()
        .get(header::LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
}

async fn post_count(store: &InMemoryStore) -> u64 {
    store.posts().count(PostScope::All).await.unwrap()
}

// Feeds

#[actix_web::test]
async fn test_index_paginates_by_ten() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    seed_posts(&store, &author, None, 13).await;
    let app = app!(state);

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: IndexResponse = test::read_body_json(res).await;
    assert_eq!(body.page.posts.len(), 10);
    assert_eq!(body.page.num_pages, 2);
    assert_eq!(body.page.count, 13);
    assert!(body.page.has_next);
    assert!(!body.page.has_previous);

    let req = test::TestRequest::get().uri("/?page=2").to_request();
    let body: IndexResponse = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body.page.posts.len(), 3);
    assert_eq!(body.page.number, 2);
}

#[actix_web::test]
async fn test_index_newest_first() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    let posts = seed_posts(&store, &author, None, 3).await;
    let app = app!(state);

    let req = test::TestRequest::get().uri("/").to_request();
    let body: IndexResponse = test::read_body_json(test::call_service(&app, req).await).await;

    let ids: Vec<String> = body.page.posts.iter().map(|p| p.id.clone()).collect();
    let expected: Vec<String> = posts.iter().rev().map(|p| p.id.to_string()).collect();
    assert_eq!(ids, expected);
    assert_eq!(body.page.posts[0].author.username, "leo");
}

#[actix_web::test]
async fn test_page_param_is_lenient() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    seed_posts(&store, &author, None, 13).await;
    let app = app!(state);

    let req = test::TestRequest::get().uri("/?page=abc").to_request();
    let body: IndexResponse = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body.page.number, 1);

    let req = test::TestRequest::get().uri("/?page=99").to_request();
    let body: IndexResponse = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body.page.number, 2);
    assert_eq!(body.page.posts.len(), 3);

    let req = test::TestRequest::get()
        .uri("/?page=99999999999999999999")
        .to_request();
    let body: IndexResponse = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body.page.number, 2);
}

#[actix_web::test]
async fn test_empty_index_has_one_page() {
    let (_store, state) = fixture();
    let app = app!(state);

    let req = test::TestRequest::get().uri("/").to_request();
    let body: IndexResponse = test::read_body_json(test::call_service(&app, req).await).await;
    assert!(body.page.posts.is_empty());
    assert_eq!(body.page.number, 1);
    assert_eq!(body.page.num_pages, 1);
}

#[actix_web::test]
async fn test_group_feed_only_shows_group_posts() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    let cats = group(&store, "cats").await;
    let dogs = group(&store, "dogs").await;
    seed_posts(&store, &author, Some(&cats), 13).await;
    seed_posts(&store, &author, Some(&dogs), 2).await;
    let app = app!(state);

    let req = test::TestRequest::get().uri("/group/cats/").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: GroupFeedResponse = test::read_body_json(res).await;
    assert_eq!(body.group.slug, "cats");
    assert_eq!(body.page.count, 13);
    assert_eq!(body.page.posts.len(), 10);
    assert!(
        body.page
            .posts
            .iter()
            .all(|p| p.group.as_ref().map(|g| g.slug.as_str()) == Some("cats"))
    );

    let req = test::TestRequest::get().uri("/group/cats/?page=2").to_request();
    let body: GroupFeedResponse = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body.page.posts.len(), 3);
}

#[actix_web::test]
async fn test_unknown_group_is_404() {
    let (_store, state) = fixture();
    let app = app!(state);

    let req = test::TestRequest::get().uri("/group/nope/").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_profile_feed() {
    let (store, state) = fixture();
    let leo = user(&store, "leo").await;
    let other = user(&store, "other").await;
    seed_posts(&store, &leo, None, 13).await;
    seed_posts(&store, &other, None, 1).await;
    let app = app!(state);

    let req = test::TestRequest::get().uri("/profile/leo/").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: ProfileResponse = test::read_body_json(res).await;
    assert_eq!(body.author.username, "leo");
    assert_eq!(body.posts_count, 13);
    assert_eq!(body.page.posts.len(), 10);
    assert!(body.page.posts.iter().all(|p| p.author.username == "leo"));

    let req = test::TestRequest::get().uri("/profile/leo/?page=2").to_request();
    let body: ProfileResponse = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body.page.posts.len(), 3);

    let req = test::TestRequest::get().uri("/profile/ghost/").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_post_detail() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    let cats = group(&store, "cats").await;
    let posts = seed_posts(&store, &author, Some(&cats), 2).await;
    let app = app!(state);

    let uri = format!("/posts/{}/", posts[0].id);
    let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: PostDetailResponse = test::read_body_json(res).await;
    assert_eq!(body.post.text, posts[0].text);
    assert_eq!(body.post.group.unwrap().slug, "cats");
    assert_eq!(body.author_posts_count, 2);
}

#[actix_web::test]
async fn test_post_detail_missing_is_404() {
    let (_store, state) = fixture();
    let app = app!(state);

    for uri in [format!("/posts/{}/", Uuid::new_v4()), "/posts/42/".to_string()] {
        let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

// Create

#[actix_web::test]
async fn test_anonymous_create_redirects_to_login() {
    let (_store, state) = fixture();
    let app = app!(state);

    let res = test::call_service(&app, test::TestRequest::get().uri("/create/").to_request()).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/auth/login/?next=/create/");
}

#[actix_web::test]
async fn test_anonymous_create_submit_creates_nothing() {
    let (store, state) = fixture();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/create/")
        .set_form([("text", "sneaky")])
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/auth/login/?next=/create/");
    assert_eq!(post_count(&store).await, 0);
}

#[actix_web::test]
async fn test_create_form_lists_groups() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    group(&store, "cats").await;
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/create/")
        .insert_header(bearer(&state, &author))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: PostFormResponse = test::read_body_json(res).await;
    assert!(!body.is_edit);
    assert!(body.errors.is_empty());
    assert_eq!(body.groups.len(), 1);
    assert_eq!(body.groups[0].title, "Group cats");
}

#[actix_web::test]
async fn test_create_redirects_to_profile() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    let cats = group(&store, "cats").await;
    let app = app!(state);
    let before = post_count(&store).await;

    let group_id = cats.id.to_string();
    let req = test::TestRequest::post()
        .uri("/create/")
        .insert_header(bearer(&state, &author))
        .set_form([
            ("text", "Brand new post"),
            ("group", group_id.as_str()),
            ("image", "posts/cat.png"),
        ])
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/profile/leo/");
    assert_eq!(post_count(&store).await, before + 1);

    let created = store
        .posts()
        .list(PostScope::Author(author.id), 0, 1)
        .await
        .unwrap()
        .remove(0);
    assert_eq!(created.text, "Brand new post");
    assert_eq!(created.group_id, Some(cats.id));
    assert_eq!(created.image.as_deref(), Some("posts/cat.png"));
}

#[actix_web::test]
async fn test_create_without_group() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/create/")
        .insert_header(bearer(&state, &author))
        .set_form([("text", "No group"), ("group", "")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);

    let created = store.posts().list(PostScope::All, 0, 1).await.unwrap();
    assert_eq!(created[0].group_id, None);
}

#[actix_web::test]
async fn test_create_empty_text_shows_errors() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/create/")
        .insert_header(bearer(&state, &author))
        .set_form([("text", "")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: PostFormResponse = test::read_body_json(res).await;
    assert_eq!(body.errors["text"], vec![REQUIRED_MESSAGE.to_string()]);
    assert_eq!(post_count(&store).await, 0);
}

#[actix_web::test]
async fn test_create_unknown_group_shows_errors() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    let app = app!(state);

    let missing = Uuid::new_v4().to_string();
    let req = test::TestRequest::post()
        .uri("/create/")
        .insert_header(bearer(&state, &author))
        .set_form([("text", "hello"), ("group", missing.as_str())])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: PostFormResponse = test::read_body_json(res).await;
    assert_eq!(body.errors["group"], vec![INVALID_CHOICE_MESSAGE.to_string()]);
    assert_eq!(body.form.text, "hello");
    assert_eq!(post_count(&store).await, 0);
}

#[actix_web::test]
async fn test_cookie_identity_is_accepted() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    let app = app!(state);

    let token = state
        .tokens
        .generate_token(author.id, &author.username)
        .unwrap();
    let req = test::TestRequest::get()
        .uri("/create/")
        .cookie(Cookie::new(TOKEN_COOKIE, token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_token_of_deleted_user_is_anonymous() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    let auth = bearer(&state, &author);
    store.users().delete(author.id).await.unwrap();
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/create/")
        .insert_header(auth)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/auth/login/?next=/create/");
}

// Edit

#[actix_web::test]
async fn test_author_edit_updates_post() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    let cats = group(&store, "cats").await;
    let post = seed_posts(&store, &author, None, 1).await.remove(0);
    let app = app!(state);
    let before = post_count(&store).await;

    let group_id = cats.id.to_string();
    let req = test::TestRequest::post()
        .uri(&post_edit_url(post.id))
        .insert_header(bearer(&state, &author))
        .set_form([("text", "Edited text"), ("group", group_id.as_str())])
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/posts/{}/", post.id));
    assert_eq!(post_count(&store).await, before);

    let stored = store.posts().find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Edited text");
    assert_eq!(stored.group_id, Some(cats.id));
    assert_eq!(stored.pub_date, post.pub_date);
    assert_eq!(stored.author_id, author.id);
}

#[actix_web::test]
async fn test_text_only_edit_keeps_image() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    let post = store
        .posts()
        .insert(Post::new(
            author.id,
            PostDraft {
                text: "With a picture".to_string(),
                group_id: None,
                image: Some("posts/cat.png".to_string()),
            },
        ))
        .await
        .unwrap();
    let app = app!(state);

    for form in [vec![("text", "Edited")], vec![("text", "Edited again"), ("image", "")]] {
        let req = test::TestRequest::post()
            .uri(&post_edit_url(post.id))
            .insert_header(bearer(&state, &author))
            .set_form(form)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FOUND);
    }

    let stored = store.posts().find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Edited again");
    assert_eq!(stored.image.as_deref(), Some("posts/cat.png"));

    let req = test::TestRequest::post()
        .uri(&post_edit_url(post.id))
        .insert_header(bearer(&state, &author))
        .set_form([("text", "New picture"), ("image", "posts/dog.png")])
        .to_request();
    test::call_service(&app, req).await;

    let stored = store.posts().find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.image.as_deref(), Some("posts/dog.png"));
}

#[actix_web::test]
async fn test_edit_form_is_prefilled() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    let post = seed_posts(&store, &author, None, 1).await.remove(0);
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri(&post_edit_url(post.id))
        .insert_header(bearer(&state, &author))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: PostFormResponse = test::read_body_json(res).await;
    assert!(body.is_edit);
    assert_eq!(body.form.text, post.text);
    assert_eq!(body.post.unwrap().id, post.id.to_string());
}

#[actix_web::test]
async fn test_non_author_edit_redirects_to_detail() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    let intruder = user(&store, "intruder").await;
    let post = seed_posts(&store, &author, None, 1).await.remove(0);
    let app = app!(state);

    let uri = post_edit_url(post.id);
    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&state, &intruder))
        .set_form([("text", "Hijacked")])
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/posts/{}/", post.id));
    let stored = store.posts().find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored, post);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&state, &intruder))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/posts/{}/", post.id));
}

#[actix_web::test]
async fn test_anonymous_edit_redirects_to_login() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    let post = seed_posts(&store, &author, None, 1).await.remove(0);
    let app = app!(state);

    let uri = post_edit_url(post.id);
    let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/auth/login/?next={uri}"));
}

#[actix_web::test]
async fn test_edit_with_empty_text_keeps_post() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    let post = seed_posts(&store, &author, None, 1).await.remove(0);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri(&post_edit_url(post.id))
        .insert_header(bearer(&state, &author))
        .set_form([("text", "")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: PostFormResponse = test::read_body_json(res).await;
    assert!(body.is_edit);
    assert!(body.errors.contains_key("text"));
    let stored = store.posts().find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, post.text);
}

#[actix_web::test]
async fn test_edit_missing_post_is_404_for_authenticated() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri(&post_edit_url(Uuid::new_v4()))
        .insert_header(bearer(&state, &author))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

// Referential rules as seen through the feeds

#[actix_web::test]
async fn test_group_deletion_keeps_posts() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    let cats = group(&store, "cats").await;
    let post = seed_posts(&store, &author, Some(&cats), 1).await.remove(0);
    store.groups().delete(cats.id).await.unwrap();
    let app = app!(state);

    let uri = format!("/posts/{}/", post.id);
    let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: PostDetailResponse = test::read_body_json(res).await;
    assert!(body.post.group.is_none());
}

#[actix_web::test]
async fn test_author_deletion_removes_posts() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    let other = user(&store, "other").await;
    seed_posts(&store, &author, None, 3).await;
    seed_posts(&store, &other, None, 1).await;
    store.users().delete(author.id).await.unwrap();
    let app = app!(state);

    let req = test::TestRequest::get().uri("/").to_request();
    let body: IndexResponse = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body.page.count, 1);
    assert_eq!(body.page.posts[0].author.username, "other");
}

// Misc

#[actix_web::test]
async fn test_unexisting_page_is_404() {
    let (store, state) = fixture();
    let author = user(&store, "leo").await;
    let app = app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/unexisting_page/").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/unexisting_page/")
        .insert_header(bearer(&state, &author))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_health() {
    let (_store, state) = fixture();
    let app = app!(state);

    let res = test::call_service(&app, test::TestRequest::get().uri("/health/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
}

// Auth

#[actix_web::test]
async fn test_signup_then_login_flow() {
    let (_store, state) = fixture();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_json(SignupRequest {
            username: "leo".to_string(),
            password: "correct-horse".to_string(),
        })
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(res.response().cookies().any(|c| c.name() == TOKEN_COOKIE));

    // Duplicate username
    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_json(SignupRequest {
            username: "leo".to_string(),
            password: "another-pass".to_string(),
        })
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Wrong password
    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_json(LoginRequest {
            username: "leo".to_string(),
            password: "wrong-password".to_string(),
        })
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Login follows ?next= and hands out the cookie
    let req = test::TestRequest::post()
        .uri("/auth/login/?next=/create/")
        .set_json(LoginRequest {
            username: "leo".to_string(),
            password: "correct-horse".to_string(),
        })
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/create/");
    let token = res
        .response()
        .cookies()
        .find(|c| c.name() == TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .unwrap();

    let req = test::TestRequest::get()
        .uri("/auth/me/")
        .cookie(Cookie::new(TOKEN_COOKIE, token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let me: UserResponse = test::read_body_json(res).await;
    assert_eq!(me.username, "leo");
}

#[actix_web::test]
async fn test_signup_rejects_bad_input() {
    let (_store, state) = fixture();
    let app = app!(state);

    for (username, password) in [("leo", "short"), ("bad name", "long-enough"), ("", "long-enough")] {
        let req = test::TestRequest::post()
            .uri("/auth/signup/")
            .set_json(SignupRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{username:?}");
    }

    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_me_requires_identity() {
    let (_store, state) = fixture();
    let app = app!(state);

    let res = test::call_service(&app, test::TestRequest::get().uri("/auth/me/").to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_login_page_drops_foreign_next() {
    let (_store, state) = fixture();
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/auth/login/?next=//evil.example/")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(res).await;
    assert!(body["next"].is_null());
}

#[actix_web::test]
async fn test_logout_clears_cookie() {
    let (_store, state) = fixture();
    let app = app!(state);

    let res = test::call_service(&app, test::TestRequest::post().uri("/auth/logout/").to_request()).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/");
    let cookie = res
        .response()
        .cookies()
        .find(|c| c.name() == TOKEN_COOKIE)
        .unwrap();
    assert_eq!(cookie.value(), "");
}

#[cfg(feature = "rate-limit")]
#[actix_web::test]
async fn test_auth_scope_is_rate_limited() {
    use yatube_infra::{InMemoryRateLimiter, RateLimitConfig};

    let (_store, mut state) = fixture();
    state.rate_limiter = Some(Arc::new(InMemoryRateLimiter::new(RateLimitConfig {
        max_requests: 1,
        window: std::time::Duration::from_secs(60),
    })));
    let app = app!(state);

    let res = test::call_service(&app, test::TestRequest::get().uri("/auth/login/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(&app, test::TestRequest::get().uri("/auth/login/").to_request()).await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(res.headers().contains_key(header::RETRY_AFTER));

    // Feeds are not limited
    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
}
