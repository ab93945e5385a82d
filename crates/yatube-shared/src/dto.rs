//! Data Transfer Objects - request/response types for the HTTP surface.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `?next=` carried through the login flow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// `?page=` on feeds. Kept as text so junk values fall back to page 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub created_at: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Login page data: where the user goes after signing in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginPageResponse {
    pub next: Option<String>,
}

/// Post create/edit form fields, submitted url-encoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostFormData {
    #[serde(default)]
    pub text: String,
    /// Group id, or empty for none.
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// A group offered in the post form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupChoice {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub text: String,
    pub pub_date: String,
    pub author: AuthorResponse,
    pub group: Option<GroupRef>,
    pub image: Option<String>,
}

/// Group reference embedded in a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRef {
    pub title: String,
    pub slug: String,
}

/// One page of posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse {
    pub posts: Vec<PostResponse>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    pub page: PageResponse,
}

/// `GET /group/{slug}/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupFeedResponse {
    pub group: GroupResponse,
    pub page: PageResponse,
}

/// `GET /profile/{username}/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub author: AuthorResponse,
    pub posts_count: u64,
    pub page: PageResponse,
}

/// `GET /posts/{id}/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub author_posts_count: u64,
}

/// Create/edit form as shown to the author, with any field errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostFormResponse {
    pub is_edit: bool,
    pub form: PostFormData,
    pub errors: BTreeMap<String, Vec<String>>,
    pub groups: Vec<GroupChoice>,
    /// The post being edited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<PostResponse>,
}
