//! Authentication handlers.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpResponse, http::header, web};

use yatube_core::domain::User;
use yatube_core::ports::{BaseRepository, UserRepository};
use yatube_shared::ApiResponse;
use yatube_shared::dto::{
    AuthResponse, LoginPageResponse, LoginRequest, NextQuery, SignupRequest, UserResponse,
};

use crate::middleware::auth::{Identity, TOKEN_COOKIE};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const MAX_USERNAME_LEN: usize = 150;
const MIN_PASSWORD_LEN: usize = 8;

fn validate_username(username: &str) -> Result<(), AppError> {
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::BadRequest(format!(
            "Username must be 1 to {} characters",
            MAX_USERNAME_LEN
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        return Err(AppError::BadRequest(
            "Username may only contain letters, digits and @/./+/-/_".to_string(),
        ));
    }
    Ok(())
}

/// Only same-site absolute paths are followed after login.
fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//"))
}

fn issue_token(state: &AppState, user: &User) -> AppResult<(AuthResponse, Cookie<'static>)> {
    let token = state.tokens.generate_token(user.id, &user.username)?;
    let expires_in = state.tokens.expiration_seconds();

    let cookie = Cookie::build(TOKEN_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(expires_in))
        .finish();

    let response = AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: expires_in.max(0) as u64,
    };

    Ok((response, cookie))
}

/// POST /auth/signup/
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    validate_username(&req.username)?;
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    if state.users.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    let password_hash = state.passwords.hash(&req.password)?;
    let user = state
        .users
        .insert(User::new(req.username, password_hash))
        .await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User signed up");

    let (tokens, cookie) = issue_token(&state, &user)?;

    Ok(HttpResponse::Created()
        .cookie(cookie)
        .json(ApiResponse::ok_with_message(tokens, "Account created")))
}

/// GET /auth/login/
pub async fn login_page(query: web::Query<NextQuery>) -> HttpResponse {
    HttpResponse::Ok().json(LoginPageResponse {
        next: safe_next(query.next.as_deref()).map(str::to_string),
    })
}

/// POST /auth/login/
///
/// With a usable `?next=` the caller is sent back there holding the session
/// cookie; otherwise the token is returned in the body.
pub async fn login(
    state: web::Data<AppState>,
    query: web::Query<NextQuery>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::debug!(username = %req.username, "Rejected login");
        return Err(AppError::Unauthorized);
    }

    let (tokens, cookie) = issue_token(&state, &user)?;
    tracing::info!(user_id = %user.id, "User logged in");

    match safe_next(query.next.as_deref()) {
        Some(next) => Ok(HttpResponse::Found()
            .insert_header((header::LOCATION, next))
            .cookie(cookie)
            .finish()),
        None => Ok(HttpResponse::Ok().cookie(cookie).json(tokens)),
    }
}

/// POST /auth/logout/
pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::new(TOKEN_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();

    HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(cookie)
        .finish()
}

/// GET /auth/me/ - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(UserResponse {
        id: user.id.to_string(),
        username: user.username,
        created_at: user.created_at.to_rfc3339(),
    }))
}
