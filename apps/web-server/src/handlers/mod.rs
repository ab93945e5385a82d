//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;
mod present;

#[cfg(test)]
mod tests;

use actix_web::{HttpResponse, error::JsonPayloadError, http::header, web};

use crate::middleware::error::{self, AppError};
use crate::middleware::rate_limit::RateLimitMiddleware;

/// `302 Found` to `location`.
pub(crate) fn redirect(location: String) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn json_error(err: JsonPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        // Feeds
        .route("/", web::get().to(posts::index))
        .route("/group/{slug}/", web::get().to(posts::group_posts))
        .route("/profile/{username}/", web::get().to(posts::profile))
        // Posts
        .route("/posts/{post_id}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/posts/{post_id}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::post_create_form))
                .route(web::post().to(posts::post_create)),
        )
        // Auth routes
        .service(
            web::scope("/auth")
                .wrap(RateLimitMiddleware)
                .route("/signup/", web::post().to(auth::signup))
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth::login_page))
                        .route(web::post().to(auth::login)),
                )
                .route("/logout/", web::post().to(auth::logout))
                .route("/me/", web::get().to(auth::me)),
        )
        .route("/health/", web::get().to(health::health_check))
        .default_service(web::to(error::not_found));
}
