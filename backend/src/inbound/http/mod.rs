//! HTTP inbound adapter exposing the authentication endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`.
///
/// The caller mounts this under a scope wrapped in the session middleware.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use authgate::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(auth::logout)
        .service(auth::dashboard)
        .service(users::register)
        .service(users::current_user)
        .service(users::update_current_user)
        .service(users::delete_current_user);
}
