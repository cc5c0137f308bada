//! Account endpoints.
//!
//! ```text
//! POST   /api/v1/users {"username":"alice","password":"Secret#123"}
//! GET    /api/v1/users/me
//! PATCH  /api/v1/users/me {"password":"N3w#Secret"}
//! DELETE /api/v1/users/me
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Password, UserId, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::auth_failure;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Registration body for `POST /api/v1/users`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Partial update body for `PATCH /api/v1/users/me`.
///
/// Absent and empty fields are both treated as "leave unchanged".
#[derive(Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn current_user_id(state: &HttpState, session: &SessionContext) -> ApiResult<UserId> {
    state
        .auth
        .require_authenticated(session)
        .map_err(auth_failure)
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserProfile),
        (status = 400, description = "Username or password fails the format policy", body = Error),
        (status = 409, description = "Username already registered", body = Error),
        (status = 503, description = "Dependency unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest { username, password } = payload.into_inner();
    let profile = state
        .accounts
        .register(&username, &Password::new(password))
        .await
        .map_err(auth_failure)?;
    Ok(HttpResponse::Created().json(profile))
}

/// Profile of the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserProfile>> {
    let id = current_user_id(&state, &session)?;
    let profile = state.accounts.find(id).await.map_err(auth_failure)?;
    Ok(web::Json(profile))
}

/// Change the signed-in user's username, password, or both.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "No fields, or a field fails the format policy", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Account no longer exists", body = Error),
        (status = 409, description = "Username already registered", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser"
)]
#[patch("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserProfile>> {
    let id = current_user_id(&state, &session)?;
    let UpdateUserRequest { username, password } = payload.into_inner();
    let password = password.map(Password::new);
    state
        .accounts
        .update(id, username.as_deref(), password.as_ref())
        .await
        .map_err(auth_failure)?;
    let profile = state.accounts.find(id).await.map_err(auth_failure)?;
    Ok(web::Json(profile))
}

/// Delete the signed-in user's account and end the session.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteCurrentUser"
)]
#[delete("/users/me")]
pub async fn delete_current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let id = current_user_id(&state, &session)?;
    state.accounts.delete(id).await.map_err(auth_failure)?;
    state.auth.logout(&session);
    Ok(HttpResponse::NoContent().finish())
}
