//! Login, logout, and the gated dashboard.
//!
//! ```text
//! POST /api/v1/login {"username":"alice","password":"Secret#123"}
//! POST /api/v1/logout
//! GET  /api/v1/dashboard
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, LoginCredentials, LoginValidationError, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::auth_failure;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Header telling htmx clients where to navigate after login.
pub const HX_REDIRECT_HEADER: &str = "HX-Redirect";
/// Landing page for authenticated users.
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: UserId,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub message: String,
    pub user_id: UserId,
}

/// Authenticate and bind the user to a fresh session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse,
            headers(
                ("Set-Cookie" = String, description = "Session cookie"),
                ("HX-Redirect" = String, description = "Dashboard location")
            )),
        (status = 400, description = "Blank username or password", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Dependency unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user_id = state
        .auth
        .login(&session, &credentials)
        .await
        .map_err(auth_failure)?;
    Ok(HttpResponse::Ok()
        .insert_header((HX_REDIRECT_HEADER, DASHBOARD_PATH))
        .json(LoginResponse { user_id }))
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// End the session. Always succeeds.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session ended")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    state.auth.logout(&session);
    HttpResponse::NoContent().finish()
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Greeting for the signed-in user", body = DashboardResponse),
        (status = 401, description = "Unauthorized", body = Error)
    ),
    tags = ["auth"],
    operation_id = "dashboard"
)]
#[get("/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DashboardResponse>> {
    let user_id = state
        .auth
        .require_authenticated(&session)
        .map_err(auth_failure)?;
    Ok(web::Json(DashboardResponse {
        message: format!("Welcome to the dashboard, User {user_id}!"),
        user_id,
    }))
}
