//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

async fn read_error(error: &Error) -> (StatusCode, Option<String>, Error) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .map(|value| value.to_str().expect("ascii header").to_owned());
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let payload = serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds");
    (status, header, payload)
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("Unauthorized"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("later"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(expected_trace_id: String) {
    let error = Error::internal("user directory failure: relation users does not exist")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({ "sql": "select" }));

    let (status, header, payload) = read_error(&error).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(expected_trace_id.as_str()));
    assert_eq!(payload.message(), "Internal server error");
    assert!(payload.details().is_none());
    assert_eq!(payload.trace_id(), Some(TRACE_ID));
}

#[rstest]
#[actix_web::test]
async fn format_errors_keep_their_details() {
    let error = auth_failure(AuthError::Format(
        crate::domain::CredentialFormatError::UsernameCharacters,
    ));
    let (status, header, payload) = read_error(&error).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(header.is_none());
    assert_eq!(
        payload.details(),
        Some(&json!({ "field": "username", "code": "username_characters" }))
    );
}

#[rstest]
#[actix_web::test]
async fn invalid_credentials_use_one_message() {
    let (status, _, payload) = read_error(&auth_failure(AuthError::InvalidCredentials)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(payload.message(), "invalid username or password");
}

#[rstest]
#[actix_web::test]
async fn timeouts_are_service_unavailable() {
    let error = auth_failure(AuthError::DependencyTimeout {
        dependency: "user directory",
        timeout: std::time::Duration::from_millis(250),
    });
    let (status, _, payload) = read_error(&error).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(payload.details(), Some(&json!({ "retryable": true })));
}
