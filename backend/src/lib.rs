//! Credential authentication service library.
//!
//! The framework-free core lives in [`domain`]; [`inbound`] and [`outbound`]
//! adapt it to actix-web, Diesel, and in-process stores.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
