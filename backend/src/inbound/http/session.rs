//! Actix session adapter for the [`SessionHandle`] port.
//!
//! The cookie carries a single typed [`SessionPayload`] under
//! [`SESSION_PAYLOAD_KEY`]; handlers never touch raw session keys.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::ports::{SessionHandle, SessionStoreError};
use crate::domain::{SESSION_PAYLOAD_KEY, SessionPayload};

/// Request-scoped session handle.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }
}

impl SessionHandle for SessionContext {
    fn load(&self) -> Result<Option<SessionPayload>, SessionStoreError> {
        self.0
            .get::<SessionPayload>(SESSION_PAYLOAD_KEY)
            .map_err(|error| SessionStoreError::read(error.to_string()))
    }

    fn store(&self, payload: &SessionPayload) -> Result<(), SessionStoreError> {
        self.0
            .insert(SESSION_PAYLOAD_KEY, payload)
            .map_err(|error| SessionStoreError::write(error.to_string()))
    }

    fn renew(&self) {
        self.0.renew();
    }

    fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
