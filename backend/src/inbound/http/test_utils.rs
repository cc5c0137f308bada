//! Test helpers for inbound HTTP components.

use std::sync::Arc;
use std::time::Duration;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use mockable::DefaultClock;

use super::session_config::SESSION_COOKIE_NAME;
use super::state::HttpState;
use crate::domain::{
    AccountService, AuthenticationController, CredentialAuthenticator, Password, UserId,
};
use crate::outbound::memory::{InMemorySessionRevocations, InMemoryUserDirectory};
use crate::test_support::low_cost_hasher;

/// Session middleware with a throwaway key and the `Secure` flag off so
/// cookies survive plain-HTTP test requests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_secure(false)
        .build()
}

/// The session cookie set on `res`, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
}

/// Handler state wired to in-memory adapters and a cheap codec.
pub struct TestApp {
    pub state: HttpState,
    pub directory: Arc<InMemoryUserDirectory>,
}

impl TestApp {
    pub fn new() -> Self {
        let directory = Arc::new(InMemoryUserDirectory::new());
        let timeout = Duration::from_secs(1);
        let clock = Arc::new(DefaultClock);
        let hasher = low_cost_hasher();
        let login = CredentialAuthenticator::new(directory.clone(), hasher.clone(), timeout);
        let auth = AuthenticationController::new(
            Arc::new(login),
            Arc::new(InMemorySessionRevocations::new(clock.clone())),
            clock,
        );
        let accounts = AccountService::new(directory.clone(), hasher, timeout);
        Self {
            state: HttpState::new(auth, Arc::new(accounts)),
            directory,
        }
    }

    /// Register an account directly through the service.
    pub async fn register(&self, username: &str, password: &str) -> UserId {
        self.state
            .accounts
            .register(username, &Password::new(password))
            .await
            .expect("register test account")
            .id
    }

    /// `/api/v1` routes behind a test session middleware.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .service(
                web::scope("/api/v1")
                    .wrap(test_session_middleware())
                    .configure(super::configure_api),
            )
    }
}
