//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see domain services,
//! so they can be tested without a database.

use std::sync::Arc;

use crate::domain::{AccountService, AuthenticationController};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: AuthenticationController,
    pub accounts: Arc<AccountService>,
}

impl HttpState {
    pub fn new(auth: AuthenticationController, accounts: Arc<AccountService>) -> Self {
        Self { auth, accounts }
    }
}
