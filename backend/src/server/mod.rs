//! Server construction and dependency wiring.

mod config;

pub use config::AuthSettings;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use authgate::Trace;
#[cfg(debug_assertions)]
use authgate::doc::ApiDoc;
use authgate::domain::ports::UserDirectory;
use authgate::domain::{
    AccountService, AuthError, AuthenticationController, CredentialAuthenticator,
    CredentialCodec, CredentialHasher, EnsureOutcome,
};
use authgate::inbound::http::configure_api;
use authgate::inbound::http::health::{HealthState, live, ready};
use authgate::inbound::http::session_config::{SessionSettings, session_middleware};
use authgate::inbound::http::state::HttpState;
use authgate::outbound::memory::{InMemorySessionRevocations, InMemoryUserDirectory};
use authgate::outbound::persistence::{
    DbPool, DieselUserDirectory, MigrationError, PoolConfig, PoolError, run_pending_migrations,
};

/// Failures that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("failed to ensure seed account: {0}")]
    Seed(#[source] AuthError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

async fn build_directory(settings: &AuthSettings) -> Result<Arc<dyn UserDirectory>, StartupError> {
    let Some(url) = settings.database_url.as_deref() else {
        warn!("AUTH_DATABASE_URL not set; accounts are kept in memory");
        return Ok(Arc::new(InMemoryUserDirectory::new()));
    };

    run_pending_migrations(url).await?;
    let pool = DbPool::new(PoolConfig::new(url)).await?;
    Ok(Arc::new(DieselUserDirectory::new(pool)))
}

/// Assemble the domain services behind the HTTP handlers.
pub async fn build_http_state(settings: &AuthSettings) -> Result<HttpState, StartupError> {
    let directory = build_directory(settings).await?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let hasher = CredentialHasher::new(CredentialCodec::new(), settings.hash_concurrency());
    let timeout = settings.directory_timeout();

    let login = CredentialAuthenticator::new(directory.clone(), hasher.clone(), timeout);
    let auth = AuthenticationController::new(
        Arc::new(login),
        Arc::new(InMemorySessionRevocations::new(clock.clone())),
        clock,
    );
    let accounts = Arc::new(AccountService::new(directory, hasher, timeout));

    if let Some((username, password)) = settings.seed_account() {
        match accounts
            .ensure_user(username, &password)
            .await
            .map_err(StartupError::Seed)?
        {
            EnsureOutcome::Created(id) => info!(user_id = %id, username, "seed account created"),
            EnsureOutcome::AlreadyPresent => info!(username, "seed account already present"),
        }
    }

    info!(
        hash_concurrency = settings.hash_concurrency(),
        directory_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        "authentication services ready"
    );
    Ok(HttpState::new(auth, accounts))
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: &SessionSettings,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let api = web::scope("/api/v1")
        .wrap(session_middleware(session))
        .configure(configure_api);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind the listener and return the running server.
///
/// Readiness flips once the listener is bound.
///
/// # Errors
/// Fails when the directory, migrations, seed account, or socket bind fail.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    settings: AuthSettings,
    session: SessionSettings,
) -> Result<Server, StartupError> {
    let http_state = web::Data::new(build_http_state(&settings).await?);
    let server_health_state = health_state.clone();
    let session = Arc::new(session);
    let bind_addr = settings.bind_addr();

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone(), &session)
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "listening");
    health_state.mark_ready();
    Ok(server)
}
