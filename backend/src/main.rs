//! Service entry point: loads settings, wires adapters, and serves HTTP.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};

use authgate::inbound::http::health::HealthState;
use authgate::inbound::http::session_config::{BuildMode, session_settings_from_env};
use server::{AuthSettings, create_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AuthSettings::load().map_err(|err| {
        error!(error = %err, "failed to load settings");
        std::io::Error::other(err.to_string())
    })?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|err| {
            error!(error = %err, "invalid session configuration");
            std::io::Error::other(err)
        })?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), settings, session)
        .await
        .map_err(|err| {
            error!(error = %err, "server startup failed");
            std::io::Error::other(err)
        })?;

    let result = server.await;
    health_state.mark_unhealthy();
    result
}
