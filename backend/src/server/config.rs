//! Service settings loaded via OrthoConfig.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use authgate::domain::Password;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HASH_CONCURRENCY: usize = 4;
const DEFAULT_DIRECTORY_TIMEOUT_MS: u64 = 5_000;

/// Settings read from `AUTH_*` environment variables, CLI flags, or a
/// config file.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "AUTH")]
pub struct AuthSettings {
    /// Listen address.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL. Without one, accounts live in memory.
    pub database_url: Option<String>,
    /// Maximum concurrent credential derivations.
    pub hash_concurrency: Option<usize>,
    /// Deadline for each user directory call, in milliseconds.
    pub directory_timeout_ms: Option<u64>,
    /// Account ensured at startup together with `seed_password`.
    pub seed_username: Option<String>,
    pub seed_password: Option<String>,
}

impl AuthSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    /// Admission ceiling, never below one.
    pub fn hash_concurrency(&self) -> usize {
        self.hash_concurrency
            .unwrap_or(DEFAULT_HASH_CONCURRENCY)
            .max(1)
    }

    pub fn directory_timeout(&self) -> Duration {
        Duration::from_millis(
            self.directory_timeout_ms
                .unwrap_or(DEFAULT_DIRECTORY_TIMEOUT_MS),
        )
    }

    /// Bootstrap account, only when both halves are configured.
    pub fn seed_account(&self) -> Option<(&str, Password)> {
        match (&self.seed_username, &self.seed_password) {
            (Some(username), Some(password)) => {
                Some((username.as_str(), Password::new(password.as_str())))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "AUTH_BIND_ADDR",
        "AUTH_DATABASE_URL",
        "AUTH_HASH_CONCURRENCY",
        "AUTH_DIRECTORY_TIMEOUT_MS",
        "AUTH_SEED_USERNAME",
        "AUTH_SEED_PASSWORD",
    ];

    fn load_from_empty_args() -> AuthSettings {
        AuthSettings::load_from_iter([OsString::from("authgate")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080".parse::<SocketAddr>().expect("addr"));
        assert_eq!(settings.hash_concurrency(), DEFAULT_HASH_CONCURRENCY);
        assert_eq!(settings.directory_timeout(), Duration::from_secs(5));
        assert!(settings.database_url.is_none());
        assert!(settings.seed_account().is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("AUTH_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            ("AUTH_DATABASE_URL", Some("postgres://localhost/auth".to_owned())),
            ("AUTH_HASH_CONCURRENCY", Some("0".to_owned())),
            ("AUTH_DIRECTORY_TIMEOUT_MS", Some("250".to_owned())),
            ("AUTH_SEED_USERNAME", Some("test".to_owned())),
            ("AUTH_SEED_PASSWORD", Some("Test@1234".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "127.0.0.1:9000".parse::<SocketAddr>().expect("addr"));
        assert_eq!(settings.database_url.as_deref(), Some("postgres://localhost/auth"));
        assert_eq!(settings.hash_concurrency(), 1);
        assert_eq!(settings.directory_timeout(), Duration::from_millis(250));
        let (username, password) = settings.seed_account().expect("seed account");
        assert_eq!(username, "test");
        assert_eq!(password.expose(), "Test@1234");
    }

    #[rstest]
    fn half_configured_seed_is_ignored() {
        let mut vars = VARS.map(|name| (name, None::<String>));
        vars[4].1 = Some("test".to_owned());
        let _guard = lock_env(vars);

        assert!(load_from_empty_args().seed_account().is_none());
    }
}
