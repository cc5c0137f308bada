//! Admission control around credential derivation.
//!
//! Each Argon2id call holds 64 MiB for its duration, so concurrent calls are
//! capped by a semaphore and run on the blocking pool.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::debug;

use super::credential::{CredentialCodec, EncodedCredential};
use super::{AuthError, Password};

/// Bounded executor for credential derivation and verification.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    codec: CredentialCodec,
    permits: Arc<Semaphore>,
    ceiling: usize,
}

impl CredentialHasher {
    /// Allow at most `concurrency` derivations in flight. Zero is raised to one.
    pub fn new(codec: CredentialCodec, concurrency: usize) -> Self {
        let ceiling = concurrency.max(1);
        Self {
            codec,
            permits: Arc::new(Semaphore::new(ceiling)),
            ceiling,
        }
    }

    /// Configured concurrency ceiling.
    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Permits not currently held.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Derive a fresh credential for `password`.
    pub async fn derive(&self, password: &Password) -> Result<EncodedCredential, AuthError> {
        let codec = self.codec;
        let password = password.clone();
        self.run(move || codec.derive(password.expose()))
            .await?
            .map_err(AuthError::from)
    }

    /// Verify `password` against a stored credential.
    pub async fn verify(
        &self,
        password: &Password,
        encoded: &EncodedCredential,
    ) -> Result<bool, AuthError> {
        let codec = self.codec;
        let password = password.clone();
        let encoded = encoded.clone();
        self.run(move || codec.verify(password.expose(), &encoded))
            .await
    }

    async fn run<T, F>(&self, work: F) -> Result<T, AuthError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| AuthError::Hashing {
                message: "hashing semaphore closed".to_owned(),
            })?;
        debug!(available = self.permits.available_permits(), "hashing permit acquired");

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            work()
        })
        .await
        .map_err(|err| AuthError::Hashing {
            message: err.to_string(),
        })
    }
}
