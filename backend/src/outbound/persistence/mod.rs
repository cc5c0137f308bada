//! PostgreSQL persistence adapter built on Diesel, `diesel-async`, and `bb8`.
//!
//! Row structs and the schema stay private; callers see only domain types
//! through the [`UserDirectory`](crate::domain::ports::UserDirectory) port.

mod diesel_user_directory;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_user_directory::DieselUserDirectory;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
