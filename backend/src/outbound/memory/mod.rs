//! Process-local adapters.
//!
//! Used by tests and by deployments that run without a database. State is
//! lost on restart.

mod session_revocations;
mod user_directory;

pub use session_revocations::InMemorySessionRevocations;
pub use user_directory::InMemoryUserDirectory;
