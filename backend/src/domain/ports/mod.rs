//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod login_service;
mod session_handle;
mod session_revocations;
mod user_directory;

#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use session_handle::MockSessionHandle;
pub use session_handle::{SessionHandle, SessionStoreError};
#[cfg(test)]
pub use session_revocations::MockSessionRevocations;
pub use session_revocations::SessionRevocations;
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::{UserDirectory, UserDirectoryError};
