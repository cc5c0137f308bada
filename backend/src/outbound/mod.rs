//! Outbound adapters implementing the domain ports.
//!
//! - **memory**: process-local user directory and revocation registry
//! - **persistence**: PostgreSQL user directory using Diesel
//!
//! Adapters translate between domain types and storage representations and
//! carry no business rules.

pub mod memory;
pub mod persistence;
