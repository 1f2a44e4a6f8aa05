//! # Alerta Secrets Engine
//!
//! A dynamic-secrets engine that issues short-lived Alerta API keys on
//! behalf of named roles, for embedding in a Vault-style
//! secret-management host. Given a role (user, scopes, TTL bounds), the
//! engine mints a key against the remote Alerta API, binds it to a
//! lease, and keeps the remote credential and the lease record
//! consistent across renewal, revocation, and configuration changes.
//!
//! ## Architecture
//!
//! ```text
//! Host request ─► Backend (routing table) ─► Role Registry / Config Store
//!                      │                              │
//!                      ▼                              ▼
//!                Client Cache ──────────────► StorageBackend (host KV)
//!                      │
//!                      ▼
//!                AlertaClient ──► POST /key, DELETE /key/{id}
//! ```
//!
//! The cached [`client::AlertaClient`] is the only mutable shared state,
//! built lazily from the stored configuration and invalidated atomically
//! whenever that configuration changes.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use alerta_secrets::{Backend, MemoryStorage, Operation, Request};
//! use serde_json::json;
//!
//! # async fn run() -> alerta_secrets::Result<()> {
//! let backend = Backend::new(Arc::new(MemoryStorage::new()));
//!
//! let config = json!({
//!     "api_url": "https://alerta.example.com/api",
//!     "auth_key": "admin-key",
//! });
//! backend
//!     .handle_request(Request::new(
//!         Operation::Create,
//!         "config",
//!         config.as_object().unwrap().clone(),
//!     ))
//!     .await?;
//!
//! let issued = backend.handle_request(Request::read("keys/monitoring")).await?;
//! println!("key: {}", issued.data["alerta_api_key"]);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod errors;
pub mod observability;
pub mod roles;
pub mod storage;

// Re-export commonly used types
pub use backend::{
    Backend, IssuedSecret, LeaseInternalData, LeaseRenewal, Operation, Request, Response,
    ALERTA_API_KEY_TYPE,
};
pub use client::AlertaClient;
pub use config::EngineConfig;
pub use errors::{Error, Result};
pub use observability::init_tracing;
pub use roles::RoleEntry;
pub use storage::{MemoryStorage, StorageBackend};

/// Crate version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name from Cargo.toml.
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_available() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "alerta-secrets");
    }
}
