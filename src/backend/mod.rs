//! The secrets engine backend.
//!
//! [`Backend`] ties the pieces together: it owns the host-provided
//! storage, lazily builds and caches the [`AlertaClient`], and dispatches
//! host requests through an explicit routing table instead of the
//! pattern-matching callback registry a plugin framework would use.
//!
//! # Paths
//!
//! - `config` — read/create/update/delete the remote endpoint settings
//! - `role/<name>` — role CRUD; `role` — list role names
//! - `keys/<name>` — issue a fresh Alerta API key for a role
//!
//! Lease renew/revoke are not routed: the host's lease manager invokes
//! [`Backend::renew`] and [`Backend::revoke`] directly with the internal
//! data it recorded at issuance time.
//!
//! # Concurrency
//!
//! The cached client is the only mutable shared state, behind a single
//! `tokio::sync::RwLock`. Issuance, renewal, and revocation take the
//! shared mode; configuration changes and cache invalidation take the
//! exclusive mode. Invalidation never blocks on in-flight credential
//! operations; they keep using whatever `Arc` they already cloned.

pub mod config;
pub mod keys;
pub mod lease;
pub mod roles;

pub use lease::{LeaseInternalData, LeaseRenewal};

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::client::AlertaClient;
use crate::config::{read_config, CONFIG_PATH};
use crate::errors::{Error, Result};
use crate::storage::StorageBackend;

/// Secret type identifier for issued Alerta API keys.
pub const ALERTA_API_KEY_TYPE: &str = "alerta_api_key";

/// CRUD-style operations in the host's request envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Read,
    Delete,
    List,
}

/// A host request against one of the engine's paths.
#[derive(Debug, Clone)]
pub struct Request {
    pub operation: Operation,
    pub path: String,
    pub data: Map<String, Value>,
}

impl Request {
    pub fn new(operation: Operation, path: impl Into<String>, data: Map<String, Value>) -> Self {
        Self { operation, path: path.into(), data }
    }

    /// Read request with no body.
    pub fn read(path: impl Into<String>) -> Self {
        Self::new(Operation::Read, path, Map::new())
    }

    /// List request with no body.
    pub fn list(path: impl Into<String>) -> Self {
        Self::new(Operation::List, path, Map::new())
    }

    /// Delete request with no body.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Operation::Delete, path, Map::new())
    }
}

/// A lease-bound secret attached to a [`Response`].
///
/// The public fields live in the response data; this carries what the
/// host must retain: the internal data handed back verbatim on renew and
/// revoke, and the lease TTL hints (set only when the role values are
/// nonzero, zero meaning "defer to the host default").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSecret {
    pub secret_type: &'static str,
    pub internal: LeaseInternalData,
    pub ttl: Option<Duration>,
    pub max_ttl: Option<Duration>,
}

/// Response to a routed host request.
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub data: Map<String, Value>,
    pub secret: Option<IssuedSecret>,
}

impl Response {
    pub fn with_data(data: Map<String, Value>) -> Self {
        Self { data, secret: None }
    }
}

/// Routing table entry: which component a path belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Config,
    Role(String),
    RoleList,
    Keys(String),
}

impl Route {
    /// One-line help for the routed path.
    pub fn synopsis(&self) -> &'static str {
        match self {
            Route::Config => "Configure the Alerta backend",
            Route::Role(_) => "Manage roles used to generate Alerta API keys",
            Route::RoleList => "List the existing roles in the Alerta backend",
            Route::Keys(_) => "Generate an Alerta API key from a specific role",
        }
    }
}

/// Resolve a request path to its route. Role and key names are lowercased
/// on the way in, matching how the original plugin normalized them.
pub fn route(path: &str) -> Option<Route> {
    if path == CONFIG_PATH {
        return Some(Route::Config);
    }
    if path == "role" || path == "role/" {
        return Some(Route::RoleList);
    }
    if let Some(name) = path.strip_prefix("role/") {
        if !name.is_empty() && !name.contains('/') {
            return Some(Route::Role(name.to_lowercase()));
        }
    }
    if let Some(name) = path.strip_prefix("keys/") {
        if !name.is_empty() && !name.contains('/') {
            return Some(Route::Keys(name.to_lowercase()));
        }
    }
    None
}

/// The Alerta secrets engine backend.
pub struct Backend {
    storage: Arc<dyn StorageBackend>,
    client: RwLock<Option<Arc<AlertaClient>>>,
}

impl Backend {
    /// Create a backend over the host's storage.
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage, client: RwLock::new(None) }
    }

    /// The backing store.
    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    /// Return the cached Alerta client, building it from the stored
    /// configuration on first use.
    ///
    /// Optimistic read under the shared lock; on a miss the exclusive
    /// lock is taken and the absence re-checked, since another caller may
    /// have finished construction while this one waited. Construction
    /// failures are not cached, so the next call retries cleanly.
    pub async fn get_client(&self) -> Result<Arc<AlertaClient>> {
        {
            let cached = self.client.read().await;
            if let Some(client) = cached.as_ref() {
                return Ok(Arc::clone(client));
            }
        }

        let mut cached = self.client.write().await;
        if let Some(client) = cached.as_ref() {
            return Ok(Arc::clone(client));
        }

        // An absent configuration fails client validation with a clear
        // message instead of a missing-entry special case.
        let config = read_config(self.storage.as_ref()).await?.unwrap_or_default();
        let client = Arc::new(AlertaClient::new(&config)?);
        *cached = Some(Arc::clone(&client));
        tracing::debug!(api_url = %client.api_url(), "Built Alerta client from configuration");
        Ok(client)
    }

    /// Drop the cached client so the next credential operation rebuilds
    /// it from current configuration. In-flight operations keep the
    /// client they already captured.
    pub async fn reset(&self) {
        let mut cached = self.client.write().await;
        if cached.take().is_some() {
            tracing::debug!("Invalidated cached Alerta client");
        }
    }

    /// Storage invalidation hook from the host: a change to the `config`
    /// entry invalidates the cached client.
    pub async fn invalidate(&self, key: &str) {
        if key == CONFIG_PATH {
            self.reset().await;
        }
    }

    /// Dispatch a routed host request.
    pub async fn handle_request(&self, request: Request) -> Result<Response> {
        let route = route(&request.path).ok_or_else(|| {
            Error::validation(format!("unknown path: '{}'", request.path))
        })?;

        match (route, request.operation) {
            (Route::Config, Operation::Read) => config::read(self).await,
            (Route::Config, op @ (Operation::Create | Operation::Update)) => {
                config::write(self, op, &request.data).await
            }
            (Route::Config, Operation::Delete) => config::delete(self).await,

            (Route::Role(name), Operation::Read) => roles::read(self, &name).await,
            (Route::Role(name), op @ (Operation::Create | Operation::Update)) => {
                roles::write(self, &name, op, &request.data).await
            }
            (Route::Role(name), Operation::Delete) => roles::delete(self, &name).await,
            (Route::RoleList, Operation::List) => roles::list(self).await,

            (Route::Keys(name), Operation::Read | Operation::Update) => {
                keys::issue(self, &name).await
            }

            (_, op) => Err(Error::validation(format!(
                "unsupported operation {:?} for path '{}'",
                op, request.path
            ))),
        }
    }

    /// Lease renewal callback; semantics in the [`lease`] module.
    pub async fn renew(&self, internal: &LeaseInternalData) -> Result<LeaseRenewal> {
        lease::renew(self, internal).await
    }

    /// Lease revocation callback; semantics in the [`lease`] module.
    pub async fn revoke(&self, internal: &LeaseInternalData) -> Result<()> {
        lease::revoke(self, internal).await
    }
}

/// Extract an optional string field from request data.
pub(crate) fn optional_str(data: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(Error::validation_field(format!("{} must be a string", field), field)),
    }
}

/// Extract an optional string-list field. Accepts a JSON array of strings
/// or a comma-separated string, like the original plugin's field schema.
pub(crate) fn optional_string_list(
    data: &Map<String, Value>,
    field: &str,
) -> Result<Option<Vec<String>>> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            Ok(Some(s.split(',').map(|part| part.trim().to_string()).collect()))
        }
        Some(Value::Array(items)) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => values.push(s.clone()),
                    _ => {
                        return Err(Error::validation_field(
                            format!("{} must be a list of strings", field),
                            field,
                        ))
                    }
                }
            }
            Ok(Some(values))
        }
        Some(_) => {
            Err(Error::validation_field(format!("{} must be a list of strings", field), field))
        }
    }
}

/// Extract an optional duration field given in whole seconds. Accepts a
/// JSON integer or a string holding one.
pub(crate) fn optional_duration_secs(
    data: &Map<String, Value>,
    field: &str,
) -> Result<Option<Duration>> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(|secs| Some(Duration::from_secs(secs)))
            .ok_or_else(|| {
                Error::validation_field(
                    format!("{} must be a non-negative number of seconds", field),
                    field,
                )
            }),
        Some(Value::String(s)) => s
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| {
                Error::validation_field(
                    format!("{} must be a non-negative number of seconds", field),
                    field,
                )
            }),
        Some(_) => Err(Error::validation_field(
            format!("{} must be a non-negative number of seconds", field),
            field,
        )),
    }
}
