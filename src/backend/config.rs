//! Handlers for the `config` path.
//!
//! Create requires both `api_url` and `auth_key`; update merges the
//! supplied fields over the stored configuration and fails when nothing
//! is stored yet. Reads redact the auth key. Every successful write or
//! delete resets the client cache so the next credential operation picks
//! up the new values atomically.

use serde_json::{Map, Value};

use super::{optional_str, Backend, Operation, Response};
use crate::config::{delete_config, read_config, write_config, EngineConfig};
use crate::errors::{Error, Result};

pub(super) async fn read(backend: &Backend) -> Result<Response> {
    let config = read_config(backend.storage())
        .await?
        .ok_or_else(|| Error::config("backend is not configured"))?;

    // auth_key is sensitive and never echoed back.
    let mut data = Map::new();
    data.insert("api_url".to_string(), Value::String(config.api_url));
    Ok(Response::with_data(data))
}

pub(super) async fn write(
    backend: &Backend,
    operation: Operation,
    data: &Map<String, Value>,
) -> Result<Response> {
    let create = operation == Operation::Create;

    let mut config = match read_config(backend.storage()).await? {
        Some(config) => config,
        None if create => EngineConfig::default(),
        None => return Err(Error::validation("config not found during update operation")),
    };

    match optional_str(data, "api_url")? {
        Some(api_url) => config.api_url = api_url,
        None if create => return Err(Error::validation_field("api_url is required", "api_url")),
        None => {}
    }

    match optional_str(data, "auth_key")? {
        Some(auth_key) => config.auth_key = auth_key,
        None if create => {
            return Err(Error::validation_field("auth_key is required", "auth_key"))
        }
        None => {}
    }

    write_config(backend.storage(), &config).await?;

    // The next credential operation must not observe stale auth material.
    backend.reset().await;
    tracing::info!(api_url = %config.api_url, "Updated Alerta backend configuration");

    Ok(Response::default())
}

pub(super) async fn delete(backend: &Backend) -> Result<Response> {
    delete_config(backend.storage()).await?;
    backend.reset().await;
    tracing::info!("Deleted Alerta backend configuration");
    Ok(Response::default())
}
