//! Handlers for the `role/<name>` and `role` paths.
//!
//! Thin translation between the host's request data and the role
//! registry in [`crate::roles`]; merge and validation semantics live
//! there.

use serde_json::{Map, Value};

use super::{optional_duration_secs, optional_str, optional_string_list, Backend, Operation, Response};
use crate::errors::{Error, Result};
use crate::roles::{self, RoleUpdate};

pub(super) async fn read(backend: &Backend, name: &str) -> Result<Response> {
    let entry = roles::get_role(backend.storage(), name)
        .await?
        .ok_or_else(|| Error::not_found(name))?;
    Ok(Response::with_data(entry.to_response_data()))
}

pub(super) async fn write(
    backend: &Backend,
    name: &str,
    operation: Operation,
    data: &Map<String, Value>,
) -> Result<Response> {
    let update = RoleUpdate {
        user: optional_str(data, "user")?,
        scopes: optional_string_list(data, "scopes")?,
        description: optional_str(data, "description")?,
        ttl: optional_duration_secs(data, "ttl")?,
        max_ttl: optional_duration_secs(data, "max_ttl")?,
    };

    let existing = roles::get_role(backend.storage(), name).await?;
    let entry =
        roles::apply_role_write(name, existing, update, operation == Operation::Create)?;
    roles::set_role(backend.storage(), &entry).await?;

    tracing::debug!(role = %name, "Wrote role entry");
    Ok(Response::default())
}

pub(super) async fn delete(backend: &Backend, name: &str) -> Result<Response> {
    roles::delete_role(backend.storage(), name).await?;
    tracing::debug!(role = %name, "Deleted role entry");
    Ok(Response::default())
}

pub(super) async fn list(backend: &Backend) -> Result<Response> {
    let names = roles::list_roles(backend.storage()).await?;
    let mut data = Map::new();
    data.insert("keys".to_string(), Value::from(names));
    Ok(Response::with_data(data))
}
