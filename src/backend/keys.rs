//! Credential issuance: the `keys/<name>` path.
//!
//! Resolves the role, mints a fresh API key through the cached client,
//! and binds it to a lease. The expiry hint sent to Alerta and the
//! `expireTime` parsed out of its response both use RFC 3339; the parse
//! is strict, and a remote timestamp this engine cannot read is a
//! protocol error rather than a silently unbounded credential.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::lease::LeaseInternalData;
use super::{Backend, IssuedSecret, Response, ALERTA_API_KEY_TYPE};
use crate::errors::{Error, Result};
use crate::roles::RoleEntry;

/// An issued Alerta API key, prior to lease binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub id: String,
    pub key: String,
    pub expire_time: DateTime<Utc>,
    pub role_name: String,
}

pub(super) async fn issue(backend: &Backend, role_name: &str) -> Result<Response> {
    let role = crate::roles::get_role(backend.storage(), role_name)
        .await?
        .ok_or_else(|| Error::not_found(role_name))?;

    let api_key = create_api_key(backend, &role).await?;

    let mut data = Map::new();
    data.insert("alerta_api_key".to_string(), Value::String(api_key.key.clone()));
    data.insert("alerta_api_key_id".to_string(), Value::String(api_key.id.clone()));
    data.insert(
        "expire_time".to_string(),
        Value::String(api_key.expire_time.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    data.insert("role_name".to_string(), Value::String(role.name.clone()));

    // The key ID is duplicated into internal data because revoke must not
    // depend on the public half, which the host may never hand back.
    let internal = LeaseInternalData {
        alerta_api_key: Some(api_key.key),
        alerta_api_key_id: Some(api_key.id),
        role_name: Some(role.name.clone()),
    };

    let secret = IssuedSecret {
        secret_type: ALERTA_API_KEY_TYPE,
        internal,
        ttl: (!role.ttl.is_zero()).then_some(role.ttl),
        max_ttl: (!role.max_ttl.is_zero()).then_some(role.max_ttl),
    };

    tracing::info!(role = %role.name, "Issued Alerta API key");
    Ok(Response { data, secret: Some(secret) })
}

/// Call the remote API to mint a key for `role`.
async fn create_api_key(backend: &Backend, role: &RoleEntry) -> Result<ApiKey> {
    let client = backend.get_client().await?;
    let now = Utc::now();

    let text = format!(
        "{} at {}",
        role.description,
        now.to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    // Zero max_ttl means no expiry hint; the remote API applies its own
    // default.
    let expire_hint = if role.max_ttl.is_zero() {
        None
    } else {
        let max_ttl = chrono::Duration::from_std(role.max_ttl)
            .map_err(|_| Error::validation_field("max_ttl is out of range", "max_ttl"))?;
        Some((now + max_ttl).to_rfc3339_opts(SecondsFormat::Millis, true))
    };

    let created = client
        .create_key(&role.user, &role.scopes, &text, expire_hint.as_deref())
        .await?;

    let expire_time = DateTime::parse_from_rfc3339(&created.expire_time)
        .map_err(|e| {
            Error::remote_protocol(format!(
                "error parsing expire time '{}': {}",
                created.expire_time, e
            ))
        })?
        .with_timezone(&Utc);

    Ok(ApiKey {
        id: created.id,
        key: created.key,
        expire_time,
        role_name: role.name.clone(),
    })
}
