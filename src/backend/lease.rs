//! Lease lifecycle callbacks.
//!
//! The host's lease manager drives expiry; this module only reacts to
//! explicit renew and revoke calls carrying the internal data recorded
//! at issuance. Renewal re-resolves the role so edited TTLs take effect;
//! revocation deletes the remote key and surfaces failures so the host
//! can retry rather than silently considering the credential gone.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Backend;
use crate::errors::{Error, Result};
use crate::roles::get_role;

/// Lease internal data, stored by the host at issuance and handed back
/// verbatim on renew/revoke. Fields are optional on the way in because
/// revocation must cope with degraded metadata instead of getting stuck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseInternalData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerta_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerta_api_key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
}

/// TTL hints returned from a successful renewal; `None` defers to the
/// host's system default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaseRenewal {
    pub ttl: Option<Duration>,
    pub max_ttl: Option<Duration>,
}

/// Extend a lease without contacting the remote API.
///
/// The role is re-resolved by name, so the hints reflect the role's
/// current TTLs, not the values at issuance time. Internal data without
/// a role binding is a protocol violation; a deleted role refuses
/// renewal and pushes the caller toward revocation.
pub(super) async fn renew(backend: &Backend, internal: &LeaseInternalData) -> Result<LeaseRenewal> {
    let role_name = internal
        .role_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::validation("lease internal data is missing role_name"))?;

    let role = get_role(backend.storage(), role_name)
        .await?
        .ok_or_else(|| Error::not_found(role_name))?;

    tracing::debug!(role = %role_name, "Renewed Alerta API key lease");
    Ok(LeaseRenewal {
        ttl: (!role.ttl.is_zero()).then_some(role.ttl),
        max_ttl: (!role.max_ttl.is_zero()).then_some(role.max_ttl),
    })
}

/// Delete the remote key recorded in the lease.
///
/// A lease with no recorded key ID has nothing to delete remotely; the
/// call is skipped and revocation succeeds locally. Remote failures
/// propagate so the host's lease manager can retry; a credential is
/// never silently treated as revoked when the delete failed.
pub(super) async fn revoke(backend: &Backend, internal: &LeaseInternalData) -> Result<()> {
    let key_id = internal.alerta_api_key_id.as_deref().unwrap_or("");
    if key_id.is_empty() {
        tracing::warn!("Lease has no recorded API key ID; skipping remote delete");
        return Ok(());
    }

    let client = backend.get_client().await?;
    client.delete_key(key_id).await?;

    tracing::info!(key_id = %key_id, "Revoked Alerta API key");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_data_tolerates_missing_fields() {
        let internal: LeaseInternalData = serde_json::from_str("{}").unwrap();
        assert_eq!(internal, LeaseInternalData::default());

        let internal: LeaseInternalData =
            serde_json::from_str(r#"{"role_name":"svc"}"#).unwrap();
        assert_eq!(internal.role_name.as_deref(), Some("svc"));
        assert!(internal.alerta_api_key_id.is_none());
    }

    #[test]
    fn test_internal_data_round_trip() {
        let internal = LeaseInternalData {
            alerta_api_key: Some("secret".to_string()),
            alerta_api_key_id: Some("key-1".to_string()),
            role_name: Some("svc".to_string()),
        };
        let json = serde_json::to_string(&internal).unwrap();
        let decoded: LeaseInternalData = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, internal);
    }
}
