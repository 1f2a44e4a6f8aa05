//! Role registry.
//!
//! A role is a named template controlling which Alerta user, scopes, and
//! lease TTLs are applied when issuing an API key. Roles live at
//! `role/<name>` in the backing store with durations encoded as integer
//! seconds.
//!
//! Write semantics are merge-then-validate: an update overlays only the
//! supplied fields onto the stored entry, and the merged result is
//! rejected outright (no partial write) when a nonzero `ttl` exceeds a
//! nonzero `max_ttl`. A zero duration always means "defer to the host's
//! system default", never "zero lease time".

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::storage::{self, StorageBackend};

/// Storage prefix for role entries.
pub const ROLE_PREFIX: &str = "role/";

/// Description applied on create when the caller supplies none.
pub const DEFAULT_DESCRIPTION: &str = "Managed by alerta-secrets";

/// Default `max_ttl` applied on create: 90 days.
pub const DEFAULT_MAX_TTL: Duration = Duration::from_secs(90 * 24 * 60 * 60);

/// Serde adapter storing a [`Duration`] as whole seconds.
pub(crate) mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}

/// A stored role definition.
///
/// The name is the storage key suffix, not part of the persisted JSON;
/// [`get_role`] fills it in on the way out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEntry {
    /// Role name (unique, lowercase).
    #[serde(skip)]
    pub name: String,
    /// Alerta user to associate with issued keys.
    pub user: String,
    /// Alerta scopes granted to issued keys.
    pub scopes: Vec<String>,
    /// Human-readable description, embedded in the key annotation.
    pub description: String,
    /// Default lease duration; zero defers to the host default.
    #[serde(with = "duration_secs")]
    pub ttl: Duration,
    /// Upper bound on the lease duration; zero defers to the host default.
    #[serde(rename = "max_ttl", with = "duration_secs")]
    pub max_ttl: Duration,
}

impl RoleEntry {
    /// Response data for a role read: everything except the name,
    /// durations in seconds.
    pub fn to_response_data(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut data = serde_json::Map::new();
        data.insert("user".to_string(), self.user.clone().into());
        data.insert("scopes".to_string(), self.scopes.clone().into());
        data.insert("description".to_string(), self.description.clone().into());
        data.insert("ttl".to_string(), self.ttl.as_secs().into());
        data.insert("max_ttl".to_string(), self.max_ttl.as_secs().into());
        data
    }
}

/// Fields supplied on a role write; `None` means "not supplied".
#[derive(Debug, Clone, Default)]
pub struct RoleUpdate {
    pub user: Option<String>,
    pub scopes: Option<Vec<String>>,
    pub description: Option<String>,
    pub ttl: Option<Duration>,
    pub max_ttl: Option<Duration>,
}

/// Merge a role write onto the existing entry (if any) and validate the
/// result.
///
/// On create, `user` and `scopes` are required and `description`/`ttl`/
/// `max_ttl` fall back to their defaults. On update, omitted fields keep
/// their stored values. The merged entry is rejected when both durations
/// are nonzero and `ttl > max_ttl`.
pub fn apply_role_write(
    name: &str,
    existing: Option<RoleEntry>,
    update: RoleUpdate,
    create: bool,
) -> Result<RoleEntry> {
    let mut entry = match existing {
        Some(entry) => entry,
        None => RoleEntry {
            name: name.to_string(),
            user: String::new(),
            scopes: Vec::new(),
            description: DEFAULT_DESCRIPTION.to_string(),
            ttl: Duration::ZERO,
            max_ttl: DEFAULT_MAX_TTL,
        },
    };
    entry.name = name.to_string();

    match update.user {
        Some(user) => entry.user = user,
        None if create => return Err(Error::validation_field("user is required", "user")),
        None => {}
    }

    match update.scopes {
        Some(scopes) => entry.scopes = scopes,
        None if create => return Err(Error::validation_field("scopes is required", "scopes")),
        None => {}
    }

    if let Some(description) = update.description {
        entry.description = description;
    }
    if let Some(ttl) = update.ttl {
        entry.ttl = ttl;
    }
    if let Some(max_ttl) = update.max_ttl {
        entry.max_ttl = max_ttl;
    }

    if entry.max_ttl > Duration::ZERO && entry.ttl > entry.max_ttl {
        return Err(Error::validation("ttl cannot be greater than max_ttl"));
    }

    Ok(entry)
}

/// Fetch a role by name, or `None` if absent.
pub async fn get_role(storage: &dyn StorageBackend, name: &str) -> Result<Option<RoleEntry>> {
    if name.is_empty() {
        return Err(Error::validation("missing role name"));
    }

    let entry: Option<RoleEntry> =
        storage::get_json(storage, &format!("{}{}", ROLE_PREFIX, name)).await?;
    Ok(entry.map(|mut entry| {
        entry.name = name.to_string();
        entry
    }))
}

/// Persist a role entry under its name.
pub async fn set_role(storage: &dyn StorageBackend, entry: &RoleEntry) -> Result<()> {
    storage::put_json(storage, &format!("{}{}", ROLE_PREFIX, entry.name), entry).await
}

/// Delete a role. Deleting an absent role is not an error, and no
/// cascading revocation happens here; outstanding leases stay with the
/// host's lease manager.
pub async fn delete_role(storage: &dyn StorageBackend, name: &str) -> Result<()> {
    storage.delete(&format!("{}{}", ROLE_PREFIX, name)).await
}

/// List role names in lexicographic order.
pub async fn list_roles(storage: &dyn StorageBackend) -> Result<Vec<String>> {
    storage.list(ROLE_PREFIX).await
}
