//! Engine configuration: the remote Alerta endpoint and its auth key.
//!
//! The configuration is a singleton stored at a fixed path. It is either
//! wholly absent or carries both fields once a client has been built from
//! it; any successful write or delete invalidates the cached client so the
//! next credential operation observes the new values.

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::storage::{self, StorageBackend};

/// Fixed storage path for the engine configuration.
pub const CONFIG_PATH: &str = "config";

/// Minimum configuration required to instantiate an Alerta client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the Alerta API, e.g. `https://alerta.example.com/api`.
    pub api_url: String,
    /// Authentication key sent as `Authorization: Key <auth_key>`.
    pub auth_key: String,
}

/// Read the stored configuration, or `None` if the engine is unconfigured.
pub async fn read_config(storage: &dyn StorageBackend) -> Result<Option<EngineConfig>> {
    storage::get_json(storage, CONFIG_PATH).await
}

/// Persist the configuration. Callers must invalidate the client cache
/// after a successful write.
pub async fn write_config(storage: &dyn StorageBackend, config: &EngineConfig) -> Result<()> {
    storage::put_json(storage, CONFIG_PATH, config).await
}

/// Remove the configuration. Callers must invalidate the client cache
/// after a successful delete.
pub async fn delete_config(storage: &dyn StorageBackend) -> Result<()> {
    storage.delete(CONFIG_PATH).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn test_config_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(read_config(&storage).await.unwrap(), None);

        let config = EngineConfig {
            api_url: "https://alerta.example.com/api".to_string(),
            auth_key: "demo-key".to_string(),
        };
        write_config(&storage, &config).await.unwrap();
        assert_eq!(read_config(&storage).await.unwrap(), Some(config));

        delete_config(&storage).await.unwrap();
        assert_eq!(read_config(&storage).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_config_wire_layout() {
        let storage = MemoryStorage::new();
        let config = EngineConfig {
            api_url: "https://alerta.example.com/api".to_string(),
            auth_key: "demo-key".to_string(),
        };
        write_config(&storage, &config).await.unwrap();

        let raw = storage.get(CONFIG_PATH).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(value["api_url"], "https://alerta.example.com/api");
        assert_eq!(value["auth_key"], "demo-key");
    }
}
