//! Namespaced key/value storage boundary.
//!
//! The engine persists its configuration and role entries through the
//! host's storage, modeled here as the [`StorageBackend`] trait: a flat,
//! namespaced get/put/delete/list store holding JSON-encoded values.
//! Hosts supply their own implementation; [`MemoryStorage`] is provided
//! for embedding and tests.
//!
//! # Layout
//!
//! - `config` — engine configuration (`{api_url, auth_key}`)
//! - `role/<name>` — role definitions
//!
//! # Security Considerations
//!
//! Values include the Alerta auth key; implementations SHOULD encrypt at
//! rest and MUST NOT log stored values.

pub mod memory;

pub use memory::MemoryStorage;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{Error, Result};

/// Trait for the host's namespaced key/value store.
///
/// All operations are async and fallible; implementations map their own
/// failure type into [`Error::Storage`].
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Fetch the raw value at `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` at `key`, overwriting any previous value.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Delete the value at `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// List the key suffixes under `prefix`, in lexicographic order.
    ///
    /// For example, with entries at `role/a` and `role/b`,
    /// `list("role/")` returns `["a", "b"]`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Fetch and JSON-decode the entry at `key`.
pub async fn get_json<T: DeserializeOwned>(
    storage: &dyn StorageBackend,
    key: &str,
) -> Result<Option<T>> {
    match storage.get(key).await? {
        Some(raw) => {
            let value = serde_json::from_slice(&raw)
                .map_err(|e| Error::serialization(format!("error decoding entry '{}'", key), e))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// JSON-encode `value` and store it at `key`.
pub async fn put_json<T: Serialize>(
    storage: &dyn StorageBackend,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_vec(value)
        .map_err(|e| Error::serialization(format!("error encoding entry '{}'", key), e))?;
    storage.put(key, raw).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Entry {
        value: String,
    }

    #[tokio::test]
    async fn test_json_round_trip() {
        let storage = MemoryStorage::new();
        let entry = Entry { value: "hello".to_string() };

        put_json(&storage, "test/entry", &entry).await.unwrap();
        let fetched: Option<Entry> = get_json(&storage, "test/entry").await.unwrap();
        assert_eq!(fetched, Some(entry));
    }

    #[tokio::test]
    async fn test_get_json_absent_key() {
        let storage = MemoryStorage::new();
        let fetched: Option<Entry> = get_json(&storage, "missing").await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_get_json_malformed_value() {
        let storage = MemoryStorage::new();
        storage.put("bad", b"not json".to_vec()).await.unwrap();

        let result: Result<Option<Entry>> = get_json(&storage, "bad").await;
        assert!(matches!(result, Err(Error::Serialization { .. })));
    }
}
