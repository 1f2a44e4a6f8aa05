//! Remote Alerta API client.
//!
//! A stateless wrapper over `reqwest` that issues the two calls this
//! engine needs: create an API key (`POST /key`) and delete one
//! (`DELETE /key/{id}`). Every request carries the configured auth key
//! and is bounded by a fixed timeout; cancellation is inherited from the
//! caller dropping the future.
//!
//! A response only counts as success when both the HTTP status matches
//! the documented code for the operation (201 for create, 200 for
//! delete) and the decoded envelope's `status` field is `"ok"`. The two
//! checks fail with distinct messages so operators can tell a
//! transport-level rejection from a remote-side one.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::EngineConfig;
use crate::errors::{Error, Result};

/// Bound on every remote call; the engine never blocks indefinitely on
/// the Alerta API.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the Alerta key-issuing API.
///
/// Derived deterministically from the current [`EngineConfig`]; the
/// backend caches at most one instance and rebuilds it after any
/// configuration change.
#[derive(Debug)]
pub struct AlertaClient {
    api_url: String,
    auth_key: String,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct CreateKeyRequest<'a> {
    user: &'a str,
    scopes: &'a [String],
    text: &'a str,
    #[serde(rename = "expireTime", skip_serializing_if = "Option::is_none")]
    expire_time: Option<&'a str>,
}

/// Payload of a successful key creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateKeyData {
    pub id: String,
    pub key: String,
    #[serde(rename = "expireTime")]
    pub expire_time: String,
}

#[derive(Debug, Deserialize)]
struct CreateKeyEnvelope {
    data: CreateKeyData,
    status: String,
}

#[derive(Debug, Deserialize)]
struct DeleteKeyEnvelope {
    status: String,
}

impl AlertaClient {
    /// Build a client from the engine configuration.
    ///
    /// Fails with [`Error::Config`] when either field is empty or the
    /// URL does not parse; an unconfigured engine surfaces here rather
    /// than deeper in a request.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        if config.api_url.is_empty() {
            return Err(Error::config("client API URL was not defined"));
        }
        if config.auth_key.is_empty() {
            return Err(Error::config("client auth key was not defined"));
        }
        Url::parse(&config.api_url)
            .map_err(|e| Error::config(format!("invalid API URL '{}': {}", config.api_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("error building HTTP client: {}", e)))?;

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            auth_key: config.auth_key.clone(),
            http,
        })
    }

    /// Base URL this client was built against.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn request(&self, method: Method, endpoint: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.api_url, endpoint))
            .header(AUTHORIZATION, format!("Key {}", self.auth_key))
    }

    /// Create a new API key for `user` with the given scopes.
    ///
    /// `expire_time`, when supplied, is an RFC 3339 timestamp hint; when
    /// `None` the remote API applies its own default expiry.
    pub async fn create_key(
        &self,
        user: &str,
        scopes: &[String],
        text: &str,
        expire_time: Option<&str>,
    ) -> Result<CreateKeyData> {
        let body = CreateKeyRequest { user, scopes, text, expire_time };

        let response = self
            .request(Method::POST, "/key")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::remote_transport("error creating Alerta API key", e))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            return Err(Error::remote_protocol(format!(
                "unexpected status code creating API key: {}",
                status.as_u16()
            )));
        }

        let envelope: CreateKeyEnvelope = response.json().await.map_err(|e| {
            Error::remote_protocol(format!("malformed create key response: {}", e))
        })?;

        if envelope.status != "ok" {
            return Err(Error::remote_protocol(format!(
                "unexpected remote status creating API key: {}",
                envelope.status
            )));
        }

        tracing::debug!(key_id = %envelope.data.id, user = %user, "Created Alerta API key");
        Ok(envelope.data)
    }

    /// Delete the API key with the given ID.
    pub async fn delete_key(&self, id: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, &format!("/key/{}", id))
            .send()
            .await
            .map_err(|e| Error::remote_transport("error deleting Alerta API key", e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::remote_protocol(format!(
                "unexpected status code deleting API key: {}",
                status.as_u16()
            )));
        }

        let envelope: DeleteKeyEnvelope = response.json().await.map_err(|e| {
            Error::remote_protocol(format!("malformed delete key response: {}", e))
        })?;

        if envelope.status != "ok" {
            return Err(Error::remote_protocol(format!(
                "unexpected remote status deleting API key: {}",
                envelope.status
            )));
        }

        tracing::debug!(key_id = %id, "Deleted Alerta API key");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_url: &str, auth_key: &str) -> EngineConfig {
        EngineConfig { api_url: api_url.to_string(), auth_key: auth_key.to_string() }
    }

    #[test]
    fn test_new_rejects_empty_fields() {
        let err = AlertaClient::new(&config("", "key")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("API URL"));

        let err = AlertaClient::new(&config("https://alerta.example.com", "")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("auth key"));
    }

    #[test]
    fn test_new_rejects_unparseable_url() {
        let err = AlertaClient::new(&config("not a url", "key")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = AlertaClient::new(&config("https://alerta.example.com/api/", "key")).unwrap();
        assert_eq!(client.api_url(), "https://alerta.example.com/api");
    }

    #[test]
    fn test_create_key_request_omits_absent_expiry() {
        let scopes = vec!["write:alerts".to_string()];
        let body = CreateKeyRequest {
            user: "svc@example.com",
            scopes: &scopes,
            text: "issued",
            expire_time: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("expireTime").is_none());

        let body = CreateKeyRequest { expire_time: Some("2026-01-01T00:00:00.000Z"), ..body };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["expireTime"], "2026-01-01T00:00:00.000Z");
    }
}
