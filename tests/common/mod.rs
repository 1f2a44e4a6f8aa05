//! Shared test harness: a wiremock stand-in for the Alerta API plus
//! request helpers.
//!
//! The mock only answers requests carrying the auth key the tests
//! configure, so a client built from stale or missing configuration
//! fails to match and the test fails loudly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Duration, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, Request as HttpRequest, ResponseTemplate};

use alerta_secrets::{Backend, Operation, Request, Response, Result};

/// Auth key used by every harness-configured backend.
pub const TEST_AUTH_KEY: &str = "test-auth-key";

/// Mock Alerta server answering `POST /key` and `DELETE /key/{id}`.
pub struct AlertaMock {
    pub server: MockServer,
}

impl AlertaMock {
    /// Start a mock that issues a unique key per create call. The
    /// response `expireTime` echoes the requested hint, or defaults to
    /// now + 1h when the request carried none.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let counter = Arc::new(AtomicU64::new(0));

        Mock::given(method("POST"))
            .and(path("/key"))
            .and(header("Authorization", format!("Key {}", TEST_AUTH_KEY).as_str()))
            .respond_with(move |request: &HttpRequest| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let body: Value =
                    serde_json::from_slice(&request.body).unwrap_or_else(|_| json!({}));
                let expire_time = body
                    .get("expireTime")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        (Utc::now() + Duration::hours(1))
                            .to_rfc3339_opts(SecondsFormat::Millis, true)
                    });

                ResponseTemplate::new(201).set_body_json(json!({
                    "data": {
                        "id": format!("key-id-{}", n),
                        "key": format!("key-secret-{}", n),
                        "expireTime": expire_time,
                    },
                    "status": "ok",
                }))
            })
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path_regex(r"^/key/.+$"))
            .and(header("Authorization", format!("Key {}", TEST_AUTH_KEY).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;

        Self { server }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// IDs of every key the backend asked the mock to delete.
    pub async fn deleted_key_ids(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.method.to_string() == "DELETE")
            .map(|request| request.url.path().trim_start_matches("/key/").to_string())
            .collect()
    }
}

/// Shorthand for building request data out of a `json!` object literal.
pub fn data(value: Value) -> Map<String, Value> {
    value.as_object().expect("request data must be a JSON object").clone()
}

/// Write the engine configuration pointing at `api_url`.
pub async fn configure(backend: &Backend, api_url: &str) -> Result<Response> {
    backend
        .handle_request(Request::new(
            Operation::Create,
            "config",
            data(json!({"api_url": api_url, "auth_key": TEST_AUTH_KEY})),
        ))
        .await
}

/// Create a role with the given TTLs in seconds.
pub async fn create_role(
    backend: &Backend,
    name: &str,
    ttl_secs: u64,
    max_ttl_secs: u64,
) -> Result<Response> {
    backend
        .handle_request(Request::new(
            Operation::Create,
            format!("role/{}", name),
            data(json!({
                "user": "svc@example.com",
                "scopes": ["write:alerts"],
                "ttl": ttl_secs,
                "max_ttl": max_ttl_secs,
            })),
        ))
        .await
}
