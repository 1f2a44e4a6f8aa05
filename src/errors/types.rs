//! # Error Types
//!
//! Error taxonomy for the secrets engine using `thiserror`.
//!
//! The variants map one-to-one onto the failure classes the host cares
//! about: configuration problems are recoverable by reconfiguring,
//! validation and not-found errors are caller mistakes that must not be
//! retried blindly, and the two remote classes separate "could not reach
//! the Alerta API" from "the Alerta API answered but misbehaved".

use thiserror::Error;

/// Custom result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Alerta secrets engine.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid backend configuration (API URL / auth key).
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Bad input on a write operation; rejected synchronously, no partial write.
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// Role absent at issuance or renewal time.
    #[error("Role not found: {name}")]
    NotFound { name: String },

    /// Backing key/value store failure.
    #[error("Storage error: {context}")]
    Storage {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON encode/decode failure at the storage boundary.
    #[error("Serialization error: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Network or timeout failure reaching the Alerta API.
    #[error("Remote API unreachable: {context}")]
    RemoteTransport {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// The Alerta API was reachable but returned an unexpected status code,
    /// an undecodable body, an unparseable timestamp, or a non-"ok" envelope.
    #[error("Remote API protocol error: {message}")]
    RemoteProtocol { message: String },
}

impl Error {
    /// Create a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create a validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error naming the offending field.
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create a not found error for a role.
    pub fn not_found<S: Into<String>>(name: S) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a storage error without an underlying cause.
    pub fn storage<S: Into<String>>(context: S) -> Self {
        Self::Storage { context: context.into(), source: None }
    }

    /// Create a storage error wrapping an underlying cause.
    pub fn storage_with_source<S: Into<String>>(
        context: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Storage { context: context.into(), source: Some(source) }
    }

    /// Create a serialization error with context.
    pub fn serialization<S: Into<String>>(context: S, source: serde_json::Error) -> Self {
        Self::Serialization { context: context.into(), source }
    }

    /// Create a remote transport error with context.
    pub fn remote_transport<S: Into<String>>(context: S, source: reqwest::Error) -> Self {
        Self::RemoteTransport { context: context.into(), source }
    }

    /// Create a remote protocol error.
    pub fn remote_protocol<S: Into<String>>(message: S) -> Self {
        Self::RemoteProtocol { message: message.into() }
    }

    /// Check if this error should be retried by the host's lease manager.
    ///
    /// Transport and protocol failures against the remote API are transient
    /// from the host's perspective (revocation in particular must be
    /// retryable); configuration, validation, and not-found errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::RemoteTransport { .. } | Error::RemoteProtocol { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization { context: "JSON serialization failed".to_string(), source: error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let err = Error::config("auth key missing");
        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(err.to_string(), "Configuration error: auth key missing");

        let err = Error::validation_field("scopes is required", "scopes");
        assert!(matches!(err, Error::Validation { field: Some(_), .. }));

        let err = Error::not_found("svc");
        assert_eq!(err.to_string(), "Role not found: svc");
    }

    #[test]
    fn test_retryable_errors() {
        assert!(Error::remote_protocol("unexpected status code: 500").is_retryable());
        assert!(!Error::validation("ttl cannot be greater than max_ttl").is_retryable());
        assert!(!Error::not_found("svc").is_retryable());
        assert!(!Error::config("not configured").is_retryable());
    }

    #[test]
    fn test_serialization_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: Error = json_error.into();
        assert!(matches!(err, Error::Serialization { .. }));
        assert!(err.to_string().contains("JSON serialization failed"));
    }
}
