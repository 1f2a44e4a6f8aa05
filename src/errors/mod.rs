//! Error types for the Alerta secrets engine.
//!
//! All fallible operations in this crate return [`Result`] with the single
//! [`Error`] enum defined in [`types`]. Underlying causes (storage, JSON,
//! HTTP transport) are wrapped as sources, never replaced, so operators can
//! distinguish "remote API down" from "remote API rejected the request".

pub mod types;

pub use types::{Error, Result};
