//! `HashiCorp` Vault integration for vaultenv
//!
//! This crate talks to the Vault logical API and unwraps its responses into
//! [`SecretDocument`](vaultenv_secrets::SecretDocument)s.
//!
//! - [`LogicalBackend`] is the transport seam (list and read a raw path)
//! - [`HttpBackend`] implements it over the Vault HTTP API
//! - [`SecretClient`] checks the response shape and unwraps the payload

mod backend;
mod client;
mod error;
mod http;
mod path;

pub use backend::{LogicalBackend, LogicalResponse};
pub use client::SecretClient;
pub use error::VaultError;
pub use http::HttpBackend;
pub use path::SecretPath;
