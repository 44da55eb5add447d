//! vaultenv - pull secrets from Vault into a local `.env` file
//!
//! The binary asks for a deployment stage and a resource, reads
//! `<stage>/data/<resource>` from a KV v2 mount and writes every entry as a
//! `KEY=value` line. The Vault address and token come from
//! `~/.vaultconf.ini` and are asked for once when that file is unusable.
//!
//! The pieces are exposed so the flow can be driven without a terminal:
//!
//! ```ignore
//! use vaultenv::picker::Selector;
//! use vaultenv::pull::{PullOptions, pull};
//! use vaultenv_vault::SecretClient;
//!
//! let client = SecretClient::connect("https://vault.example.com", &token)?;
//! let summary = pull(&client, &PullOptions::default(), &mut my_selector).await?;
//! ```

// Error rendering writes straight to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

/// CLI argument parsing, errors and exit codes.
pub mod cli;
/// Credential file and interactive prompt.
pub mod credentials;
/// Interactive selection.
pub mod picker;
/// The pull flow.
pub mod pull;
/// Tracing setup.
pub mod tracing;

pub use cli::{Cli, CliError};
pub use credentials::{CredentialStore, Credentials, PromptStream};
pub use picker::{FuzzyPicker, SelectError, Selector};
pub use pull::{PullOptions, PullSummary};
