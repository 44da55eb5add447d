//! Secret documents for vaultenv
//!
//! Provides the typed model for a secret fetched from the secret service and
//! the writer that turns it into a local `.env` file.
//!
//! # Writing a document
//!
//! ```ignore
//! use vaultenv_secrets::{EnvFile, SecretDocument};
//!
//! let mut doc = SecretDocument::new();
//! doc.insert("DATABASE_URL", "postgres://localhost/app");
//! doc.insert("PORT", 5432_i64);
//!
//! // Truncates any previous content
//! EnvFile::new(".env").write(&doc)?;
//! ```

mod env_file;
mod types;

pub use env_file::{DEFAULT_ENV_FILE, EnvFile, EnvFileError};
pub use types::{SecretDocument, SecretValue};
