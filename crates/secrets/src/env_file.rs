//! `.env` file output

use crate::SecretDocument;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default output file name, relative to the current directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Errors raised while writing an environment file
#[derive(Debug, Error)]
pub enum EnvFileError {
    /// The file could not be opened, written or flushed
    #[error("Failed to write environment file '{}': {source}", path.display())]
    Write {
        /// Target path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Writes a [`SecretDocument`] as plain `KEY=value` lines.
///
/// Values are rendered with [`SecretValue`](crate::SecretValue)'s `Display`
/// and are not quoted or escaped.
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
}

impl EnvFile {
    /// Create a writer targeting `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the document, replacing any existing content.
    ///
    /// Returns the number of lines written. A failure part way through
    /// leaves whatever was already written in place.
    pub fn write(&self, document: &SecretDocument) -> Result<usize, EnvFileError> {
        self.write_inner(document).map_err(|source| EnvFileError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn write_inner(&self, document: &SecretDocument) -> io::Result<usize> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);

        for (key, value) in document.iter() {
            if !value.is_scalar() {
                tracing::debug!(key, "Writing nested value as JSON");
            }
            writeln!(writer, "{key}={value}")?;
        }

        writer.flush()?;
        tracing::debug!(
            path = %self.path.display(),
            lines = document.len(),
            "Environment file written"
        );
        Ok(document.len())
    }
}

impl Default for EnvFile {
    fn default() -> Self {
        Self::new(DEFAULT_ENV_FILE)
    }
}
