//! The pull flow: credentials, listing, two selections, read, write.
//!
//! Every step runs in order and the first failure ends the run. Nothing is
//! retried and a partially written output file is left as it is.

use crate::cli::CliError;
use crate::credentials::CredentialStore;
use crate::picker::Selector;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use vaultenv_secrets::{DEFAULT_ENV_FILE, EnvFile};
use vaultenv_vault::{LogicalBackend, SecretClient, SecretPath};

/// Stages offered when none are configured.
pub const DEFAULT_STAGES: [&str; 2] = ["development", "staging"];

/// Path listed to discover resources.
pub const DEFAULT_METADATA_PATH: &str = "staging/metadata";

/// What to offer and where to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullOptions {
    /// Stage names offered in the first picker, in order
    pub stages: Vec<String>,
    /// Path whose listing provides the resource names
    pub metadata_path: String,
    /// Output file
    pub output: PathBuf,
}

impl Default for PullOptions {
    fn default() -> Self {
        Self {
            stages: DEFAULT_STAGES.map(String::from).to_vec(),
            metadata_path: DEFAULT_METADATA_PATH.to_string(),
            output: PathBuf::from(DEFAULT_ENV_FILE),
        }
    }
}

/// Result of a successful pull. Carries key counts only, never values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullSummary {
    /// Selected stage
    pub stage: String,
    /// Selected resource
    pub resource: String,
    /// Secret path that was read
    pub path: String,
    /// File that was written
    pub output: PathBuf,
    /// Number of entries written
    pub count: usize,
}

impl fmt::Display for PullSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} secrets from {} to {}",
            self.count,
            self.path,
            self.output.display()
        )
    }
}

/// Run the whole flow against the Vault server named in the credential file.
pub async fn run<S: Selector + ?Sized>(
    options: &PullOptions,
    store: &CredentialStore,
    selector: &mut S,
) -> Result<PullSummary, CliError> {
    let credentials = store.load()?;
    tracing::debug!(url = %credentials.url, "Credentials ready");

    let client = SecretClient::connect(&credentials.url, &credentials.token)
        .map_err(|e| CliError::vault("Failed to create Vault client", &e))?;

    pull(&client, options, selector).await
}

/// Run the flow from the listing step on, with an already built client.
#[tracing::instrument(
    name = "pull",
    skip_all,
    fields(metadata_path = %options.metadata_path, output = %options.output.display())
)]
pub async fn pull<B, S>(
    client: &SecretClient<B>,
    options: &PullOptions,
    selector: &mut S,
) -> Result<PullSummary, CliError>
where
    B: LogicalBackend,
    S: Selector + ?Sized,
{
    let resources = client.list(&options.metadata_path).await.map_err(|e| {
        CliError::vault(
            &format!("Failed to list resources under '{}'", options.metadata_path),
            &e,
        )
    })?;
    tracing::info!(count = resources.len(), "Listed resources");

    let stage = selector.choose("Select stage", &options.stages)?;
    let resource = selector.choose("Select resource", &resources)?;
    tracing::info!(stage = %stage, resource = %resource, "Selection complete");

    let path = SecretPath::kv2(&stage, &resource);
    let document = client
        .read(path.as_str())
        .await
        .map_err(|e| CliError::vault(&format!("Failed to read secret '{path}'"), &e))?;
    tracing::info!(path = %path, count = document.len(), "Read secret");

    let env_file = EnvFile::new(&options.output);
    let count = env_file.write(&document)?;
    tracing::info!(output = %env_file.path().display(), count, "Wrote environment file");

    Ok(PullSummary {
        stage,
        resource,
        path: path.to_string(),
        output: options.output.clone(),
        count,
    })
}
