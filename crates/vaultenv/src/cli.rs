use crate::credentials::{CredentialError, PromptStream};
use crate::picker::SelectError;
use crate::pull::{DEFAULT_METADATA_PATH, DEFAULT_STAGES, PullOptions};
use crate::tracing::{LogLevel, TracingConfig, TracingFormat};
use clap::Parser;
use miette::{Diagnostic, Report};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;
use vaultenv_secrets::{DEFAULT_ENV_FILE, EnvFileError};
use vaultenv_vault::VaultError;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// Any fatal error
pub const EXIT_FATAL: i32 = 1;

/// Fatal errors, one variant per failure class
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// Credentials could not be obtained
    #[error("Credential error: {message}")]
    #[diagnostic(code(vaultenv::credentials))]
    Credentials {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// The secret service rejected or failed a call
    #[error("Vault error: {message}")]
    #[diagnostic(code(vaultenv::remote))]
    Remote {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// A prompt was cancelled or the terminal failed
    #[error("Interaction error: {message}")]
    #[diagnostic(code(vaultenv::interaction))]
    Interaction {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Local file or process I/O failed
    #[error("I/O error: {message}")]
    #[diagnostic(code(vaultenv::io))]
    Io {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new remote error
    #[must_use]
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new I/O error
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            help: None,
        }
    }

    /// Add help text to an existing error, returning a new error with the help text set.
    #[must_use]
    pub fn with_help(self, help_text: impl Into<String>) -> Self {
        let help = Some(help_text.into());
        match self {
            Self::Credentials { message, .. } => Self::Credentials { message, help },
            Self::Remote { message, .. } => Self::Remote { message, help },
            Self::Interaction { message, .. } => Self::Interaction { message, help },
            Self::Io { message, .. } => Self::Io { message, help },
        }
    }

    /// Wrap a Vault failure with the step that was being performed.
    #[must_use]
    pub fn vault(step: &str, err: &VaultError) -> Self {
        let error = Self::remote(format!("{step}: {err}"));
        match err {
            VaultError::InvalidAddress { .. } | VaultError::InvalidToken => error.with_help(
                "Fix the url/token in the credential file, or delete it to be prompted again",
            ),
            VaultError::Unauthorized { .. } => {
                error.with_help("Check that the token is valid and its policy allows this path")
            }
            VaultError::Network(_) => error.with_help("Check that the Vault server is reachable"),
            VaultError::NotFound { .. } => error.with_help("Check that the path exists in Vault"),
            _ => error,
        }
    }

    /// Short machine-readable name of the failure class.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Credentials { .. } => "credentials",
            Self::Remote { .. } => "remote",
            Self::Interaction { .. } => "interaction",
            Self::Io { .. } => "io",
        }
    }
}

impl From<CredentialError> for CliError {
    fn from(err: CredentialError) -> Self {
        let help = match err {
            CredentialError::NoHomeDir => "Pass --config <PATH> to choose the credential file",
            CredentialError::Prompt { .. } | CredentialError::InputClosed { .. } => {
                "Run vaultenv from an interactive terminal, or create the credential file first"
            }
        };
        Self::Credentials {
            message: err.to_string(),
            help: Some(help.to_string()),
        }
    }
}

impl From<SelectError> for CliError {
    fn from(err: SelectError) -> Self {
        match err {
            SelectError::Cancelled => Self::Interaction {
                message: err.to_string(),
                help: None,
            },
            SelectError::Terminal(_) => Self::Interaction {
                message: err.to_string(),
                help: Some("Run vaultenv from an interactive terminal".to_string()),
            },
        }
    }
}

impl From<EnvFileError> for CliError {
    fn from(err: EnvFileError) -> Self {
        Self::io(err.to_string())
            .with_help("Check that the output directory exists and is writable")
    }
}

/// Render error appropriately based on JSON flag
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        let error_envelope = ErrorEnvelope::new(serde_json::json!({
            "code": err.code(),
            "message": err.to_string(),
        }));

        match serde_json::to_string(&error_envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
        let _ = io::stderr().flush();
    }
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkEnvelope<T> {
    /// Status indicator - always "ok" for success
    pub status: &'static str,
    /// The actual data payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Pull secrets from Vault into a local env file.
///
/// Asks for a stage and a resource, reads `<stage>/data/<resource>` and
/// writes every entry as a `KEY=value` line.
#[derive(Parser, Debug)]
#[command(name = "vaultenv")]
#[command(about = "Pull secrets from Vault into a local .env file")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// Credential file holding the Vault url and token.
    #[arg(long, env = "VAULTENV_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// File the secrets are written to.
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_ENV_FILE)]
    pub output: PathBuf,

    /// Stage offered in the stage picker; repeat for several.
    #[arg(
        long = "stage",
        value_name = "NAME",
        env = "VAULTENV_STAGES",
        value_delimiter = ',',
        default_values_t = DEFAULT_STAGES.map(String::from)
    )]
    pub stages: Vec<String>,

    /// Path listed to find the resources to choose from.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_METADATA_PATH)]
    pub metadata_path: String,

    /// Logging verbosity level.
    #[arg(
        short = 'l',
        long,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = TracingFormat::Compact)]
    pub log_format: TracingFormat,

    /// Log filter directives, replaces `RUST_LOG` and `--level`.
    #[arg(long, value_name = "DIRECTIVES")]
    pub log_filter: Option<String>,

    /// Emit JSON logs and a JSON result envelope.
    #[arg(long, help = "Emit JSON logs and a JSON result envelope")]
    pub json: bool,
}

impl Cli {
    /// Log format after applying `--json`.
    #[must_use]
    pub const fn effective_log_format(&self) -> TracingFormat {
        if self.json {
            TracingFormat::Json
        } else {
            self.log_format
        }
    }

    /// Tracing setup from the logging flags.
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig {
            format: self.effective_log_format(),
            level: self.level.into(),
            filter: self.log_filter.clone(),
        }
    }

    /// Where credential prompts go; stdout is reserved for the envelope under `--json`.
    #[must_use]
    pub const fn prompt_stream(&self) -> PromptStream {
        if self.json {
            PromptStream::Stderr
        } else {
            PromptStream::Stdout
        }
    }

    /// Options for [`crate::pull::pull`].
    #[must_use]
    pub fn pull_options(&self) -> PullOptions {
        PullOptions {
            stages: self.stages.clone(),
            metadata_path: self.metadata_path.clone(),
            output: self.output.clone(),
        }
    }
}
