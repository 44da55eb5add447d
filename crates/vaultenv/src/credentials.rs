//! Vault endpoint and token, kept in `~/.vaultconf.ini`
//!
//! ```ini
//! [credentials]
//! url = https://vault.example.com
//! token = hvs.XXXXXXXX
//! ```
//!
//! When the file is missing or unusable the user is asked for both values on
//! standard input and the file is written for the next run.

use ini::Ini;
use secrecy::{ExposeSecret, SecretString};
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the credential file inside the home directory.
pub const CONFIG_FILE_NAME: &str = ".vaultconf.ini";

const SECTION: &str = "credentials";
const URL_KEY: &str = "url";
const TOKEN_KEY: &str = "token";

/// Vault address and token used for the whole run.
#[derive(Clone)]
pub struct Credentials {
    /// Vault server address
    pub url: String,
    /// Vault token
    pub token: SecretString,
}

impl Credentials {
    /// Create credentials from plain values.
    #[must_use]
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: SecretString::from(token.into()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Errors that stop credential loading.
///
/// A missing or malformed file is not one of them; that falls back to
/// prompting.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The home directory could not be determined
    #[error("Could not determine home directory for .vaultconf.ini")]
    NoHomeDir,

    /// Reading the prompt answer failed
    #[error("Failed to read {field} from standard input: {source}")]
    Prompt {
        /// Value being prompted for
        field: &'static str,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Input ended before an answer was given
    #[error("Standard input closed before {field} was entered")]
    InputClosed {
        /// Value being prompted for
        field: &'static str,
    },
}

/// Why the file could not be used. Only logged.
#[derive(Debug, Error)]
enum FileProblem {
    #[error(transparent)]
    Unreadable(#[from] ini::Error),
    #[error("missing or empty '{0}' in [credentials]")]
    MissingKey(&'static str),
}

/// Terminal stream the credential prompts are printed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptStream {
    /// Standard output
    #[default]
    Stdout,
    /// Standard error, keeps stdout free for machine-readable output
    Stderr,
}

/// Reads, prompts for, and saves [`Credentials`].
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    prompts: PromptStream,
}

impl CredentialStore {
    /// Store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            prompts: PromptStream::default(),
        }
    }

    /// Print prompts on `stream` instead of stdout.
    #[must_use]
    pub const fn with_prompt_stream(mut self, stream: PromptStream) -> Self {
        self.prompts = stream;
        self
    }

    /// Stream used by [`load`](Self::load) for prompts.
    #[must_use]
    pub const fn prompt_stream(&self) -> PromptStream {
        self.prompts
    }

    /// Store backed by `<home>/.vaultconf.ini`.
    pub fn in_home_dir() -> Result<Self, CredentialError> {
        let home = dirs::home_dir().ok_or(CredentialError::NoHomeDir)?;
        Ok(Self::new(home.join(CONFIG_FILE_NAME)))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load credentials, prompting on the terminal if the file is unusable.
    pub fn load(&self) -> Result<Credentials, CredentialError> {
        let stdin = io::stdin();
        match self.prompts {
            PromptStream::Stdout => self.load_with(stdin.lock(), io::stdout()),
            PromptStream::Stderr => self.load_with(stdin.lock(), io::stderr()),
        }
    }

    /// Load credentials, prompting through `input`/`output` if the file is
    /// unusable.
    ///
    /// Newly entered values are saved before returning. Saving is best
    /// effort: a failure is logged as a warning and the entered values are
    /// still returned.
    pub fn load_with<R: BufRead, W: Write>(
        &self,
        mut input: R,
        mut output: W,
    ) -> Result<Credentials, CredentialError> {
        match self.read() {
            Ok(credentials) => {
                tracing::debug!(path = %self.path.display(), "Loaded credentials");
                return Ok(credentials);
            }
            Err(problem) => {
                tracing::info!(
                    path = %self.path.display(),
                    reason = %problem,
                    "Credential file unusable, prompting"
                );
            }
        }

        let url = prompt(&mut input, &mut output, URL_KEY)?;
        let token = prompt(&mut input, &mut output, TOKEN_KEY)?;
        let credentials = Credentials::new(url, token);

        match self.save(&credentials) {
            Ok(()) => tracing::info!(path = %self.path.display(), "Saved credentials"),
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Could not save credentials, using them for this run only"
            ),
        }

        Ok(credentials)
    }

    fn read(&self) -> Result<Credentials, FileProblem> {
        let conf = Ini::load_from_file(&self.path)?;
        let section = conf.section(Some(SECTION));
        let value = |key: &'static str| {
            section
                .and_then(|s| s.get(key))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .ok_or(FileProblem::MissingKey(key))
        };

        Ok(Credentials::new(value(URL_KEY)?, value(TOKEN_KEY)?))
    }

    /// Write `credentials` to the backing file, replacing its content.
    ///
    /// Parent directories are created. On unix the file is only readable by
    /// its owner.
    pub fn save(&self, credentials: &Credentials) -> io::Result<()> {
        let mut conf = Ini::new();
        conf.with_section(Some(SECTION))
            .set(URL_KEY, credentials.url.as_str())
            .set(TOKEN_KEY, credentials.token.expose_secret());

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        // mode() only applies on creation; an existing file keeps its bits
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        conf.write_to(&mut file)?;
        file.flush()
    }
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    field: &'static str,
) -> Result<String, CredentialError> {
    let io_err = |source| CredentialError::Prompt { field, source };

    write!(output, "Enter {field}: ").map_err(io_err)?;
    output.flush().map_err(io_err)?;

    let mut line = String::new();
    let read = input.read_line(&mut line).map_err(io_err)?;
    if read == 0 {
        return Err(CredentialError::InputClosed { field });
    }

    Ok(line.trim().to_string())
}
