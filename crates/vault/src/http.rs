//! Vault HTTP API backend

use crate::{LogicalBackend, LogicalResponse, VaultError};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};

const VAULT_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-vault-token");

/// Talks to the Vault logical API over HTTP(S).
///
/// The token is installed as a default header when the backend is built, so
/// every request made through the single underlying client is authenticated.
#[derive(Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpBackend {
    /// Create a backend for the Vault server at `address`.
    ///
    /// # Errors
    ///
    /// Fails if the address is not an http(s) URL, the token is not a valid
    /// header value, or the HTTP client cannot be built.
    pub fn new(address: &str, token: &SecretString) -> Result<Self, VaultError> {
        let base_url = validate_address(address)?;

        let mut token_value =
            HeaderValue::from_str(token.expose_secret()).map_err(|_| VaultError::InvalidToken)?;
        token_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(VAULT_TOKEN_HEADER, token_value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(user_agent())
            .default_headers(headers)
            .build()
            .map_err(VaultError::ClientBuild)?;

        tracing::debug!(address = %base_url, "Vault HTTP backend created");
        Ok(Self { http, base_url })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/v1/{path}`, each path segment percent-encoded on its own.
    fn endpoint(&self, path: &str) -> Result<Url, VaultError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| VaultError::InvalidAddress {
                address: self.base_url.to_string(),
                reason: "address cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .push("v1")
            .extend(path.split('/'));
        Ok(url)
    }

    async fn send(&self, path: &str, list: bool) -> Result<Option<LogicalResponse>, VaultError> {
        let path = path.trim_matches('/');
        let mut request = self.http.get(self.endpoint(path)?);
        if list {
            request = request.query(&[("list", "true")]);
        }

        tracing::debug!(path, list, "Vault request");
        let response = request.send().await.map_err(VaultError::Network)?;
        let status = response.status();
        tracing::debug!(path, status = status.as_u16(), "Vault response");

        match status.as_u16() {
            200 => {
                let body = response
                    .json::<LogicalResponse>()
                    .await
                    .map_err(VaultError::Network)?;
                for warning in body.warnings.iter().flatten() {
                    tracing::warn!(path, warning = %warning, "Vault returned a warning");
                }
                Ok(Some(body))
            }
            204 => Ok(Some(LogicalResponse::default())),
            404 => Ok(None),
            401 | 403 => Err(VaultError::Unauthorized {
                path: path.to_string(),
            }),
            status @ 500..=599 => Err(VaultError::Server {
                path: path.to_string(),
                status,
            }),
            status => Err(VaultError::UnexpectedStatus {
                path: path.to_string(),
                status,
            }),
        }
    }
}

#[async_trait]
impl LogicalBackend for HttpBackend {
    async fn list(&self, path: &str) -> Result<Option<LogicalResponse>, VaultError> {
        self.send(path, true).await
    }

    async fn read(&self, path: &str) -> Result<Option<LogicalResponse>, VaultError> {
        self.send(path, false).await
    }
}

fn user_agent() -> String {
    format!("vaultenv/{}", env!("CARGO_PKG_VERSION"))
}

/// Check the address is an http(s) URL and normalise away trailing slashes.
fn validate_address(address: &str) -> Result<Url, VaultError> {
    let trimmed = address.trim().trim_end_matches('/');
    let invalid = |reason: &str| VaultError::InvalidAddress {
        address: address.to_string(),
        reason: reason.to_string(),
    };

    if trimmed.is_empty() {
        return Err(invalid("address is empty"));
    }

    let url = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
    match url.scheme() {
        "https" => {}
        "http" => {
            let local = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));
            if !local {
                tracing::warn!(address = trimmed, "Vault address uses plain http");
            }
        }
        other => return Err(invalid(&format!("unsupported scheme '{other}'"))),
    }

    Ok(url)
}
