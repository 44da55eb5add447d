//! Transport seam between [`SecretClient`](crate::SecretClient) and Vault

use crate::VaultError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Envelope of a Vault logical API response.
///
/// Only the fields vaultenv consumes are kept. `data` is left untyped so the
/// client can report a precise error when it has the wrong shape.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LogicalResponse {
    /// Payload of the response
    #[serde(default)]
    pub data: Option<Value>,

    /// Non-fatal warnings attached by the server
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
}

impl LogicalResponse {
    /// Build a response carrying `data` and no warnings.
    #[must_use]
    pub fn with_data(data: Value) -> Self {
        Self {
            data: Some(data),
            warnings: None,
        }
    }
}

/// Raw access to the Vault logical API.
///
/// `Ok(None)` means the server reported that nothing exists at the path.
#[async_trait]
pub trait LogicalBackend: Send + Sync {
    /// List the entries below `path`.
    async fn list(&self, path: &str) -> Result<Option<LogicalResponse>, VaultError>;

    /// Read the document at `path`.
    async fn read(&self, path: &str) -> Result<Option<LogicalResponse>, VaultError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_full_envelope() {
        let body = json!({
            "request_id": "abc",
            "lease_id": "",
            "renewable": false,
            "data": {"keys": ["a", "b"]},
            "warnings": null,
            "auth": null
        });
        let response: LogicalResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.data, Some(json!({"keys": ["a", "b"]})));
        assert!(response.warnings.is_none());
    }

    #[test]
    fn test_deserialize_without_data() {
        let response: LogicalResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.data.is_none());
    }

    #[test]
    fn test_deserialize_warnings() {
        let body = json!({"data": {}, "warnings": ["deprecated endpoint"]});
        let response: LogicalResponse = serde_json::from_value(body).unwrap();
        assert_eq!(
            response.warnings,
            Some(vec!["deprecated endpoint".to_string()])
        );
    }
}
