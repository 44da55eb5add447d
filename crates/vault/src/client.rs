//! Listing and reading secrets with response-shape checks

use crate::{HttpBackend, LogicalBackend, LogicalResponse, VaultError};
use secrecy::SecretString;
use serde_json::{Map, Value};
use vaultenv_secrets::SecretDocument;

/// Lists and reads secrets through a [`LogicalBackend`].
///
/// Each call is a single request; nothing is cached or retried.
#[derive(Debug, Clone)]
pub struct SecretClient<B = HttpBackend> {
    backend: B,
}

impl SecretClient<HttpBackend> {
    /// Connect to the Vault server at `address` using `token`.
    pub fn connect(address: &str, token: &SecretString) -> Result<Self, VaultError> {
        Ok(Self::new(HttpBackend::new(address, token)?))
    }
}

impl<B: LogicalBackend> SecretClient<B> {
    /// Wrap an existing backend.
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The underlying backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// List entry names under `path`.
    ///
    /// The payload must carry a `keys` array of strings. The names are
    /// returned in server order; any malformed element fails the whole call.
    pub async fn list(&self, path: &str) -> Result<Vec<String>, VaultError> {
        let response = self.backend.list(path).await?;
        let mut payload = payload(path, response)?;

        let keys = payload.remove("keys").ok_or_else(|| VaultError::MissingField {
            path: path.to_string(),
            field: "keys",
        })?;
        let Value::Array(items) = keys else {
            return Err(shape_error(path, "keys", "an array of strings"));
        };

        let keys = items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                _ => Err(shape_error(path, "keys", "an array of strings")),
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(path, count = keys.len(), "Listed entries");
        Ok(keys)
    }

    /// Read the secret at `path` and unwrap its `data` envelope.
    pub async fn read(&self, path: &str) -> Result<SecretDocument, VaultError> {
        let response = self.backend.read(path).await?;
        let mut payload = payload(path, response)?;

        let data = payload.remove("data").ok_or_else(|| VaultError::MissingField {
            path: path.to_string(),
            field: "data",
        })?;
        let Value::Object(data) = data else {
            return Err(shape_error(path, "data", "an object"));
        };

        let document = SecretDocument::from(data);
        tracing::debug!(path, count = document.len(), "Read secret");
        Ok(document)
    }
}

/// Take the payload object out of a response, treating an absent or null
/// payload as empty.
fn payload(
    path: &str,
    response: Option<LogicalResponse>,
) -> Result<Map<String, Value>, VaultError> {
    let response = response.ok_or_else(|| VaultError::NotFound {
        path: path.to_string(),
    })?;

    match response.data {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(shape_error(path, "data", "an object")),
    }
}

fn shape_error(path: &str, field: &'static str, expected: &'static str) -> VaultError {
    VaultError::InvalidShape {
        path: path.to_string(),
        field,
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use vaultenv_secrets::SecretValue;

    /// Serves canned responses keyed by path.
    #[derive(Default)]
    struct StaticBackend {
        lists: HashMap<String, LogicalResponse>,
        reads: HashMap<String, LogicalResponse>,
    }

    impl StaticBackend {
        fn with_list(mut self, path: &str, data: Value) -> Self {
            self.lists
                .insert(path.to_string(), LogicalResponse::with_data(data));
            self
        }

        fn with_read(mut self, path: &str, data: Value) -> Self {
            self.reads
                .insert(path.to_string(), LogicalResponse::with_data(data));
            self
        }
    }

    #[async_trait]
    impl LogicalBackend for StaticBackend {
        async fn list(&self, path: &str) -> Result<Option<LogicalResponse>, VaultError> {
            Ok(self.lists.get(path).cloned())
        }

        async fn read(&self, path: &str) -> Result<Option<LogicalResponse>, VaultError> {
            Ok(self.reads.get(path).cloned())
        }
    }

    #[tokio::test]
    async fn test_list_returns_keys_in_order() {
        let backend = StaticBackend::default().with_list(
            "staging/metadata",
            json!({"keys": ["zeta", "alpha", "api/", "alpha"]}),
        );
        let client = SecretClient::new(backend);

        let keys = client.list("staging/metadata").await.unwrap();
        assert_eq!(keys, vec!["zeta", "alpha", "api/", "alpha"]);
    }

    #[tokio::test]
    async fn test_list_empty_keys() {
        let backend = StaticBackend::default().with_list("staging/metadata", json!({"keys": []}));
        let keys = SecretClient::new(backend)
            .list("staging/metadata")
            .await
            .unwrap();
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn test_list_missing_keys_field() {
        let backend =
            StaticBackend::default().with_list("staging/metadata", json!({"other": ["a"]}));
        let err = SecretClient::new(backend)
            .list("staging/metadata")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VaultError::MissingField { field: "keys", .. }
        ));
        assert!(err.to_string().contains("staging/metadata"));
    }

    #[tokio::test]
    async fn test_list_null_payload_reports_missing_keys() {
        let backend = StaticBackend::default().with_list("staging/metadata", Value::Null);
        let err = SecretClient::new(backend)
            .list("staging/metadata")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VaultError::MissingField { field: "keys", .. }
        ));
    }

    #[tokio::test]
    async fn test_list_rejects_non_string_element() {
        let backend = StaticBackend::default()
            .with_list("staging/metadata", json!({"keys": ["ok", 7, "also-ok"]}));
        let err = SecretClient::new(backend)
            .list("staging/metadata")
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::InvalidShape { field: "keys", .. }));
    }

    #[tokio::test]
    async fn test_list_rejects_non_array() {
        let backend =
            StaticBackend::default().with_list("staging/metadata", json!({"keys": "api"}));
        let err = SecretClient::new(backend)
            .list("staging/metadata")
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::InvalidShape { field: "keys", .. }));
    }

    #[tokio::test]
    async fn test_list_not_found() {
        let client = SecretClient::new(StaticBackend::default());
        let err = client.list("staging/metadata").await.unwrap_err();
        assert!(matches!(err, VaultError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_read_unwraps_data() {
        let backend = StaticBackend::default().with_read(
            "development/data/api",
            json!({
                "data": {"DATABASE_URL": "postgres://x", "PORT": 5432, "nested": {"a": true}},
                "metadata": {"version": 2}
            }),
        );
        let doc = SecretClient::new(backend)
            .read("development/data/api")
            .await
            .unwrap();

        assert_eq!(doc.len(), 3);
        assert_eq!(doc.get("DATABASE_URL"), Some(&SecretValue::from("postgres://x")));
        assert_eq!(doc.get("PORT"), Some(&SecretValue::from(5432_i64)));
        assert_eq!(
            doc.get("nested"),
            Some(&SecretValue::from(json!({"a": true})))
        );
        assert!(doc.get("metadata").is_none());
        assert!(doc.get("version").is_none());
    }

    #[tokio::test]
    async fn test_read_missing_data_field() {
        let backend = StaticBackend::default()
            .with_read("development/data/api", json!({"metadata": {"version": 1}}));
        let err = SecretClient::new(backend)
            .read("development/data/api")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VaultError::MissingField { field: "data", .. }
        ));
    }

    #[tokio::test]
    async fn test_read_data_not_an_object() {
        let backend = StaticBackend::default()
            .with_read("development/data/api", json!({"data": ["a", "b"]}));
        let err = SecretClient::new(backend)
            .read("development/data/api")
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::InvalidShape { field: "data", .. }));
    }

    #[tokio::test]
    async fn test_read_payload_not_an_object() {
        let backend = StaticBackend::default().with_read("development/data/api", json!("text"));
        let err = SecretClient::new(backend)
            .read("development/data/api")
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::InvalidShape { field: "data", .. }));
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let client = SecretClient::new(StaticBackend::default());
        let err = client.read("development/data/missing").await.unwrap_err();
        assert!(matches!(err, VaultError::NotFound { ref path } if path == "development/data/missing"));
    }

    #[test]
    fn test_connect_rejects_bad_address() {
        let token = SecretString::from("t".to_string());
        let err = SecretClient::connect("vault.example.com", &token).unwrap_err();
        assert!(matches!(err, VaultError::InvalidAddress { .. }));
    }
}
