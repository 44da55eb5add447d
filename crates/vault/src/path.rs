//! Secret path composition

use std::fmt;

/// Path of a KV v2 secret: `<stage>/data/<resource>`.
///
/// The stage is the KV mount; the resource is an entry name as returned by a
/// metadata listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretPath(String);

impl SecretPath {
    /// Compose the data path for `resource` under the `stage` mount.
    ///
    /// Leading and trailing slashes on either part are dropped.
    #[must_use]
    pub fn kv2(stage: &str, resource: &str) -> Self {
        Self(format!(
            "{}/data/{}",
            stage.trim_matches('/'),
            resource.trim_matches('/')
        ))
    }

    /// The path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SecretPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kv2_path() {
        let path = SecretPath::kv2("development", "billing-api");
        assert_eq!(path.as_str(), "development/data/billing-api");
    }

    #[test]
    fn test_kv2_path_trims_slashes() {
        let path = SecretPath::kv2("/staging/", "team/api/");
        assert_eq!(path.to_string(), "staging/data/team/api");
    }

    #[test]
    fn test_kv2_path_equality() {
        assert_eq!(
            SecretPath::kv2("staging", "api"),
            SecretPath::kv2("staging/", "/api")
        );
        assert_ne!(
            SecretPath::kv2("staging", "api"),
            SecretPath::kv2("development", "api")
        );
    }
}
