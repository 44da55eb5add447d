//! Vault error types

use thiserror::Error;

/// Errors from talking to Vault or interpreting its responses.
///
/// Messages never carry secret values or raw response bodies.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The configured address is not a usable http(s) URL
    #[error("Invalid Vault address '{address}': {reason}")]
    InvalidAddress {
        /// Address as configured
        address: String,
        /// Why it was rejected
        reason: String,
    },

    /// The token cannot be sent as an HTTP header value
    #[error("Vault token contains characters that cannot be sent in a header")]
    InvalidToken,

    /// The HTTP client could not be constructed
    #[error("Failed to build Vault HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Transport failure or undecodable body
    #[error("Network error communicating with Vault: {0}")]
    Network(#[source] reqwest::Error),

    /// 401 / 403
    #[error("Vault denied access to '{path}' (check the token and its policies)")]
    Unauthorized {
        /// Requested path
        path: String,
    },

    /// Nothing exists at the path
    #[error("Nothing found in Vault at '{path}'")]
    NotFound {
        /// Requested path
        path: String,
    },

    /// 5xx
    #[error("Vault server error (HTTP {status}) for '{path}'")]
    Server {
        /// Requested path
        path: String,
        /// HTTP status code
        status: u16,
    },

    /// Any other non-success status
    #[error("Unexpected Vault response (HTTP {status}) for '{path}'")]
    UnexpectedStatus {
        /// Requested path
        path: String,
        /// HTTP status code
        status: u16,
    },

    /// The payload lacks a required field
    #[error("Could not parse Vault response for '{path}': missing '{field}'")]
    MissingField {
        /// Requested path
        path: String,
        /// Field that was expected
        field: &'static str,
    },

    /// A field is present but has the wrong type
    #[error("Could not parse Vault response for '{path}': '{field}' is not {expected}")]
    InvalidShape {
        /// Requested path
        path: String,
        /// Offending field
        field: &'static str,
        /// Human readable description of the expected type
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let err = VaultError::MissingField {
            path: "staging/metadata".to_string(),
            field: "keys",
        };
        let msg = err.to_string();
        assert!(msg.contains("staging/metadata"));
        assert!(msg.contains("'keys'"));
    }

    #[test]
    fn test_invalid_shape_message() {
        let err = VaultError::InvalidShape {
            path: "development/data/api".to_string(),
            field: "data",
            expected: "an object",
        };
        assert_eq!(
            err.to_string(),
            "Could not parse Vault response for 'development/data/api': 'data' is not an object"
        );
    }

    #[test]
    fn test_status_messages() {
        let err = VaultError::Server {
            path: "p".to_string(),
            status: 503,
        };
        assert!(err.to_string().contains("503"));

        let err = VaultError::Unauthorized {
            path: "p".to_string(),
        };
        assert!(err.to_string().contains("denied"));
    }
}
