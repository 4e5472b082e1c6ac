//! Protocol error codes and the error type surfaced by fallible entry points.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OAuth2 token request error codes (RFC 6749 §5.2).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenRequestError {
    #[default]
    InvalidRequest,
    InvalidClient,
    InvalidGrant,
    UnauthorizedClient,
    UnsupportedGrantType,
    InvalidScope,
}

impl TokenRequestError {
    /// Wire representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenRequestError::InvalidRequest => "invalid_request",
            TokenRequestError::InvalidClient => "invalid_client",
            TokenRequestError::InvalidGrant => "invalid_grant",
            TokenRequestError::UnauthorizedClient => "unauthorized_client",
            TokenRequestError::UnsupportedGrantType => "unsupported_grant_type",
            TokenRequestError::InvalidScope => "invalid_scope",
        }
    }
}

impl std::fmt::Display for TokenRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A protocol-level failure, serialized by the transport layer into the
/// OAuth2 error response.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{error}: {description}")]
pub struct GrantError {
    pub error: TokenRequestError,
    #[serde(rename = "error_description")]
    pub description: String,
}

impl GrantError {
    pub fn invalid_request(description: impl Into<String>) -> Self {
        Self {
            error: TokenRequestError::InvalidRequest,
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_wire_format() {
        assert_eq!(TokenRequestError::InvalidRequest.as_str(), "invalid_request");
        assert_eq!(
            serde_json::to_string(&TokenRequestError::UnsupportedGrantType).unwrap(),
            "\"unsupported_grant_type\""
        );
    }

    #[test]
    fn test_grant_error_display() {
        let err = GrantError::invalid_request("Missing subject_token.");
        assert_eq!(err.to_string(), "invalid_request: Missing subject_token.");
    }
}
