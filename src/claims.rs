//! Claims and clients as resolved by the external token validator.

use serde::{Deserialize, Serialize};

use crate::constants::claim_types;

/// How a claim value should be interpreted when the credential is issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimValueType {
    /// Opaque string value.
    #[default]
    Plain,
    /// The value is a serialized JSON document.
    Json,
}

/// A single claim attached to a subject (end user) or to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Claim type, e.g. `sub` or `tenantId`.
    #[serde(rename = "type")]
    pub claim_type: String,
    /// Claim value.
    pub value: String,
    /// Value interpretation.
    #[serde(default)]
    pub value_type: ClaimValueType,
}

impl Claim {
    /// A plain string claim.
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
            value_type: ClaimValueType::Plain,
        }
    }

    /// A JSON-valued claim.
    pub fn json(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
            value_type: ClaimValueType::Json,
        }
    }
}

/// A registered OAuth client, carrying client-level claims.
///
/// The claim list is appendable: on client-to-client delegation the builder
/// attaches the actor-chain claim here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub client_id: String,
    #[serde(default)]
    pub claims: Vec<Claim>,
}

impl Client {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            claims: Vec::new(),
        }
    }
}

/// First-match claim lookups over a claim list.
pub trait ClaimsExt {
    /// Value of the first claim of the given type.
    fn value_of(&self, claim_type: &str) -> Option<&str>;

    /// Value of the `sub` claim.
    fn subject(&self) -> Option<&str>;

    /// Value of the `act` claim (serialized delegation chain).
    fn act(&self) -> Option<&str>;

    /// Value of the `client_act` claim (serialized client delegation chain).
    fn client_act(&self) -> Option<&str>;

    /// Value of the `idp` claim.
    fn identity_provider(&self) -> Option<&str>;
}

impl ClaimsExt for [Claim] {
    fn value_of(&self, claim_type: &str) -> Option<&str> {
        self.iter()
            .find(|c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }

    fn subject(&self) -> Option<&str> {
        self.value_of(claim_types::SUBJECT)
    }

    fn act(&self) -> Option<&str> {
        self.value_of(claim_types::ACT)
    }

    fn client_act(&self) -> Option<&str> {
        self.value_of(claim_types::CLIENT_ACT)
    }

    fn identity_provider(&self) -> Option<&str> {
        self.value_of(claim_types::IDENTITY_PROVIDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_of_first_match() {
        let claims = vec![
            Claim::new("tenantId", "1"),
            Claim::new("sub", "user1"),
            Claim::new("tenantId", "2"),
        ];

        assert_eq!(claims.value_of("tenantId"), Some("1"));
        assert_eq!(claims.subject(), Some("user1"));
        assert_eq!(claims.value_of("missing"), None);
    }

    #[test]
    fn test_chain_lookups() {
        let claims = vec![
            Claim::json("act", "{\"client_id\":\"api1\"}"),
            Claim::json("client_act", "{\"client_id\":\"api2\"}"),
            Claim::new("idp", "external"),
        ];

        assert_eq!(claims.act(), Some("{\"client_id\":\"api1\"}"));
        assert_eq!(claims.client_act(), Some("{\"client_id\":\"api2\"}"));
        assert_eq!(claims.identity_provider(), Some("external"));
    }

    #[test]
    fn test_claim_value_types() {
        assert_eq!(Claim::new("sub", "x").value_type, ClaimValueType::Plain);
        assert_eq!(Claim::json("act", "{}").value_type, ClaimValueType::Json);
    }
}
