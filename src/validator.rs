//! Exchange request validation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::error;

use crate::claims::{Claim, Client};
use crate::config::ExchangeOptions;
use crate::constants::{request_params, INVALID_TOKEN_ERROR, TOKEN_TYPE_ACCESS_TOKEN};
use crate::error::GrantError;

/// Fallback description for collaborator failures that carry none.
const GENERIC_VALIDATION_FAILURE: &str = "Token validation failed.";

/// Outcome reported by the external access-token validator.
///
/// `client` and `claims` stay optional on purpose: the collaborator contract
/// guarantees both whenever `is_error()` is false, but the result builder
/// enforces that contract loudly instead of assuming it.
#[derive(Debug, Clone, Default)]
pub struct TokenValidation {
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub client: Option<Client>,
    pub claims: Option<Vec<Claim>>,
}

impl TokenValidation {
    /// A successful outcome resolving to `client` and `claims`.
    pub fn valid(client: Client, claims: Vec<Claim>) -> Self {
        Self {
            error: None,
            error_description: None,
            client: Some(client),
            claims: Some(claims),
        }
    }

    /// A failed outcome with an error code and description.
    pub fn failed(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            error_description: Some(description.into()),
            client: None,
            claims: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// External collaborator that parses and cryptographically verifies a bearer
/// access token, resolving it into a client and claims.
///
/// Validation failures are a definitive negative outcome; this core never
/// retries and imposes no timeout (that belongs to the caller).
#[async_trait]
pub trait AccessTokenValidator: Send + Sync {
    async fn validate_access_token(&self, token: &str) -> TokenValidation;
}

/// A token exchange request: the raw exchange parameters plus the
/// authenticated requesting client, resolved by the transport layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExchangeRequest {
    #[serde(default)]
    pub grant_type: Option<String>,
    #[serde(default)]
    pub subject_token: Option<String>,
    #[serde(default)]
    pub subject_token_type: Option<String>,
    #[serde(default)]
    pub actor_token: Option<String>,
    #[serde(default)]
    pub actor_token_type: Option<String>,
    #[serde(skip)]
    pub client: Client,
}

impl ExchangeRequest {
    fn token(&self, role: TokenRole) -> Option<&str> {
        match role {
            TokenRole::Subject => self.subject_token.as_deref(),
            TokenRole::Actor => self.actor_token.as_deref(),
        }
    }

    fn token_type(&self, role: TokenRole) -> Option<&str> {
        match role {
            TokenRole::Subject => self.subject_token_type.as_deref(),
            TokenRole::Actor => self.actor_token_type.as_deref(),
        }
    }
}

/// Parse a form-urlencoded request body on behalf of the authenticated
/// `client`. Token parameters stay optional here so the validator owns the
/// missing-parameter error messages.
pub fn parse_exchange_request(body: &str, client: Client) -> Result<ExchangeRequest, GrantError> {
    let mut request: ExchangeRequest = serde_urlencoded::from_str(body)
        .map_err(|e| GrantError::invalid_request(format!("Invalid request body: {}", e)))?;
    request.client = client;
    Ok(request)
}

/// Which of the two exchanged tokens a validation step refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenRole {
    Subject,
    Actor,
}

impl TokenRole {
    fn token_param(self) -> &'static str {
        match self {
            TokenRole::Subject => request_params::SUBJECT_TOKEN,
            TokenRole::Actor => request_params::ACTOR_TOKEN,
        }
    }

    fn type_param(self) -> &'static str {
        match self {
            TokenRole::Subject => request_params::SUBJECT_TOKEN_TYPE,
            TokenRole::Actor => request_params::ACTOR_TOKEN_TYPE,
        }
    }
}

/// Result of validating a token exchange request.
#[derive(Debug, Clone)]
pub enum ExchangeValidation {
    /// The request was rejected; the description is caller-facing.
    Failure(GrantError),
    /// Both tokens validated and are mutually consistent.
    Success {
        subject: TokenValidation,
        actor: TokenValidation,
    },
}

impl ExchangeValidation {
    fn token_failure(outcome: &TokenValidation) -> Self {
        ExchangeValidation::Failure(GrantError::invalid_request(format!(
            "{} : {}",
            outcome.error.as_deref().unwrap_or_default(),
            outcome
                .error_description
                .as_deref()
                .unwrap_or(GENERIC_VALIDATION_FAILURE)
        )))
    }
}

/// Validates exchange requests: both tokens through the external validator,
/// the actor blacklist, and requesting-client consistency.
pub struct ExchangeRequestValidator<V> {
    token_validator: Arc<V>,
    options: Arc<ExchangeOptions>,
}

impl<V: AccessTokenValidator> ExchangeRequestValidator<V> {
    pub fn new(token_validator: Arc<V>, options: Arc<ExchangeOptions>) -> Self {
        Self {
            token_validator,
            options,
        }
    }

    /// Validate the request, short-circuiting on the first failure. The
    /// actor token is not touched when the subject step already failed.
    pub async fn validate(&self, request: &ExchangeRequest) -> ExchangeValidation {
        let subject = self.validate_token(request, TokenRole::Subject).await;
        if subject.is_error() {
            return ExchangeValidation::token_failure(&subject);
        }

        let actor = self.validate_actor_token(request).await;
        if actor.is_error() {
            return ExchangeValidation::token_failure(&actor);
        }

        let actor_client_id = actor.client.as_ref().map(|c| c.client_id.as_str());
        if actor_client_id != Some(request.client.client_id.as_str()) {
            return ExchangeValidation::Failure(GrantError::invalid_request(
                "Request client_id and actor_token client_id must match.",
            ));
        }

        ExchangeValidation::Success { subject, actor }
    }

    async fn validate_actor_token(&self, request: &ExchangeRequest) -> TokenValidation {
        let outcome = self.validate_token(request, TokenRole::Actor).await;
        if outcome.is_error() {
            return outcome;
        }

        self.check_blacklisted_actor_claims(outcome)
    }

    async fn validate_token(&self, request: &ExchangeRequest, role: TokenRole) -> TokenValidation {
        match request.token_type(role) {
            Some(TOKEN_TYPE_ACCESS_TOKEN) => {}
            Some(value) if !value.is_empty() => {
                return TokenValidation::failed(
                    INVALID_TOKEN_ERROR,
                    format!("Invalid {}.", role.type_param()),
                );
            }
            _ => {
                return TokenValidation::failed(
                    INVALID_TOKEN_ERROR,
                    format!("Missing {}.", role.type_param()),
                );
            }
        }

        let token = match request.token(role) {
            Some(token) if !token.is_empty() => token,
            _ => {
                return TokenValidation::failed(
                    INVALID_TOKEN_ERROR,
                    format!("Missing {}.", role.token_param()),
                );
            }
        };

        let outcome = self.token_validator.validate_access_token(token).await;
        if outcome.is_error() {
            error!("{} validation failed.", role.token_param());
        }

        outcome
    }

    fn check_blacklisted_actor_claims(&self, outcome: TokenValidation) -> TokenValidation {
        let blacklisted = outcome
            .claims
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|c| self.options.actor_claims_blacklist.contains(&c.claim_type));

        if blacklisted {
            return TokenValidation::failed(
                INVALID_TOKEN_ERROR,
                format!(
                    "{} contains blacklisted claims.",
                    request_params::ACTOR_TOKEN
                ),
            );
        }

        outcome
    }
}
