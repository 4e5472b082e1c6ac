//! Token exchange grant orchestration.

use std::sync::Arc;

use crate::builder::{ExchangeResultBuilder, GrantResult};
use crate::config::ExchangeOptions;
use crate::constants::GRANT_TYPE_TOKEN_EXCHANGE;
use crate::error::TokenRequestError;
use crate::validator::{
    AccessTokenValidator, ExchangeRequest, ExchangeRequestValidator, ExchangeValidation,
};

/// Drives a token exchange end to end: request validation, then result
/// construction.
///
/// One instance serves many requests; per-request state lives in the
/// validation outcomes and in a fresh builder per call.
pub struct TokenExchangeGrant<V> {
    validator: ExchangeRequestValidator<V>,
    options: Arc<ExchangeOptions>,
}

impl<V: AccessTokenValidator> TokenExchangeGrant<V> {
    pub fn new(token_validator: Arc<V>, options: Arc<ExchangeOptions>) -> Self {
        Self {
            validator: ExchangeRequestValidator::new(token_validator, Arc::clone(&options)),
            options,
        }
    }

    /// The grant type this handler serves.
    pub fn grant_type(&self) -> &'static str {
        GRANT_TYPE_TOKEN_EXCHANGE
    }

    /// Validate the request and produce the issuable result.
    pub async fn validate(&self, request: &ExchangeRequest) -> GrantResult {
        if request.grant_type.as_deref() != Some(GRANT_TYPE_TOKEN_EXCHANGE) {
            let description = format!("grant_type must be {}", GRANT_TYPE_TOKEN_EXCHANGE);
            return ExchangeResultBuilder::new(Arc::clone(&self.options))
                .with_log(description.clone())
                .with_error(TokenRequestError::InvalidRequest, description)
                .build();
        }

        match self.validator.validate(request).await {
            ExchangeValidation::Failure(err) => {
                ExchangeResultBuilder::new(Arc::clone(&self.options))
                    .with_log(err.description.clone())
                    .with_error(err.error, err.description)
                    .build()
            }
            ExchangeValidation::Success { subject, actor } => {
                ExchangeResultBuilder::new(Arc::clone(&self.options))
                    .with_subject(subject)
                    .with_actor(actor)
                    .build()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{Claim, ClaimsExt, Client};
    use crate::constants::TOKEN_TYPE_ACCESS_TOKEN;
    use crate::validator::TokenValidation;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct StubValidator {
        outcomes: HashMap<String, TokenValidation>,
    }

    #[async_trait]
    impl AccessTokenValidator for StubValidator {
        async fn validate_access_token(&self, token: &str) -> TokenValidation {
            self.outcomes
                .get(token)
                .cloned()
                .unwrap_or_else(|| TokenValidation::failed("invalid_token", "Unknown token."))
        }
    }

    fn grant(outcomes: Vec<(&str, TokenValidation)>) -> TokenExchangeGrant<StubValidator> {
        let stub = StubValidator {
            outcomes: outcomes
                .into_iter()
                .map(|(token, outcome)| (token.to_string(), outcome))
                .collect(),
        };
        TokenExchangeGrant::new(Arc::new(stub), Arc::new(ExchangeOptions::default()))
    }

    fn request() -> ExchangeRequest {
        ExchangeRequest {
            grant_type: Some(GRANT_TYPE_TOKEN_EXCHANGE.to_string()),
            subject_token: Some("subject-token".to_string()),
            subject_token_type: Some(TOKEN_TYPE_ACCESS_TOKEN.to_string()),
            actor_token: Some("actor-token".to_string()),
            actor_token_type: Some(TOKEN_TYPE_ACCESS_TOKEN.to_string()),
            client: Client::new("client_id_from_actor"),
        }
    }

    #[tokio::test]
    async fn test_successful_user_delegation_exchange() {
        let grant = grant(vec![
            (
                "subject-token",
                TokenValidation::valid(
                    Client::new("client_id_from_subject"),
                    vec![Claim::new("sub", "subSubject"), Claim::new("tenantId", "2")],
                ),
            ),
            (
                "actor-token",
                TokenValidation::valid(
                    Client::new("client_id_from_actor"),
                    vec![Claim::new("sub", "subActor"), Claim::new("tenantId", "1")],
                ),
            ),
        ]);

        let result = grant.validate(&request()).await;

        assert!(!result.is_error());
        assert_eq!(
            result.response_parameters().get("issued_token_type"),
            Some(&TOKEN_TYPE_ACCESS_TOKEN)
        );
        match result {
            GrantResult::UserDelegation {
                subject, claims, ..
            } => {
                assert_eq!(subject, "subSubject");
                assert_eq!(
                    claims.act(),
                    Some(
                        "{\"sub\":\"subActor\",\"tenantId\":\"1\",\
                         \"client_id\":\"client_id_from_actor\"}"
                    )
                );
            }
            other => panic!("expected a user delegation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_client_to_client_exchange() {
        let grant = grant(vec![
            (
                "subject-token",
                TokenValidation::valid(
                    Client::new("client_id_from_subject"),
                    vec![Claim::new("tenantId", "2")],
                ),
            ),
            (
                "actor-token",
                TokenValidation::valid(
                    Client::new("client_id_from_actor"),
                    vec![Claim::new("tenantId", "1")],
                ),
            ),
        ]);

        let result = grant.validate(&request()).await;

        match result {
            GrantResult::ClientDelegation { client } => {
                assert_eq!(client.client_id, "client_id_from_subject");
                assert!(client.claims.act().is_some());
            }
            other => panic!("expected a client delegation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_validation_failure_is_relayed() {
        let grant = grant(Vec::new());
        let mut request = request();
        request.subject_token_type = None;

        let result = grant.validate(&request).await;

        match result {
            GrantResult::Error(err) => {
                assert_eq!(err.error, TokenRequestError::InvalidRequest);
                assert_eq!(err.description, "invalid_token : Missing subject_token_type.");
            }
            other => panic!("expected an error result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wrong_grant_type_is_rejected() {
        let grant = grant(Vec::new());
        let mut request = request();
        request.grant_type = Some("authorization_code".to_string());

        let result = grant.validate(&request).await;

        match result {
            GrantResult::Error(err) => {
                assert_eq!(
                    err.description,
                    "grant_type must be urn:ietf:params:oauth:grant-type:token-exchange"
                );
            }
            other => panic!("expected an error result, got {:?}", other),
        }
        assert_eq!(grant.grant_type(), GRANT_TYPE_TOKEN_EXCHANGE);
    }
}
