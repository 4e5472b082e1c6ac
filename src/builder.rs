//! Token exchange result builder.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info};

use crate::chain::build_act_claim;
use crate::claims::{Claim, ClaimsExt, Client};
use crate::config::ExchangeOptions;
use crate::constants::{response_params, LOCAL_IDENTITY_PROVIDER, TOKEN_TYPE_ACCESS_TOKEN};
use crate::error::{GrantError, TokenRequestError};
use crate::validator::TokenValidation;

const SUCCESS_MESSAGE: &str = "Successful Token Exchange Request.";
const DEFAULT_ERROR_DESCRIPTION: &str = "Invalid Token Exchange Request";

/// The issuable outcome of a token exchange.
#[derive(Debug, Clone)]
pub enum GrantResult {
    /// Protocol error to relay to the caller.
    Error(GrantError),
    /// Delegation on behalf of an end user.
    UserDelegation {
        subject: String,
        claims: Vec<Claim>,
        client: Client,
        identity_provider: String,
    },
    /// Client-to-client delegation; the chain claim lives on the client.
    ClientDelegation { client: Client },
}

impl GrantResult {
    pub fn is_error(&self) -> bool {
        matches!(self, GrantResult::Error(_))
    }

    /// Extra parameters the transport layer must add to the token response
    /// on success.
    pub fn response_parameters(&self) -> HashMap<&'static str, &'static str> {
        match self {
            GrantResult::Error(_) => HashMap::new(),
            _ => HashMap::from([(
                response_params::ISSUED_TOKEN_TYPE,
                TOKEN_TYPE_ACCESS_TOKEN,
            )]),
        }
    }
}

#[derive(Debug)]
struct SubjectParts {
    subject: Option<String>,
    claims: Vec<Claim>,
    client: Client,
}

#[derive(Debug)]
struct ActorParts {
    client: Client,
    claims: Vec<Claim>,
}

#[derive(Debug)]
enum BuilderState {
    Uninitialized,
    Errored(GrantError),
    HasSubject(SubjectParts),
    HasActor(ActorParts),
    Ready {
        subject: SubjectParts,
        actor: ActorParts,
    },
}

/// Single-use accumulator turning validated token outcomes (or an explicit
/// error) into the issuable [`GrantResult`].
///
/// The builder starts out reporting a generic invalid-request error and
/// only reaches the success path once both a subject and an actor outcome
/// are recorded. `build` consumes the builder, so reuse across requests is
/// unrepresentable.
#[derive(Debug)]
pub struct ExchangeResultBuilder {
    options: Arc<ExchangeOptions>,
    log_message: Option<String>,
    state: BuilderState,
}

impl ExchangeResultBuilder {
    pub fn new(options: Arc<ExchangeOptions>) -> Self {
        Self {
            options,
            log_message: None,
            state: BuilderState::Uninitialized,
        }
    }

    /// Record the validated subject token outcome.
    ///
    /// # Panics
    ///
    /// Panics when the outcome carries no claims or no client: the external
    /// validator violated its contract.
    pub fn with_subject(mut self, outcome: TokenValidation) -> Self {
        let (client, claims) = match (outcome.client, outcome.claims) {
            (Some(client), Some(claims)) => (client, claims),
            _ => panic!("Subject properties are missing"),
        };

        let parts = SubjectParts {
            subject: claims.subject().map(str::to_string),
            claims,
            client,
        };

        self.state = match self.state {
            BuilderState::HasActor(actor) | BuilderState::Ready { actor, .. } => {
                BuilderState::Ready {
                    subject: parts,
                    actor,
                }
            }
            _ => BuilderState::HasSubject(parts),
        };
        self
    }

    /// Record the validated actor token outcome.
    ///
    /// # Panics
    ///
    /// Panics when the outcome carries no claims or no client: the external
    /// validator violated its contract.
    pub fn with_actor(mut self, outcome: TokenValidation) -> Self {
        let (client, claims) = match (outcome.client, outcome.claims) {
            (Some(client), Some(claims)) => (client, claims),
            _ => panic!("Client properties are missing"),
        };

        let parts = ActorParts { client, claims };

        self.state = match self.state {
            BuilderState::HasSubject(subject) | BuilderState::Ready { subject, .. } => {
                BuilderState::Ready {
                    subject,
                    actor: parts,
                }
            }
            _ => BuilderState::HasActor(parts),
        };
        self
    }

    /// Record the protocol error reported when no token outcome arrives.
    /// Ignored once a subject or actor has been recorded.
    pub fn with_error(
        mut self,
        error: TokenRequestError,
        description: impl Into<String>,
    ) -> Self {
        self.state = match self.state {
            BuilderState::Uninitialized | BuilderState::Errored(_) => {
                BuilderState::Errored(GrantError {
                    error,
                    description: description.into(),
                })
            }
            state => state,
        };
        self
    }

    /// Override the log line emitted on the error path. Empty messages are
    /// ignored.
    pub fn with_log(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        if !message.is_empty() {
            self.log_message = Some(message);
        }
        self
    }

    /// Produce the final result, consuming the builder.
    ///
    /// # Panics
    ///
    /// Panics when only one of the two token outcomes was recorded; callers
    /// must record both or neither.
    pub fn build(self) -> GrantResult {
        let Self {
            options,
            log_message,
            state,
        } = self;

        let (mut subject, actor) = match state {
            BuilderState::Uninitialized => {
                let err = GrantError::invalid_request(DEFAULT_ERROR_DESCRIPTION);
                error!("{}", log_message.as_deref().unwrap_or(&err.description));
                return GrantResult::Error(err);
            }
            BuilderState::Errored(err) => {
                error!("{}", log_message.as_deref().unwrap_or(&err.description));
                return GrantResult::Error(err);
            }
            BuilderState::HasSubject(_) => {
                panic!("actor outcome missing: record both token outcomes before build")
            }
            BuilderState::HasActor(_) => {
                panic!("subject outcome missing: record both token outcomes before build")
            }
            BuilderState::Ready { subject, actor } => (subject, actor),
        };

        info!("{}", SUCCESS_MESSAGE);

        let act = build_act_claim(
            &actor.client,
            &actor.claims,
            &mut subject.claims,
            &options.actor_claims_to_include,
        );

        match subject.subject {
            Some(sub) if !sub.is_empty() => {
                subject.claims.push(act);

                let identity_provider = subject
                    .claims
                    .identity_provider()
                    .unwrap_or(LOCAL_IDENTITY_PROVIDER)
                    .to_string();

                GrantResult::UserDelegation {
                    subject: sub,
                    claims: filter_excluded(subject.claims, &options.subject_claims_to_exclude),
                    client: subject.client,
                    identity_provider,
                }
            }
            _ => {
                let mut client = subject.client;
                client.claims.push(act);
                GrantResult::ClientDelegation { client }
            }
        }
    }
}

/// Drop claims matched by the exclusion entries. An entry matches when it
/// contains the claim's type as a substring.
fn filter_excluded(claims: Vec<Claim>, excluded: &[String]) -> Vec<Claim> {
    claims
        .into_iter()
        .filter(|c| {
            !excluded
                .iter()
                .any(|entry| entry.contains(c.claim_type.as_str()))
        })
        .collect()
}
