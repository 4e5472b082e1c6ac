//! Delegation chain construction (`act` / `client_act` claims).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::claims::{Claim, ClaimsExt, Client};
use crate::constants::claim_types;

/// One link of the delegation history, serialized as the JSON value of an
/// `act` claim.
///
/// `act` nests prior user-delegation history and `client_act` nests prior
/// client-to-client history; the two chains are kept disjoint. Absent
/// fields are omitted from the JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorChainNode {
    /// Actor claims embedded into this link, in configured order.
    #[serde(flatten)]
    pub claims: Map<String, Value>,
    /// Identity of the actor occupying this link, written after the
    /// embedded claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Prior user-delegation history, one hop deeper.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub act: Option<Box<ActorChainNode>>,
    /// Prior client-to-client delegation history, one hop deeper.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_act: Option<Box<ActorChainNode>>,
}

/// Build the `act` claim recording the current exchange on top of whatever
/// delegation history `subject_claims` already carries.
///
/// The configured actor claims come first, then the actor identity, and the
/// identity only when the actor is not already the most recent chain
/// occupant; a repeated exchange by the same actor neither duplicates
/// `client_id` nor re-nests the prior chain. An existing `act` claim is
/// removed and nested one level deeper when a new actor steps in; a
/// `client_act` claim is removed and nested independently.
pub(crate) fn build_act_claim(
    actor_client: &Client,
    actor_claims: &[Claim],
    subject_claims: &mut Vec<Claim>,
    claim_types_to_include: &[String],
) -> Claim {
    let existing = parse_chain(subject_claims.act());

    let actor_is_last = existing
        .as_ref()
        .and_then(|node| node.client_id.as_deref())
        .is_some_and(|id| !id.is_empty() && id == actor_client.client_id);

    let mut node = ActorChainNode::default();

    for claim_type in claim_types_to_include {
        if let Some(value) = actor_claims.value_of(claim_type) {
            node.claims
                .insert(claim_type.clone(), Value::String(value.to_string()));
        }
    }

    if !actor_is_last {
        node.client_id = Some(actor_client.client_id.clone());
    }

    if let Some(previous) = existing {
        if !actor_is_last {
            remove_claim(subject_claims, claim_types::ACT);
            node.act = Some(Box::new(previous));
        }
    }

    let client_chain = parse_chain(subject_claims.client_act());
    if let Some(previous) = client_chain {
        remove_claim(subject_claims, claim_types::CLIENT_ACT);
        node.client_act = Some(Box::new(previous));
    }

    Claim::json(claim_types::ACT, serialize_chain(&node))
}

/// Parse a serialized chain claim value. A malformed value is logged and
/// treated as absent; the caller leaves the claim in place.
fn parse_chain(value: Option<&str>) -> Option<ActorChainNode> {
    let value = value?;
    if value.is_empty() {
        return None;
    }

    match serde_json::from_str(value) {
        Ok(node) => Some(node),
        Err(e) => {
            warn!(error = %e, "ignoring malformed delegation chain claim");
            None
        }
    }
}

fn remove_claim(claims: &mut Vec<Claim>, claim_type: &str) {
    if let Some(position) = claims.iter().position(|c| c.claim_type == claim_type) {
        claims.remove(position);
    }
}

fn serialize_chain(node: &ActorChainNode) -> String {
    serde_json::to_string(node).expect("delegation chain serializes to JSON")
}
