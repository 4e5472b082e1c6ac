//! Token exchange configuration.

use serde::{Deserialize, Serialize};

use crate::constants::claim_types;

/// Token exchange options, supplied once at process start and read-only per
/// request.
///
/// Every construction (explicit, `Default`, or deserialized with fields
/// omitted) produces fresh owned lists, so option instances never share
/// mutable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExchangeOptions {
    /// Actor claim types embedded into each delegation chain node, in order.
    #[serde(default = "default_actor_claims_to_include")]
    pub actor_claims_to_include: Vec<String>,

    /// Claim types that must never appear on an actor token.
    #[serde(default)]
    pub actor_claims_blacklist: Vec<String>,

    /// Exclusion entries matched against the final subject claim set before
    /// emission. An entry excludes a claim when the entry contains the
    /// claim's type as a substring.
    #[serde(default = "default_subject_claims_to_exclude")]
    pub subject_claims_to_exclude: Vec<String>,
}

fn default_actor_claims_to_include() -> Vec<String> {
    vec![
        claim_types::SUBJECT.to_string(),
        claim_types::TENANT_ID.to_string(),
    ]
}

fn default_subject_claims_to_exclude() -> Vec<String> {
    vec![claim_types::AUTHENTICATION_METHOD.to_string()]
}

impl Default for ExchangeOptions {
    fn default() -> Self {
        Self {
            actor_claims_to_include: default_actor_claims_to_include(),
            actor_claims_blacklist: Vec::new(),
            subject_claims_to_exclude: default_subject_claims_to_exclude(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ExchangeOptions::default();
        assert_eq!(options.actor_claims_to_include, vec!["sub", "tenantId"]);
        assert!(options.actor_claims_blacklist.is_empty());
        assert_eq!(options.subject_claims_to_exclude, vec!["amr"]);
    }

    #[test]
    fn test_partial_deserialization_applies_defaults() {
        let options: ExchangeOptions =
            serde_json::from_str(r#"{"actor_claims_blacklist":["secret"]}"#).unwrap();

        assert_eq!(options.actor_claims_to_include, vec!["sub", "tenantId"]);
        assert_eq!(options.actor_claims_blacklist, vec!["secret"]);
        assert_eq!(options.subject_claims_to_exclude, vec!["amr"]);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = serde_json::from_str::<ExchangeOptions>(r#"{"actor_claims":["sub"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_instances_are_independent() {
        let mut first = ExchangeOptions::default();
        first.actor_claims_to_include.push("extra".to_string());

        let second = ExchangeOptions::default();
        assert_eq!(second.actor_claims_to_include, vec!["sub", "tenantId"]);
    }
}
