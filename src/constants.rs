//! Protocol constants (RFC 8693 identifiers, claim types, parameter names).

/// Token exchange grant type (RFC 8693).
pub const GRANT_TYPE_TOKEN_EXCHANGE: &str = "urn:ietf:params:oauth:grant-type:token-exchange";

/// The only token type accepted for subject and actor tokens, and the type
/// reported back for issued credentials.
pub const TOKEN_TYPE_ACCESS_TOKEN: &str = "urn:ietf:params:oauth:token-type:access_token";

/// Claim types used by the delegation chain and the builder.
pub mod claim_types {
    /// User-delegation history (nested JSON).
    pub const ACT: &str = "act";
    /// Client-to-client delegation history (nested JSON).
    pub const CLIENT_ACT: &str = "client_act";
    /// Subject identifier.
    pub const SUBJECT: &str = "sub";
    /// Client identifier recorded in each chain node.
    pub const CLIENT_ID: &str = "client_id";
    /// Tenant identifier, included in chain nodes by default.
    pub const TENANT_ID: &str = "tenantId";
    /// Identity provider.
    pub const IDENTITY_PROVIDER: &str = "idp";
    /// Authentication method, excluded from issued subject claims by default.
    pub const AUTHENTICATION_METHOD: &str = "amr";
}

/// Request parameters (form-urlencoded body).
pub mod request_params {
    pub const SUBJECT_TOKEN: &str = "subject_token";
    pub const SUBJECT_TOKEN_TYPE: &str = "subject_token_type";
    pub const ACTOR_TOKEN: &str = "actor_token";
    pub const ACTOR_TOKEN_TYPE: &str = "actor_token_type";
}

/// Response parameters added on top of the standard token response.
pub mod response_params {
    pub const ISSUED_TOKEN_TYPE: &str = "issued_token_type";
}

/// Error code reported by the external token validator for malformed or
/// rejected tokens, reused for the parameter checks performed here.
pub const INVALID_TOKEN_ERROR: &str = "invalid_token";

/// Identity provider recorded when the subject token carries no `idp` claim.
pub const LOCAL_IDENTITY_PROVIDER: &str = "local";
