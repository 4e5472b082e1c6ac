//! OAuth 2.0 Token Exchange delegation grant (RFC 8693).
//!
//! Trades a subject token plus an actor token for a new credential carrying
//! a verifiable delegation history. Two pieces do the work:
//!
//! - [`ExchangeRequestValidator`] checks both tokens through an external
//!   [`AccessTokenValidator`] and enforces blacklist and client-consistency
//!   rules.
//! - [`ExchangeResultBuilder`] turns the validated outcomes into a
//!   [`GrantResult`], merging the delegation history into a nested `act`
//!   claim.
//!
//! Transport, token parsing/signature verification, and persistence live
//! outside this crate; [`TokenExchangeGrant`] is the seam a token endpoint
//! plugs into.

pub mod builder;
pub mod chain;
pub mod claims;
pub mod config;
pub mod constants;
pub mod error;
pub mod grant;
pub mod validator;

pub use builder::{ExchangeResultBuilder, GrantResult};
pub use chain::ActorChainNode;
pub use claims::{Claim, ClaimValueType, Client, ClaimsExt};
pub use config::ExchangeOptions;
pub use error::{GrantError, TokenRequestError};
pub use grant::TokenExchangeGrant;
pub use validator::{
    parse_exchange_request, AccessTokenValidator, ExchangeRequest, ExchangeRequestValidator,
    ExchangeValidation, TokenValidation,
};
