use tally_types::Role;
use thiserror::Error;

use crate::capability::Action;

/// Errors produced by authentication and authorization.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Wrong username or password. Deliberately carries no detail about
    /// which half failed.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("malformed access token: {0}")]
    TokenMalformed(String),

    #[error("access token signature is invalid")]
    InvalidSignature,

    #[error("access token has expired")]
    TokenExpired,

    #[error("role {role} may not perform {action}")]
    Forbidden { role: Role, action: Action },

    #[error("invalid signing key material: {0}")]
    InvalidKey(String),
}
