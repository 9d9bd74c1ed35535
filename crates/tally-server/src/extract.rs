use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use tally_auth::{authorize, Action, AuthError};
use tally_types::{Role, UserId};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// The authenticated caller, recovered from the bearer token.
///
/// The credential travels with every request; nothing is looked up in a
/// session store. Handlers call [`AuthUser::require`] before any ledger
/// mutation.
#[derive(Clone, Copy, Debug)]
pub struct AuthUser {
    pub id: UserId,
    pub role: Role,
}

impl AuthUser {
    /// Check this caller's role against the capability table.
    pub fn require(&self, action: Action) -> ServerResult<()> {
        authorize(self.role, action).map_err(ServerError::from)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AuthError::TokenMalformed("missing Authorization header".into()))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AuthError::TokenMalformed("expected a Bearer token".into()))?;

        let claims = state.tokens.verify(token)?;
        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}
