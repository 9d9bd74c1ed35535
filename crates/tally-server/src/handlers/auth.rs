use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tally_auth::{verify_password, AuthError};
use tally_ledger::LedgerReader;

use crate::error::ServerResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// `POST /v1/auth/login`
///
/// An unknown username and a wrong password both answer the same way.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ServerResult<Json<LoginResponse>> {
    let user = state
        .ledger
        .find_by_username(&body.username)
        .map_err(|_| AuthError::InvalidCredentials)?;

    if !verify_password(&body.password, &user.password_hash) {
        tracing::warn!(username = %body.username, "failed login attempt");
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state
        .tokens
        .issue(user.id, user.role, state.config.token_ttl())?;
    tracing::info!(user = %user.id, role = %user.role, "login succeeded");
    Ok(Json(LoginResponse { token }))
}
