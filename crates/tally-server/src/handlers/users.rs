use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tally_ledger::LedgerReader;
use tally_types::{PublicUser, Wallet};

use crate::error::ServerResult;
use crate::extract::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: PublicUser,
    pub wallet: Wallet,
}

/// `GET /v1/users/me`
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ServerResult<Json<MeResponse>> {
    let user = state.ledger.find_user(auth.id)?;
    let wallet = state.ledger.wallet_of(auth.id)?;
    Ok(Json(MeResponse {
        user: user.public(),
        wallet,
    }))
}
