use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tally_auth::Action;
use tally_ledger::{HistoryEntry, LedgerWriter, ProjectionBuilder};
use tally_types::UserId;

use crate::error::ServerResult;
use crate::extract::AuthUser;
use crate::state::AppState;

/// History rows returned per request, matching the dashboard page size.
const HISTORY_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct ChargeRequest {
    /// The identity read from the student's badge scan.
    pub student_id: UserId,
    pub amount: u64,
}

#[derive(Debug, Serialize)]
pub struct ChargeResponse {
    pub new_balance: i64,
}

/// `POST /v1/transactions/charge` — vendor debits a scanned student.
pub async fn charge(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ChargeRequest>,
) -> ServerResult<Json<ChargeResponse>> {
    auth.require(Action::ChargeStudent)?;

    let new_balance = state.ledger.transfer(body.student_id, auth.id, body.amount)?;
    Ok(Json(ChargeResponse { new_balance }))
}

/// `GET /v1/transactions/history` — the caller's own annotated history.
pub async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ServerResult<Json<Vec<HistoryEntry>>> {
    auth.require(Action::ViewOwnWallet)?;

    let entries = ProjectionBuilder::history(state.ledger.as_ref(), auth.id, HISTORY_LIMIT)?;
    Ok(Json(entries))
}
