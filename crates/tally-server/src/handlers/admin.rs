use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tally_auth::{generate_password, hash_password, Action, AuthError};
use tally_ledger::{
    export_csv, AccountSummary, LedgerReader, LedgerWriter, NewAccount, Resolution,
};
use tally_types::{ApprovalRequest, PublicUser, RequestId, Role, Transaction, UserId, Wallet};

use crate::error::{ServerError, ServerResult};
use crate::extract::AuthUser;
use crate::state::AppState;

const SEARCH_LIMIT: usize = 10;
const MIN_PASSWORD_LEN: usize = 6;

// ---------------------------------------------------------------------------
// SubAdmin and above
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// `GET /v1/admin/search-students?q=`
pub async fn search_students(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<SearchQuery>,
) -> ServerResult<Json<Vec<PublicUser>>> {
    auth.require(Action::SearchStudents)?;

    // Too-short terms return nothing rather than everything.
    if query.q.trim().len() < 2 {
        return Ok(Json(Vec::new()));
    }
    let hits = state.ledger.search_students(query.q.trim(), SEARCH_LIMIT)?;
    Ok(Json(hits))
}

#[derive(Debug, Deserialize)]
pub struct RechargeRequest {
    pub user_id: UserId,
    pub amount: u64,
}

#[derive(Debug, Serialize)]
pub struct RechargeResponse {
    pub new_balance: i64,
}

/// `POST /v1/admin/recharge` — mint tokens onto a wallet.
pub async fn recharge(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<RechargeRequest>,
) -> ServerResult<Json<RechargeResponse>> {
    auth.require(Action::Recharge)?;

    let new_balance = state.ledger.mint(auth.id, body.user_id, body.amount)?;
    Ok(Json(RechargeResponse { new_balance }))
}

// ---------------------------------------------------------------------------
// Admin and above
// ---------------------------------------------------------------------------

/// `GET /v1/admin/users`
///
/// Admins see Students and Vendors; SuperAdmins see every account.
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ServerResult<Json<Vec<AccountSummary>>> {
    auth.require(Action::ViewUsers)?;

    let filter: Option<&[Role]> = if auth.role == Role::SuperAdmin {
        None
    } else {
        Some(&[Role::Student, Role::Vendor])
    };
    Ok(Json(state.ledger.accounts(filter)?))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
    /// When absent a throwaway password is generated and returned once.
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub user: PublicUser,
    pub wallet: Wallet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_password: Option<String>,
}

/// `POST /v1/admin/users`
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateUserRequest>,
) -> ServerResult<(StatusCode, Json<CreateUserResponse>)> {
    auth.require(Action::CreateUser)?;

    // Admins may only create Student accounts; SuperAdmins any role.
    if auth.role == Role::Admin && body.role != Role::Student {
        return Err(AuthError::Forbidden {
            role: auth.role,
            action: Action::CreateUser,
        }
        .into());
    }

    let (password, generated_password) = match body.password {
        Some(password) => {
            if password.len() < MIN_PASSWORD_LEN {
                return Err(ServerError::Validation(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            (password, None)
        }
        None => {
            let generated = generate_password();
            (generated.clone(), Some(generated))
        }
    };

    let (user, wallet) = state.ledger.create_account(NewAccount {
        full_name: body.full_name.unwrap_or_else(|| body.username.clone()),
        username: body.username,
        email: body.email,
        role: body.role,
        password_hash: hash_password(&password),
    })?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            user: user.public(),
            wallet,
            generated_password,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequestBody {
    pub target_user: UserId,
    pub amount: i64,
}

/// `POST /v1/admin/requests` — propose a balance change for sign-off.
pub async fn submit_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<SubmitRequestBody>,
) -> ServerResult<(StatusCode, Json<ApprovalRequest>)> {
    auth.require(Action::SubmitApproval)?;

    let request = state
        .ledger
        .submit_request(auth.id, body.target_user, body.amount)?;
    Ok((StatusCode::CREATED, Json(request)))
}

// ---------------------------------------------------------------------------
// SuperAdmin only
// ---------------------------------------------------------------------------

/// `DELETE /v1/admin/users/:id`
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UserId>,
) -> ServerResult<StatusCode> {
    auth.require(Action::DeleteUser)?;

    state.ledger.delete_account(id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

/// `PUT /v1/admin/users/:id/password`
pub async fn reset_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UserId>,
    Json(body): Json<ResetPasswordRequest>,
) -> ServerResult<StatusCode> {
    auth.require(Action::ResetPassword)?;

    if body.new_password.len() < MIN_PASSWORD_LEN {
        return Err(ServerError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    state
        .ledger
        .set_password_hash(id, hash_password(&body.new_password))?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    pub user_id: UserId,
    /// Signed delta: positive grants tokens, negative removes them.
    pub amount: i64,
}

/// `POST /v1/admin/wallet/adjust`
pub async fn adjust_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<AdjustRequest>,
) -> ServerResult<Json<Wallet>> {
    auth.require(Action::AdjustWallet)?;

    let wallet = state.ledger.adjust(auth.id, body.user_id, body.amount)?;
    Ok(Json(wallet))
}

/// `GET /v1/admin/requests` — the pending approval queue, oldest first.
pub async fn pending_requests(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ServerResult<Json<Vec<ApprovalRequest>>> {
    auth.require(Action::ResolveApproval)?;

    Ok(Json(state.ledger.pending_requests()?))
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequestBody {
    pub action: Resolution,
}

/// `POST /v1/admin/resolve-request/:id`
pub async fn resolve_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
    Json(body): Json<ResolveRequestBody>,
) -> ServerResult<Json<ApprovalRequest>> {
    auth.require(Action::ResolveApproval)?;

    let request = state.ledger.resolve_request(auth.id, id, body.action)?;
    Ok(Json(request))
}

/// `GET /v1/admin/transactions/:user_id`
pub async fn user_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<UserId>,
) -> ServerResult<Json<Vec<Transaction>>> {
    auth.require(Action::ViewUserTransactions)?;

    Ok(Json(state.ledger.transactions_for(user_id)?))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub user_id: Option<UserId>,
}

/// `GET /v1/admin/export/transactions[?user_id=]` — CSV attachment.
pub async fn export_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ExportQuery>,
) -> ServerResult<Response> {
    auth.require(Action::ExportTransactions)?;

    let csv = export_csv(state.ledger.as_ref(), query.user_id)?;
    let filename = match query.user_id {
        Some(id) => format!("user_{id}_transactions.csv"),
        None => "all-transactions.csv".to_string(),
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response())
}
