use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tally_auth::AuthError;
use tally_ledger::LedgerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::Auth(err) => match err {
                AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
                AuthError::InvalidKey(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::UNAUTHORIZED,
            },
            ServerError::Ledger(err) => match err {
                LedgerError::Validation(_)
                | LedgerError::InsufficientBalance { .. }
                | LedgerError::DuplicateUsername(_)
                | LedgerError::DuplicateEmail => StatusCode::BAD_REQUEST,
                LedgerError::UserNotFound
                | LedgerError::WalletNotFound
                | LedgerError::RequestNotFound => StatusCode::NOT_FOUND,
                LedgerError::AlreadyResolved { .. } => StatusCode::CONFLICT,
                LedgerError::Export(_) | LedgerError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ServerError::Config(_) | ServerError::Io(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        // 5xx detail stays in the logs, never in the response body.
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
