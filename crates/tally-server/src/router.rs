use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the axum router with all Tally endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handlers::health))
        .route("/v1/info", get(handlers::info))
        .route("/v1/auth/login", post(handlers::auth::login))
        .route("/v1/users/me", get(handlers::users::me))
        .route(
            "/v1/transactions/charge",
            post(handlers::transactions::charge),
        )
        .route(
            "/v1/transactions/history",
            get(handlers::transactions::history),
        )
        .route(
            "/v1/admin/search-students",
            get(handlers::admin::search_students),
        )
        .route("/v1/admin/recharge", post(handlers::admin::recharge))
        .route(
            "/v1/admin/users",
            get(handlers::admin::list_users).post(handlers::admin::create_user),
        )
        .route("/v1/admin/users/:id", delete(handlers::admin::delete_user))
        .route(
            "/v1/admin/users/:id/password",
            put(handlers::admin::reset_password),
        )
        .route(
            "/v1/admin/wallet/adjust",
            post(handlers::admin::adjust_wallet),
        )
        .route(
            "/v1/admin/requests",
            get(handlers::admin::pending_requests).post(handlers::admin::submit_request),
        )
        .route(
            "/v1/admin/resolve-request/:id",
            post(handlers::admin::resolve_request),
        )
        .route(
            "/v1/admin/transactions/:user_id",
            get(handlers::admin::user_transactions),
        )
        .route(
            "/v1/admin/export/transactions",
            get(handlers::admin::export_transactions),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
