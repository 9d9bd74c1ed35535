//! HTTP server for Tally, the carnival token ledger.
//!
//! A thin axum layer over `tally-ledger`: bearer-token authentication,
//! capability checks before every mutation, and a uniform error-to-status
//! mapping. All state lives behind [`state::AppState`].

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use extract::AuthUser;
pub use router::build_router;
pub use server::TallyServer;
pub use state::AppState;
