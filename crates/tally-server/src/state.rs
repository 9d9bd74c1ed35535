use std::sync::Arc;

use tally_auth::TokenSigner;
use tally_ledger::InMemoryLedger;

use crate::config::ServerConfig;
use crate::error::ServerResult;

/// Shared application state available to all request handlers.
///
/// Cheap to clone: everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<InMemoryLedger>,
    pub tokens: Arc<TokenSigner>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let tokens = match &config.signing_key_seed {
            Some(seed_hex) => TokenSigner::from_seed_hex(seed_hex)?,
            None => TokenSigner::generate(),
        };
        Ok(Self {
            ledger: Arc::new(InMemoryLedger::new(config.ledger)),
            tokens: Arc::new(tokens),
            config,
        })
    }
}
