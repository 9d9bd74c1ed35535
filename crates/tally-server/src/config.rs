use std::net::SocketAddr;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tally_ledger::LedgerConfig;

/// Server configuration. Deserializable from TOML via the CLI; missing
/// fields fall back to the defaults below.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Access token lifetime in seconds.
    pub token_ttl_secs: i64,
    /// Hex-encoded 32-byte ed25519 seed. When absent a fresh key is
    /// generated at startup and tokens do not survive a restart.
    pub signing_key_seed: Option<String>,
    pub ledger: LedgerConfig,
}

impl ServerConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::seconds(self.token_ttl_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8431".parse().unwrap(),
            token_ttl_secs: 3 * 3600,
            signing_key_seed: None,
            ledger: LedgerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_ledger::BalanceFloor;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8431".parse::<SocketAddr>().unwrap());
        assert_eq!(c.token_ttl().num_hours(), 3);
        assert!(c.signing_key_seed.is_none());
        assert_eq!(c.ledger.initial_student_balance, 600);
        assert_eq!(c.ledger.balance_floor, BalanceFloor::AllowNegative);
    }

    #[test]
    fn round_trips_through_serde() {
        let config = ServerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.bind_addr, config.bind_addr);
        assert_eq!(back.token_ttl_secs, config.token_ttl_secs);
    }
}
