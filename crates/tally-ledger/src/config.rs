use serde::{Deserialize, Serialize};

/// Policy applied when an `adjust` would take a balance below zero.
///
/// `transfer` always refuses to overdraw the sender regardless of this
/// setting; the floor only governs direct administrative adjustments and
/// approved requests (which apply through `adjust`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BalanceFloor {
    /// Negative balances are permitted (the historically observed behavior).
    #[default]
    AllowNegative,
    /// An adjustment that would go negative fails with `InsufficientBalance`.
    RejectBelowZero,
}

/// Ledger policy knobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub balance_floor: BalanceFloor,
    /// Opening balance for new Student accounts; every other role opens at 0.
    pub initial_student_balance: i64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            balance_floor: BalanceFloor::AllowNegative,
            initial_student_balance: 600,
        }
    }
}
