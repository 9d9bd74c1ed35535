use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tally_types::{
    ApprovalRequest, ApprovalStatus, PublicUser, RequestId, Role, Transaction, TransactionId,
    TransactionKind, User, UserId, Wallet,
};

use crate::config::{BalanceFloor, LedgerConfig};
use crate::error::LedgerError;
use crate::projection::AccountSummary;
use crate::traits::{LedgerReader, LedgerWriter, NewAccount, Resolution};

/// In-memory ledger: accounts, wallets, the transaction log, and the
/// approval queue behind one `RwLock`.
///
/// Every mutation takes the write guard, validates everything it needs,
/// and only then touches state. Concurrent transfers against overlapping
/// wallets therefore serialize, and a failed call leaves no partial state.
pub struct InMemoryLedger {
    config: LedgerConfig,
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    users: HashMap<UserId, User>,
    by_username: HashMap<String, UserId>,
    by_email: HashMap<String, UserId>,
    wallets: HashMap<UserId, Wallet>,
    transactions: Vec<Transaction>,
    requests: BTreeMap<RequestId, ApprovalRequest>,
}

impl InMemoryLedger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(LedgerState::default()),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.inner
            .write()
            .map_err(|_| LedgerError::Internal("ledger write lock poisoned".into()))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LedgerState>, LedgerError> {
        self.inner
            .read()
            .map_err(|_| LedgerError::Internal("ledger read lock poisoned".into()))
    }

    fn push_transaction(
        state: &mut LedgerState,
        sender: UserId,
        receiver: UserId,
        amount: u64,
        kind: TransactionKind,
    ) {
        state.transactions.push(Transaction {
            id: TransactionId::new(),
            sender,
            receiver,
            amount,
            kind,
            created_at: Utc::now(),
        });
    }

    /// Apply a signed delta to `target` and append the matching
    /// transaction. Runs entirely inside the caller's write guard so that
    /// approval resolution can flip a request's status in the same unit of
    /// work.
    fn apply_adjust(
        state: &mut LedgerState,
        floor: BalanceFloor,
        actor: UserId,
        target: UserId,
        delta: i64,
    ) -> Result<Wallet, LedgerError> {
        if delta == 0 {
            return Err(LedgerError::Validation("delta must be non-zero".into()));
        }

        let balance = state
            .wallets
            .get(&target)
            .ok_or(LedgerError::WalletNotFound)?
            .balance;
        let would_be = balance
            .checked_add(delta)
            .ok_or_else(|| LedgerError::Validation("balance would overflow".into()))?;

        if delta < 0 && would_be < 0 && floor == BalanceFloor::RejectBelowZero {
            tracing::warn!(%target, balance, delta, "adjust rejected by balance floor");
            return Err(LedgerError::InsufficientBalance {
                balance,
                requested: delta.unsigned_abs(),
            });
        }

        let wallet = state
            .wallets
            .get_mut(&target)
            .ok_or(LedgerError::WalletNotFound)?;
        wallet.balance = would_be;
        wallet.updated_at = Utc::now();
        let wallet = wallet.clone();

        let kind = if delta > 0 {
            TransactionKind::Credit
        } else {
            TransactionKind::Debit
        };
        Self::push_transaction(state, actor, target, delta.unsigned_abs(), kind);

        Ok(wallet)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl LedgerWriter for InMemoryLedger {
    fn create_account(&self, account: NewAccount) -> Result<(User, Wallet), LedgerError> {
        if account.username.trim().is_empty() {
            return Err(LedgerError::Validation("username must not be empty".into()));
        }
        if account.email.trim().is_empty() {
            return Err(LedgerError::Validation("email must not be empty".into()));
        }

        let mut state = self.write()?;

        if state.by_username.contains_key(&account.username) {
            return Err(LedgerError::DuplicateUsername(account.username));
        }
        if state.by_email.contains_key(&account.email) {
            return Err(LedgerError::DuplicateEmail);
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            username: account.username,
            full_name: account.full_name,
            email: account.email,
            role: account.role,
            password_hash: account.password_hash,
            created_at: now,
        };
        let initial = if user.role == Role::Student {
            self.config.initial_student_balance
        } else {
            0
        };
        let wallet = Wallet {
            owner: user.id,
            balance: initial,
            updated_at: now,
        };

        state.by_username.insert(user.username.clone(), user.id);
        state.by_email.insert(user.email.clone(), user.id);
        state.wallets.insert(user.id, wallet.clone());
        state.users.insert(user.id, user.clone());

        tracing::info!(user = %user.id, role = %user.role, balance = initial, "account created");
        Ok((user, wallet))
    }

    fn delete_account(&self, user: UserId) -> Result<(), LedgerError> {
        let mut state = self.write()?;

        let removed = state.users.remove(&user).ok_or(LedgerError::UserNotFound)?;
        state.by_username.remove(&removed.username);
        state.by_email.remove(&removed.email);
        state.wallets.remove(&user);
        state
            .transactions
            .retain(|tx| tx.sender != user && tx.receiver != user);

        tracing::info!(user = %user, "account and associated data deleted");
        Ok(())
    }

    fn set_password_hash(&self, user: UserId, password_hash: String) -> Result<(), LedgerError> {
        let mut state = self.write()?;
        let record = state
            .users
            .get_mut(&user)
            .ok_or(LedgerError::UserNotFound)?;
        record.password_hash = password_hash;
        Ok(())
    }

    fn transfer(&self, sender: UserId, receiver: UserId, amount: u64) -> Result<i64, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::Validation("amount must be positive".into()));
        }
        if sender == receiver {
            return Err(LedgerError::Validation(
                "sender and receiver must differ".into(),
            ));
        }
        let debit = i64::try_from(amount)
            .map_err(|_| LedgerError::Validation("amount exceeds the ledger range".into()))?;

        let mut state = self.write()?;

        // Validate both sides before touching either.
        let sender_balance = state
            .wallets
            .get(&sender)
            .ok_or(LedgerError::WalletNotFound)?
            .balance;
        let receiver_balance = state
            .wallets
            .get(&receiver)
            .ok_or(LedgerError::WalletNotFound)?
            .balance;
        if sender_balance < debit {
            tracing::warn!(%sender, balance = sender_balance, amount, "transfer rejected");
            return Err(LedgerError::InsufficientBalance {
                balance: sender_balance,
                requested: amount,
            });
        }
        let receiver_new = receiver_balance
            .checked_add(debit)
            .ok_or_else(|| LedgerError::Validation("balance would overflow".into()))?;

        let now = Utc::now();
        let new_balance = {
            let wallet = state
                .wallets
                .get_mut(&sender)
                .ok_or_else(|| LedgerError::Internal("sender wallet vanished".into()))?;
            wallet.balance -= debit;
            wallet.updated_at = now;
            wallet.balance
        };
        {
            let wallet = state
                .wallets
                .get_mut(&receiver)
                .ok_or_else(|| LedgerError::Internal("receiver wallet vanished".into()))?;
            wallet.balance = receiver_new;
            wallet.updated_at = now;
        }
        Self::push_transaction(&mut state, sender, receiver, amount, TransactionKind::Debit);

        tracing::debug!(%sender, %receiver, amount, new_balance, "transfer applied");
        Ok(new_balance)
    }

    fn mint(&self, actor: UserId, receiver: UserId, amount: u64) -> Result<i64, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::Validation("amount must be positive".into()));
        }
        let credit = i64::try_from(amount)
            .map_err(|_| LedgerError::Validation("amount exceeds the ledger range".into()))?;

        let mut state = self.write()?;

        if !state.users.contains_key(&actor) {
            return Err(LedgerError::UserNotFound);
        }
        let new_balance = {
            let wallet = state
                .wallets
                .get_mut(&receiver)
                .ok_or(LedgerError::WalletNotFound)?;
            wallet.balance = wallet
                .balance
                .checked_add(credit)
                .ok_or_else(|| LedgerError::Validation("balance would overflow".into()))?;
            wallet.updated_at = Utc::now();
            wallet.balance
        };
        Self::push_transaction(&mut state, actor, receiver, amount, TransactionKind::Credit);

        tracing::debug!(%actor, %receiver, amount, new_balance, "mint applied");
        Ok(new_balance)
    }

    fn adjust(&self, actor: UserId, target: UserId, delta: i64) -> Result<Wallet, LedgerError> {
        let mut state = self.write()?;

        if !state.users.contains_key(&actor) {
            return Err(LedgerError::UserNotFound);
        }
        Self::apply_adjust(&mut state, self.config.balance_floor, actor, target, delta)
    }

    fn submit_request(
        &self,
        requested_by: UserId,
        target_user: UserId,
        amount: i64,
    ) -> Result<ApprovalRequest, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::Validation("amount must be non-zero".into()));
        }

        let mut state = self.write()?;

        if !state.users.contains_key(&requested_by) || !state.users.contains_key(&target_user) {
            return Err(LedgerError::UserNotFound);
        }

        let request = ApprovalRequest {
            id: RequestId::new(),
            requested_by,
            target_user,
            amount,
            status: ApprovalStatus::Pending,
            resolved_by: None,
            created_at: Utc::now(),
            resolved_at: None,
        };
        state.requests.insert(request.id, request.clone());

        tracing::info!(request = %request.id, %target_user, amount, "approval request queued");
        Ok(request)
    }

    fn resolve_request(
        &self,
        resolver: UserId,
        id: RequestId,
        resolution: Resolution,
    ) -> Result<ApprovalRequest, LedgerError> {
        let mut state = self.write()?;

        let (target, amount) = {
            let request = state.requests.get(&id).ok_or(LedgerError::RequestNotFound)?;
            if request.status.is_terminal() {
                return Err(LedgerError::AlreadyResolved {
                    status: request.status,
                });
            }
            (request.target_user, request.amount)
        };

        // On approval the adjustment runs first, inside this same write
        // guard. If it fails the request stays pending.
        if resolution == Resolution::Approve {
            Self::apply_adjust(&mut state, self.config.balance_floor, resolver, target, amount)?;
        }

        let request = state
            .requests
            .get_mut(&id)
            .ok_or(LedgerError::RequestNotFound)?;
        request.status = match resolution {
            Resolution::Approve => ApprovalStatus::Approved,
            Resolution::Reject => ApprovalStatus::Rejected,
        };
        request.resolved_by = Some(resolver);
        request.resolved_at = Some(Utc::now());

        tracing::info!(request = %id, status = %request.status, "approval request resolved");
        Ok(request.clone())
    }
}

impl LedgerReader for InMemoryLedger {
    fn find_user(&self, id: UserId) -> Result<User, LedgerError> {
        let state = self.read()?;
        state.users.get(&id).cloned().ok_or(LedgerError::UserNotFound)
    }

    fn find_by_username(&self, username: &str) -> Result<User, LedgerError> {
        let state = self.read()?;
        state
            .by_username
            .get(username)
            .and_then(|id| state.users.get(id))
            .cloned()
            .ok_or(LedgerError::UserNotFound)
    }

    fn wallet_of(&self, user: UserId) -> Result<Wallet, LedgerError> {
        let state = self.read()?;
        state
            .wallets
            .get(&user)
            .cloned()
            .ok_or(LedgerError::WalletNotFound)
    }

    fn accounts(&self, roles: Option<&[Role]>) -> Result<Vec<AccountSummary>, LedgerError> {
        let state = self.read()?;

        let mut summaries: Vec<AccountSummary> = state
            .users
            .values()
            .filter(|user| roles.map_or(true, |allowed| allowed.contains(&user.role)))
            .map(|user| AccountSummary {
                user: user.public(),
                balance: state.wallets.get(&user.id).map(|w| w.balance).unwrap_or(0),
            })
            .collect();
        summaries.sort_by(|a, b| a.user.username.cmp(&b.user.username));
        Ok(summaries)
    }

    fn search_students(&self, term: &str, limit: usize) -> Result<Vec<PublicUser>, LedgerError> {
        let state = self.read()?;
        let needle = term.to_lowercase();

        let mut matches: Vec<PublicUser> = state
            .users
            .values()
            .filter(|user| user.role == Role::Student)
            .filter(|user| {
                user.username.to_lowercase().contains(&needle)
                    || user.full_name.to_lowercase().contains(&needle)
            })
            .map(User::public)
            .collect();
        matches.sort_by(|a, b| a.username.cmp(&b.username));
        matches.truncate(limit);
        Ok(matches)
    }

    fn transactions_for(&self, user: UserId) -> Result<Vec<Transaction>, LedgerError> {
        let state = self.read()?;
        Ok(state
            .transactions
            .iter()
            .rev()
            .filter(|tx| tx.sender == user || tx.receiver == user)
            .cloned()
            .collect())
    }

    fn all_transactions(&self) -> Result<Vec<Transaction>, LedgerError> {
        let state = self.read()?;
        Ok(state.transactions.iter().rev().cloned().collect())
    }

    fn find_request(&self, id: RequestId) -> Result<ApprovalRequest, LedgerError> {
        let state = self.read()?;
        state
            .requests
            .get(&id)
            .cloned()
            .ok_or(LedgerError::RequestNotFound)
    }

    fn pending_requests(&self) -> Result<Vec<ApprovalRequest>, LedgerError> {
        let state = self.read()?;
        Ok(state
            .requests
            .values()
            .filter(|request| request.status == ApprovalStatus::Pending)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn account(username: &str, role: Role) -> NewAccount {
        NewAccount {
            username: username.into(),
            full_name: format!("{username} surname"),
            email: format!("{username}@carnival.test"),
            role,
            password_hash: "salt$digest".into(),
        }
    }

    fn seeded() -> (InMemoryLedger, UserId, UserId, UserId) {
        let ledger = InMemoryLedger::default();
        let (student, _) = ledger.create_account(account("ada", Role::Student)).unwrap();
        let (vendor, _) = ledger.create_account(account("popcorn", Role::Vendor)).unwrap();
        let (admin, _) = ledger
            .create_account(account("root", Role::SuperAdmin))
            .unwrap();
        (ledger, student.id, vendor.id, admin.id)
    }

    #[test]
    fn students_open_with_the_configured_balance() {
        let (ledger, student, vendor, admin) = seeded();
        assert_eq!(ledger.wallet_of(student).unwrap().balance, 600);
        assert_eq!(ledger.wallet_of(vendor).unwrap().balance, 0);
        assert_eq!(ledger.wallet_of(admin).unwrap().balance, 0);
    }

    #[test]
    fn duplicate_username_and_email_are_rejected() {
        let (ledger, ..) = seeded();
        let err = ledger
            .create_account(account("ada", Role::Vendor))
            .unwrap_err();
        assert_eq!(err, LedgerError::DuplicateUsername("ada".into()));

        let mut clashing = account("ada2", Role::Vendor);
        clashing.email = "ada@carnival.test".into();
        let err = ledger.create_account(clashing).unwrap_err();
        assert_eq!(err, LedgerError::DuplicateEmail);
    }

    #[test]
    fn transfer_moves_tokens_and_appends_one_transaction() {
        let (ledger, student, vendor, _) = seeded();

        let new_balance = ledger.transfer(student, vendor, 150).unwrap();
        assert_eq!(new_balance, 450);
        assert_eq!(ledger.wallet_of(student).unwrap().balance, 450);
        assert_eq!(ledger.wallet_of(vendor).unwrap().balance, 150);

        let log = ledger.all_transactions().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].sender, student);
        assert_eq!(log[0].receiver, vendor);
        assert_eq!(log[0].amount, 150);
        assert_eq!(log[0].kind, TransactionKind::Debit);
    }

    #[test]
    fn overcharge_is_rejected_without_mutation() {
        let (ledger, student, vendor, _) = seeded();

        // Balance 600, charged 700.
        let err = ledger.transfer(student, vendor, 700).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                balance: 600,
                requested: 700,
            }
        );
        assert_eq!(ledger.wallet_of(student).unwrap().balance, 600);
        assert_eq!(ledger.wallet_of(vendor).unwrap().balance, 0);
        assert!(ledger.all_transactions().unwrap().is_empty());
    }

    #[test]
    fn transfer_validation() {
        let (ledger, student, vendor, _) = seeded();

        assert!(matches!(
            ledger.transfer(student, vendor, 0).unwrap_err(),
            LedgerError::Validation(_)
        ));
        assert!(matches!(
            ledger.transfer(student, student, 10).unwrap_err(),
            LedgerError::Validation(_)
        ));
        assert_eq!(
            ledger.transfer(student, UserId::new(), 10).unwrap_err(),
            LedgerError::WalletNotFound
        );
        assert_eq!(
            ledger.transfer(UserId::new(), vendor, 10).unwrap_err(),
            LedgerError::WalletNotFound
        );
    }

    #[test]
    fn mint_increases_supply_with_a_credit_entry() {
        let (ledger, student, _, admin) = seeded();

        let new_balance = ledger.mint(admin, student, 200).unwrap();
        assert_eq!(new_balance, 800);

        let log = ledger.transactions_for(student).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].sender, admin);
        assert_eq!(log[0].kind, TransactionKind::Credit);
    }

    #[test]
    fn adjust_round_trip_restores_balance_and_logs_twice() {
        let (ledger, student, _, admin) = seeded();

        ledger.adjust(admin, student, -50).unwrap();
        assert_eq!(ledger.wallet_of(student).unwrap().balance, 550);
        let wallet = ledger.adjust(admin, student, 50).unwrap();
        assert_eq!(wallet.balance, 600);

        let log = ledger.transactions_for(student).unwrap();
        assert_eq!(log.len(), 2);
        // Most recent first.
        assert_eq!(log[0].kind, TransactionKind::Credit);
        assert_eq!(log[1].kind, TransactionKind::Debit);
        assert_eq!(log[0].amount, 50);
        assert_eq!(log[1].amount, 50);
    }

    #[test]
    fn adjust_floor_policy() {
        let (ledger, student, _, admin) = seeded();
        // Default floor permits negative balances.
        let wallet = ledger.adjust(admin, student, -700).unwrap();
        assert_eq!(wallet.balance, -100);

        let strict = InMemoryLedger::new(LedgerConfig {
            balance_floor: BalanceFloor::RejectBelowZero,
            ..LedgerConfig::default()
        });
        let (student, _) = strict.create_account(account("ada", Role::Student)).unwrap();
        let (admin, _) = strict
            .create_account(account("root", Role::SuperAdmin))
            .unwrap();

        let err = strict.adjust(admin.id, student.id, -700).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                balance: 600,
                requested: 700,
            }
        );
        assert_eq!(strict.wallet_of(student.id).unwrap().balance, 600);
        // Draining to exactly zero is still allowed.
        strict.adjust(admin.id, student.id, -600).unwrap();
        assert!(strict.adjust(admin.id, student.id, 100).is_ok());
    }

    #[test]
    fn amounts_beyond_i64_are_rejected() {
        let (ledger, student, vendor, admin) = seeded();

        // A u64 amount past i64::MAX must never reach balance arithmetic:
        // cast naively it would read as negative and sail past the
        // insufficient-balance check.
        let err = ledger.transfer(student, vendor, u64::MAX).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        let err = ledger
            .transfer(student, vendor, i64::MAX as u64 + 1)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        let err = ledger.mint(admin, student, u64::MAX).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        assert_eq!(ledger.wallet_of(student).unwrap().balance, 600);
        assert_eq!(ledger.wallet_of(vendor).unwrap().balance, 0);
        assert!(ledger.all_transactions().unwrap().is_empty());
    }

    #[test]
    fn receiver_overflow_is_rejected_without_mutation() {
        let (ledger, student, vendor, admin) = seeded();
        ledger.adjust(admin, vendor, i64::MAX - 10).unwrap();

        let err = ledger.transfer(student, vendor, 100).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(ledger.wallet_of(student).unwrap().balance, 600);
        assert_eq!(ledger.wallet_of(vendor).unwrap().balance, i64::MAX - 10);

        let err = ledger.mint(admin, vendor, 100).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(ledger.wallet_of(vendor).unwrap().balance, i64::MAX - 10);
    }

    #[test]
    fn adjust_overflow_is_rejected() {
        let (ledger, student, _, admin) = seeded();

        let err = ledger.adjust(admin, student, i64::MAX).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(ledger.wallet_of(student).unwrap().balance, 600);

        // An approval carrying such a delta fails the same way and stays
        // pending.
        let request = ledger.submit_request(admin, student, i64::MAX).unwrap();
        let err = ledger
            .resolve_request(admin, request.id, Resolution::Approve)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(
            ledger.find_request(request.id).unwrap().status,
            ApprovalStatus::Pending
        );

        // Underflow on an already-negative balance.
        ledger.adjust(admin, student, -700).unwrap();
        let err = ledger.adjust(admin, student, i64::MIN).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(ledger.wallet_of(student).unwrap().balance, -100);
    }

    #[test]
    fn zero_delta_is_invalid() {
        let (ledger, student, _, admin) = seeded();
        assert!(matches!(
            ledger.adjust(admin, student, 0).unwrap_err(),
            LedgerError::Validation(_)
        ));
    }

    #[test]
    fn approval_happy_path() {
        let (ledger, student, _, admin) = seeded();

        let request = ledger.submit_request(admin, student, -100).unwrap();
        assert_eq!(request.status, ApprovalStatus::Pending);
        assert_eq!(ledger.pending_requests().unwrap().len(), 1);

        let resolved = ledger
            .resolve_request(admin, request.id, Resolution::Approve)
            .unwrap();
        assert_eq!(resolved.status, ApprovalStatus::Approved);
        assert_eq!(resolved.resolved_by, Some(admin));
        assert!(resolved.resolved_at.is_some());
        assert_eq!(ledger.wallet_of(student).unwrap().balance, 500);
        assert!(ledger.pending_requests().unwrap().is_empty());
    }

    #[test]
    fn resolving_twice_conflicts_and_mutates_once() {
        let (ledger, student, _, admin) = seeded();
        let request = ledger.submit_request(admin, student, 50).unwrap();

        ledger
            .resolve_request(admin, request.id, Resolution::Approve)
            .unwrap();
        let err = ledger
            .resolve_request(admin, request.id, Resolution::Approve)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::AlreadyResolved {
                status: ApprovalStatus::Approved,
            }
        );
        assert_eq!(ledger.wallet_of(student).unwrap().balance, 650);
        assert_eq!(ledger.transactions_for(student).unwrap().len(), 1);
    }

    #[test]
    fn rejection_is_terminal_and_touches_no_balance() {
        let (ledger, student, _, admin) = seeded();
        let request = ledger.submit_request(admin, student, 50).unwrap();

        let resolved = ledger
            .resolve_request(admin, request.id, Resolution::Reject)
            .unwrap();
        assert_eq!(resolved.status, ApprovalStatus::Rejected);
        assert_eq!(ledger.wallet_of(student).unwrap().balance, 600);
        assert!(ledger.all_transactions().unwrap().is_empty());

        let err = ledger
            .resolve_request(admin, request.id, Resolution::Approve)
            .unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyResolved { .. }));
    }

    #[test]
    fn failed_approval_leaves_the_request_pending() {
        let strict = InMemoryLedger::new(LedgerConfig {
            balance_floor: BalanceFloor::RejectBelowZero,
            ..LedgerConfig::default()
        });
        let (student, _) = strict.create_account(account("ada", Role::Student)).unwrap();
        let (admin, _) = strict
            .create_account(account("root", Role::SuperAdmin))
            .unwrap();

        let request = strict.submit_request(admin.id, student.id, -700).unwrap();
        let err = strict
            .resolve_request(admin.id, request.id, Resolution::Approve)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));

        // Status flip and adjustment roll back together.
        let reloaded = strict.find_request(request.id).unwrap();
        assert_eq!(reloaded.status, ApprovalStatus::Pending);
        assert_eq!(strict.wallet_of(student.id).unwrap().balance, 600);
    }

    #[test]
    fn unknown_request_is_not_found() {
        let (ledger, _, _, admin) = seeded();
        assert_eq!(
            ledger
                .resolve_request(admin, RequestId::new(), Resolution::Approve)
                .unwrap_err(),
            LedgerError::RequestNotFound
        );
    }

    #[test]
    fn delete_account_purges_wallet_and_transactions() {
        let (ledger, student, vendor, admin) = seeded();
        ledger.transfer(student, vendor, 100).unwrap();
        ledger.mint(admin, student, 50).unwrap();

        ledger.delete_account(student).unwrap();
        assert_eq!(ledger.find_user(student).unwrap_err(), LedgerError::UserNotFound);
        assert_eq!(ledger.wallet_of(student).unwrap_err(), LedgerError::WalletNotFound);
        assert!(ledger.all_transactions().unwrap().is_empty());

        // Username is freed for reuse.
        assert!(ledger.create_account(account("ada", Role::Student)).is_ok());
    }

    #[test]
    fn search_is_case_insensitive_and_student_only() {
        let (ledger, ..) = seeded();
        ledger
            .create_account(account("adamant", Role::Vendor))
            .unwrap();

        let hits = ledger.search_students("ADA", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].username, "ada");
    }

    #[test]
    fn accounts_filter_by_role() {
        let (ledger, ..) = seeded();

        let all = ledger.accounts(None).unwrap();
        assert_eq!(all.len(), 3);

        let visible = ledger
            .accounts(Some(&[Role::Student, Role::Vendor]))
            .unwrap();
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].user.username, "ada");
        assert_eq!(visible[0].balance, 600);
    }

    #[test]
    fn password_hash_can_be_replaced() {
        let (ledger, student, ..) = seeded();
        ledger
            .set_password_hash(student, "newsalt$newdigest".into())
            .unwrap();
        assert_eq!(
            ledger.find_user(student).unwrap().password_hash,
            "newsalt$newdigest"
        );
    }

    #[test]
    fn concurrent_charges_never_overdraw() {
        let (ledger, student, vendor, _) = seeded();
        let ledger = Arc::new(ledger);

        // 8 vendors race to charge 90 tokens ten times each against a 600
        // balance. Only some succeed; the total debited can never exceed
        // the opening balance.
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    let mut successes = 0u64;
                    for _ in 0..10 {
                        if ledger.transfer(student, vendor, 90).is_ok() {
                            successes += 1;
                        }
                    }
                    successes
                })
            })
            .collect();

        let total_successes: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        let student_balance = ledger.wallet_of(student).unwrap().balance;
        let vendor_balance = ledger.wallet_of(vendor).unwrap().balance;
        assert_eq!(total_successes, 6); // 6 * 90 = 540, a 7th would overdraw
        assert_eq!(student_balance, 600 - 540);
        assert_eq!(vendor_balance, 540);
        assert_eq!(ledger.all_transactions().unwrap().len(), 6);
    }
}
