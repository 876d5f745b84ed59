// 4.0 custody.rs: collateral custody rail. the ledger never touches tokens
// directly; it issues lock/release commands through this trait and only
// commits state once the rail confirms. operations are idempotent per
// (loan_id, step) so a host-side retry after a timeout is safe.

use crate::types::{Address, LoanId, TokenId};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustodyError {
    #[error("{0} is not registered with the custody rail")]
    TokenNotFound(TokenId),

    #[error("{token} is held by {holder}, not {claimed}")]
    NotOwner {
        token: TokenId,
        holder: Address,
        claimed: Address,
    },

    #[error("{token} is already locked for {held_for}")]
    AlreadyLocked { token: TokenId, held_for: LoanId },

    #[error("{token} is not locked for {loan_id}")]
    NotLocked { token: TokenId, loan_id: LoanId },

    #[error("custody rail did not respond within {waited:?}")]
    Timeout { waited: Duration },
}

/// Exclusive-control operations over a collateral token. Implementations
/// model external settlement: calls may block up to `timeout` and must be
/// idempotent per `(loan_id, step)`.
pub trait CollateralCustody: Send + Sync {
    /// Take exclusive control of `token` from `owner` on behalf of `loan_id`.
    fn lock(
        &self,
        loan_id: LoanId,
        token: TokenId,
        owner: &Address,
        timeout: Duration,
    ) -> Result<(), CustodyError>;

    /// Return control of `token` to `to` (borrower on repayment, lender on
    /// liquidation).
    fn release(
        &self,
        loan_id: LoanId,
        token: TokenId,
        to: &Address,
        timeout: Duration,
    ) -> Result<(), CustodyError>;
}

#[derive(Debug, Default)]
struct CustodyState {
    owners: HashMap<TokenId, Address>,
    locks: HashMap<TokenId, LoanId>,
    unavailable: bool,
}

/// In-memory custody rail. Serves as the test double and the demo backend;
/// a production rail would drive token transfers or an escrow account.
#[derive(Debug, Default)]
pub struct MemoryCustody {
    state: Mutex<CustodyState>,
}

impl MemoryCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token as held by `owner`.
    pub fn register(&self, token: TokenId, owner: Address) {
        self.state().owners.insert(token, owner);
    }

    /// Simulate an outage: every call reports `Timeout` until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    pub fn holder_of(&self, token: TokenId) -> Option<Address> {
        self.state().owners.get(&token).cloned()
    }

    pub fn is_locked(&self, token: TokenId) -> bool {
        self.state().locks.contains_key(&token)
    }

    fn state(&self) -> std::sync::MutexGuard<'_, CustodyState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CollateralCustody for MemoryCustody {
    fn lock(
        &self,
        loan_id: LoanId,
        token: TokenId,
        owner: &Address,
        timeout: Duration,
    ) -> Result<(), CustodyError> {
        let mut state = self.state();
        if state.unavailable {
            return Err(CustodyError::Timeout { waited: timeout });
        }

        let holder = state
            .owners
            .get(&token)
            .ok_or(CustodyError::TokenNotFound(token))?;
        if holder != owner {
            return Err(CustodyError::NotOwner {
                token,
                holder: holder.clone(),
                claimed: owner.clone(),
            });
        }

        match state.locks.get(&token) {
            // replay of our own lock
            Some(held_for) if *held_for == loan_id => Ok(()),
            Some(held_for) => Err(CustodyError::AlreadyLocked {
                token,
                held_for: *held_for,
            }),
            None => {
                state.locks.insert(token, loan_id);
                Ok(())
            }
        }
    }

    fn release(
        &self,
        loan_id: LoanId,
        token: TokenId,
        to: &Address,
        timeout: Duration,
    ) -> Result<(), CustodyError> {
        let mut state = self.state();
        if state.unavailable {
            return Err(CustodyError::Timeout { waited: timeout });
        }

        match state.locks.get(&token) {
            Some(held_for) if *held_for == loan_id => {
                state.locks.remove(&token);
                state.owners.insert(token, to.clone());
                Ok(())
            }
            Some(held_for) => Err(CustodyError::AlreadyLocked {
                token,
                held_for: *held_for,
            }),
            // replay: already released to the same recipient
            None if state.owners.get(&token) == Some(to) => Ok(()),
            None => Err(CustodyError::NotLocked { token, loan_id }),
        }
    }
}
