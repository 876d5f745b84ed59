// 5.0 transfer.rs: stable-value rail. incoming money is evidenced by a
// PaymentProof the rail can verify; outgoing money moves through forward(),
// idempotent per (loan_id, step). the ledger verifies before it commits and
// never moves value on its own.

use crate::types::{Address, Amount, LoanId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// Evidence of a deposit into the ledger's custody account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentProof {
    /// Rail-specific reference (transaction id, receipt number).
    pub reference: String,
    pub from: Address,
    pub amount: Amount,
}

impl PaymentProof {
    pub fn new(reference: impl Into<String>, from: Address, amount: Amount) -> Self {
        Self {
            reference: reference.into(),
            from,
            amount,
        }
    }
}

/// Which leg of a loan a forward belongs to. Part of the idempotency key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStep {
    /// Principal to the borrower at funding time.
    Disburse,
    /// Repayment to the lender at resolution time.
    RepayLender,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("payment amount mismatch: expected {expected}, got {actual}")]
    Mismatch { expected: Amount, actual: Amount },

    #[error("payment sender mismatch: expected {expected}, got {actual}")]
    WrongSender { expected: Address, actual: Address },

    #[error("no deposit found for reference {0:?}")]
    UnknownProof(String),

    #[error("payment rail did not respond within {waited:?}")]
    Timeout { waited: Duration },
}

/// Moves the loan currency between borrower, lender, and the ledger's
/// custody account. Calls may block up to `timeout`; `forward` is idempotent
/// per `(loan_id, step)`.
pub trait StableTransfer: Send + Sync {
    /// Check that `proof` represents exactly `expected_amount` deposited by
    /// `expected_from`. Read-only; consumes nothing.
    fn verify_incoming(
        &self,
        proof: &PaymentProof,
        expected_amount: Amount,
        expected_from: &Address,
        timeout: Duration,
    ) -> Result<(), PaymentError>;

    /// Pay `amount` out of the ledger's custody account to `to`.
    fn forward(
        &self,
        loan_id: LoanId,
        step: TransferStep,
        amount: Amount,
        to: &Address,
        timeout: Duration,
    ) -> Result<(), PaymentError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub loan_id: LoanId,
    pub step: TransferStep,
    pub amount: Amount,
    pub to: Address,
}

#[derive(Debug, Default)]
struct BankState {
    // deposits into the ledger's custody account, by reference
    deposits: HashMap<String, (Address, Amount)>,
    outgoing: Vec<TransferRecord>,
    applied: HashSet<(LoanId, TransferStep)>,
    unavailable: bool,
}

/// In-memory stable-value rail. Test double and demo backend.
#[derive(Debug, Default)]
pub struct MemoryBank {
    state: Mutex<BankState>,
}

impl MemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a deposit so a matching PaymentProof verifies.
    pub fn register_deposit(&self, reference: impl Into<String>, from: Address, amount: Amount) {
        self.state()
            .deposits
            .insert(reference.into(), (from, amount));
    }

    /// Simulate an outage: every call reports `Timeout` until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    pub fn outgoing(&self) -> Vec<TransferRecord> {
        self.state().outgoing.clone()
    }

    pub fn total_paid_to(&self, addr: &Address) -> u128 {
        self.state()
            .outgoing
            .iter()
            .filter(|t| &t.to == addr)
            .map(|t| t.amount.value() as u128)
            .sum()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, BankState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StableTransfer for MemoryBank {
    fn verify_incoming(
        &self,
        proof: &PaymentProof,
        expected_amount: Amount,
        expected_from: &Address,
        timeout: Duration,
    ) -> Result<(), PaymentError> {
        let state = self.state();
        if state.unavailable {
            return Err(PaymentError::Timeout { waited: timeout });
        }

        let (from, amount) = state
            .deposits
            .get(&proof.reference)
            .ok_or_else(|| PaymentError::UnknownProof(proof.reference.clone()))?;

        if from != expected_from {
            return Err(PaymentError::WrongSender {
                expected: expected_from.clone(),
                actual: from.clone(),
            });
        }
        if *amount != expected_amount {
            return Err(PaymentError::Mismatch {
                expected: expected_amount,
                actual: *amount,
            });
        }
        Ok(())
    }

    fn forward(
        &self,
        loan_id: LoanId,
        step: TransferStep,
        amount: Amount,
        to: &Address,
        timeout: Duration,
    ) -> Result<(), PaymentError> {
        let mut state = self.state();
        if state.unavailable {
            return Err(PaymentError::Timeout { waited: timeout });
        }

        // replay of an already-applied leg
        if !state.applied.insert((loan_id, step)) {
            return Ok(());
        }

        state.outgoing.push(TransferRecord {
            loan_id,
            step,
            amount,
            to: to.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn verify_matches_registered_deposit() {
        let bank = MemoryBank::new();
        let lender = Address::new("lender");
        bank.register_deposit("tx-1", lender.clone(), Amount::new(80_000));

        let proof = PaymentProof::new("tx-1", lender.clone(), Amount::new(80_000));
        bank.verify_incoming(&proof, Amount::new(80_000), &lender, TIMEOUT)
            .unwrap();
    }

    #[test]
    fn verify_rejects_wrong_amount_and_sender() {
        let bank = MemoryBank::new();
        let lender = Address::new("lender");
        bank.register_deposit("tx-1", lender.clone(), Amount::new(79_000));

        let proof = PaymentProof::new("tx-1", lender.clone(), Amount::new(79_000));
        let err = bank
            .verify_incoming(&proof, Amount::new(80_000), &lender, TIMEOUT)
            .unwrap_err();
        assert_eq!(
            err,
            PaymentError::Mismatch {
                expected: Amount::new(80_000),
                actual: Amount::new(79_000),
            }
        );

        let err = bank
            .verify_incoming(&proof, Amount::new(79_000), &Address::new("other"), TIMEOUT)
            .unwrap_err();
        assert!(matches!(err, PaymentError::WrongSender { .. }));
    }

    #[test]
    fn verify_unknown_reference() {
        let bank = MemoryBank::new();
        let proof = PaymentProof::new("missing", Address::new("x"), Amount::new(1));
        let err = bank
            .verify_incoming(&proof, Amount::new(1), &Address::new("x"), TIMEOUT)
            .unwrap_err();
        assert_eq!(err, PaymentError::UnknownProof("missing".to_string()));
    }

    #[test]
    fn forward_is_idempotent_per_step() {
        let bank = MemoryBank::new();
        let borrower = Address::new("borrower");

        bank.forward(LoanId(1), TransferStep::Disburse, Amount::new(80_000), &borrower, TIMEOUT)
            .unwrap();
        // retry after a presumed timeout: no double spend
        bank.forward(LoanId(1), TransferStep::Disburse, Amount::new(80_000), &borrower, TIMEOUT)
            .unwrap();

        assert_eq!(bank.outgoing().len(), 1);
        assert_eq!(bank.total_paid_to(&borrower), 80_000);

        // a different leg of the same loan does go through
        let lender = Address::new("lender");
        bank.forward(LoanId(1), TransferStep::RepayLender, Amount::new(80_986), &lender, TIMEOUT)
            .unwrap();
        assert_eq!(bank.outgoing().len(), 2);
    }

    #[test]
    fn outage_reports_timeout() {
        let bank = MemoryBank::new();
        bank.set_unavailable(true);

        let err = bank
            .forward(LoanId(1), TransferStep::Disburse, Amount::new(1), &Address::new("b"), TIMEOUT)
            .unwrap_err();
        assert_eq!(err, PaymentError::Timeout { waited: TIMEOUT });
    }
}
