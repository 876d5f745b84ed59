// 8.0 shared.rs: the engine command surface. wraps the ledger for concurrent
// hosts: a read-write lock over the store, plus a per-loan lock table so
// mutations on the same loan serialize while unrelated loans proceed in
// parallel. adapter calls run outside the store lock but inside the per-loan
// guard; the store only mutates after the rail has confirmed.

use crate::custody::CollateralCustody;
use crate::events::Event;
use crate::ledger::{LedgerConfig, LedgerError, LedgerStats, LoanLedger, LoanRequestParams};
use crate::loan::{ActiveLoan, LoanRequest};
use crate::transfer::{PaymentProof, StableTransfer, TransferStep};
use crate::types::{Address, LoanId, Timestamp};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

#[derive(Debug)]
pub struct SharedLedger {
    store: RwLock<LoanLedger>,
    locks: Mutex<HashMap<LoanId, Arc<Mutex<()>>>>,
}

impl SharedLedger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            store: RwLock::new(LoanLedger::new(config)),
            locks: Mutex::new(HashMap::new()),
        }
    }

    // ---- lifecycle operations -------------------------------------------

    /// Request a loan against a collateral token. Locks the collateral
    /// before any state is recorded; a lock failure records nothing (the
    /// allocated id is skipped, ids are increasing but not dense).
    pub fn request_loan(
        &self,
        custody: &dyn CollateralCustody,
        params: LoanRequestParams,
        timeout: Duration,
    ) -> Result<LoanId, LedgerError> {
        let plan = self.read().prepare_request(&params)?;
        custody.lock(plan.loan_id, plan.collateral_token, &plan.borrower, timeout)?;
        Ok(self.write().commit_request(plan))
    }

    /// Fund a pending request. Exactly one of two racing funders commits;
    /// the loser observes FUNDED during prepare and fails before its payment
    /// proof is ever consumed.
    pub fn fund_loan(
        &self,
        transfer: &dyn StableTransfer,
        loan_id: LoanId,
        lender: Address,
        proof: PaymentProof,
        timeout: Duration,
    ) -> Result<ActiveLoan, LedgerError> {
        let entry = self.loan_entry(loan_id);
        let _held = lock_entry(&entry);

        let plan = self.read().prepare_funding(loan_id, &lender)?;
        transfer.verify_incoming(&proof, plan.principal, &lender, timeout)?;
        transfer.forward(
            loan_id,
            TransferStep::Disburse,
            plan.principal,
            &plan.borrower,
            timeout,
        )?;
        Ok(self.write().commit_funding(plan))
    }

    /// Repay an active loan. Repayment goes to the lender, collateral back
    /// to the borrower, then the loan turns REPAID.
    pub fn repay_loan(
        &self,
        custody: &dyn CollateralCustody,
        transfer: &dyn StableTransfer,
        loan_id: LoanId,
        borrower: Address,
        proof: PaymentProof,
        timeout: Duration,
    ) -> Result<ActiveLoan, LedgerError> {
        let entry = self.loan_entry(loan_id);
        let _held = lock_entry(&entry);

        let plan = self.read().prepare_repayment(loan_id, &borrower)?;
        transfer.verify_incoming(&proof, plan.repayment_amount, &borrower, timeout)?;
        transfer.forward(
            loan_id,
            TransferStep::RepayLender,
            plan.repayment_amount,
            &plan.lender,
            timeout,
        )?;
        custody.release(loan_id, plan.collateral_token, &plan.borrower, timeout)?;

        let resolved = self
            .write()
            .commit_repayment(loan_id)
            .ok_or(LedgerError::NotFound(loan_id))?;
        self.drop_loan_entry(loan_id);
        Ok(resolved)
    }

    /// Liquidate an overdue loan. The lender claims the collateral in lieu
    /// of repayment; no stable value moves.
    pub fn liquidate_loan(
        &self,
        custody: &dyn CollateralCustody,
        loan_id: LoanId,
        lender: Address,
        timeout: Duration,
    ) -> Result<ActiveLoan, LedgerError> {
        let entry = self.loan_entry(loan_id);
        let _held = lock_entry(&entry);

        let plan = self.read().prepare_liquidation(loan_id, &lender)?;
        custody.release(loan_id, plan.collateral_token, &plan.lender, timeout)?;

        let resolved = self
            .write()
            .commit_liquidation(loan_id)
            .ok_or(LedgerError::NotFound(loan_id))?;
        self.drop_loan_entry(loan_id);
        Ok(resolved)
    }

    // ---- queries: cloned snapshots of committed state -------------------

    pub fn loan_request(&self, loan_id: LoanId) -> Option<LoanRequest> {
        self.read().loan_request(loan_id).cloned()
    }

    pub fn active_loan(&self, loan_id: LoanId) -> Option<ActiveLoan> {
        self.read().active_loan(loan_id).cloned()
    }

    pub fn borrower_loans(&self, borrower: &Address) -> Vec<LoanId> {
        self.read().borrower_loans(borrower).to_vec()
    }

    pub fn lender_loans(&self, lender: &Address) -> Vec<LoanId> {
        self.read().lender_loans(lender).to_vec()
    }

    pub fn stats(&self) -> LedgerStats {
        self.read().stats()
    }

    pub fn recent_events(&self, count: usize) -> Vec<Event> {
        self.read().recent_events(count).to_vec()
    }

    // ---- clock ----------------------------------------------------------

    pub fn set_time(&self, timestamp: Timestamp) {
        self.write().set_time(timestamp);
    }

    pub fn advance_time(&self, secs: i64) {
        self.write().advance_time(secs);
    }

    pub fn time(&self) -> Timestamp {
        self.read().time()
    }

    // ---- internals ------------------------------------------------------

    fn read(&self) -> RwLockReadGuard<'_, LoanLedger> {
        self.store.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, LoanLedger> {
        self.store.write().unwrap_or_else(|e| e.into_inner())
    }

    fn loan_entry(&self, loan_id: LoanId) -> Arc<Mutex<()>> {
        let mut table = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        table.entry(loan_id).or_default().clone()
    }

    // terminal loans accept no further mutations; their entry is dead weight
    fn drop_loan_entry(&self, loan_id: LoanId) {
        let mut table = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        table.remove(&loan_id);
    }
}

fn lock_entry(entry: &Arc<Mutex<()>>) -> MutexGuard<'_, ()> {
    entry.lock().unwrap_or_else(|e| e.into_inner())
}
