//! Read-only projections over committed ledger state.
//!
//! Indices are maintained as the last step of each successful commit, so
//! every id returned here resolves to an existing record.

use super::core::LoanLedger;
use crate::loan::{ActiveLoan, LoanRequest};
use crate::types::{Address, LoanId};
use serde::{Deserialize, Serialize};

/// Aggregate counters for dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    /// Loan requests created.
    pub total_issued: u64,
    /// Cumulative funded principal.
    pub total_volume: u128,
    /// Next id the ledger will assign.
    pub next_id: LoanId,
}

impl LoanLedger {
    pub fn loan_request(&self, loan_id: LoanId) -> Option<&LoanRequest> {
        self.requests.get(&loan_id)
    }

    pub fn active_loan(&self, loan_id: LoanId) -> Option<&ActiveLoan> {
        self.loans.get(&loan_id)
    }

    /// Loans requested by `borrower`, in request order.
    pub fn borrower_loans(&self, borrower: &Address) -> &[LoanId] {
        self.borrower_index
            .get(borrower)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Loans funded by `lender`, in funding order.
    pub fn lender_loans(&self, lender: &Address) -> &[LoanId] {
        self.lender_index
            .get(lender)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            total_issued: self.total_issued,
            total_volume: self.total_volume,
            next_id: self.peek_next_loan_id(),
        }
    }
}
