// 6.0.2: error taxonomy for ledger operations. validation errors fire before
// any adapter call or mutation; adapter errors are surfaced verbatim with a
// classification so the caller owns retry policy.

use crate::custody::CustodyError;
use crate::transfer::PaymentError;
use crate::types::{Address, Amount, LoanId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid amount: requested {requested}, maximum loan {max_loan}")]
    InvalidAmount { requested: Amount, max_loan: Amount },

    #[error("duration {days}d exceeds maximum {max_days}d")]
    DurationTooLong { days: u16, max_days: u16 },

    #[error("{0} not found")]
    NotFound(LoanId),

    #[error("{0} is already funded")]
    AlreadyFunded(LoanId),

    #[error("{0} is already resolved")]
    AlreadyResolved(LoanId),

    #[error("{caller} is not authorized to act on {loan_id}")]
    Unauthorized { loan_id: LoanId, caller: Address },

    #[error("{loan_id} is not yet due: due at {due_date}, now {now}")]
    NotYetDue {
        loan_id: LoanId,
        due_date: Timestamp,
        now: Timestamp,
    },

    #[error("custody: {0}")]
    Custody(#[from] CustodyError),

    #[error("payment: {0}")]
    Payment(#[from] PaymentError),
}

/// Whether a failure was detected by the ledger's own validation or reported
/// by an external settlement rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    External,
}

impl LedgerError {
    pub fn class(&self) -> ErrorClass {
        match self {
            LedgerError::Custody(_) | LedgerError::Payment(_) => ErrorClass::External,
            _ => ErrorClass::Validation,
        }
    }

    /// Safe to retry: the rail timed out and the failed step is idempotent.
    /// Everything else is a definitive answer.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::Custody(CustodyError::Timeout { .. })
                | LedgerError::Payment(PaymentError::Timeout { .. })
        )
    }
}
