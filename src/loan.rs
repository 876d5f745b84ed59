// 3.0: loan records and the money math on them. a LoanRequest is immutable once
// created apart from the Pending -> Funded status flip; funding mints the
// ActiveLoan that carries the repayment schedule.

use crate::types::{Address, Amount, Bps, LoanId, Timestamp, TokenId, BPS_DENOMINATOR};
use serde::{Deserialize, Serialize};

pub const DAYS_PER_YEAR: u64 = 365;
pub const MAX_DURATION_DAYS: u16 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Funded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Active,
    Repaid,
    Liquidated,
}

impl LoanStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Repaid | LoanStatus::Liquidated)
    }
}

/// A borrower's request to borrow against a locked collateral token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRequest {
    pub loan_id: LoanId,
    pub borrower: Address,
    pub collateral_token: TokenId,
    pub declared_value: Amount,
    /// Requested principal, validated against the LTV cap at creation.
    pub principal: Amount,
    pub interest_rate: Bps,
    pub duration_days: u16,
    pub requested_at: Timestamp,
    pub status: RequestStatus,
}

/// A funded loan. Created only from a Pending LoanRequest; terminal once
/// repaid or liquidated, and the collateral is released exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveLoan {
    pub loan_id: LoanId,
    pub borrower: Address,
    pub lender: Address,
    pub collateral_token: TokenId,
    pub principal: Amount,
    pub interest_rate: Bps,
    pub duration_days: u16,
    pub repayment_amount: Amount,
    pub funded_at: Timestamp,
    pub due_date: Timestamp,
    pub status: LoanStatus,
    pub resolved_at: Option<Timestamp>,
}

impl ActiveLoan {
    /// Liquidation eligibility is a strict inequality: a loan due at exactly
    /// `due_date` is not yet overdue.
    pub fn is_overdue(&self, now: Timestamp) -> bool {
        now > self.due_date
    }
}

/// Total owed at maturity: principal plus simple interest, integer basis
/// points, floor division. `principal + floor(principal * rate * days / (10000 * 365))`.
pub fn repayment_amount(principal: Amount, rate: Bps, duration_days: u16) -> Option<Amount> {
    let interest = (principal.value() as u128)
        .checked_mul(rate.value() as u128)?
        .checked_mul(duration_days as u128)?
        / (BPS_DENOMINATOR as u128 * DAYS_PER_YEAR as u128);
    let interest = u64::try_from(interest).ok()?;
    principal.checked_add(Amount::new(interest))
}

/// Maturity timestamp for a loan funded at `funded_at`.
pub fn due_date(funded_at: Timestamp, duration_days: u16) -> Timestamp {
    funded_at.plus_days(duration_days)
}
