// 7.0: every committed state change produces an event. used for audit trails
// and notifying external systems. failures commit nothing and emit nothing.

use crate::types::{Address, Amount, Bps, LoanId, Timestamp, TokenId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    LoanRequested(LoanRequestedEvent),
    LoanFunded(LoanFundedEvent),
    LoanRepaid(LoanRepaidEvent),
    LoanLiquidated(LoanLiquidatedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRequestedEvent {
    pub loan_id: LoanId,
    pub borrower: Address,
    pub collateral_token: TokenId,
    pub declared_value: Amount,
    pub principal: Amount,
    pub interest_rate: Bps,
    pub duration_days: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanFundedEvent {
    pub loan_id: LoanId,
    pub lender: Address,
    pub principal: Amount,
    pub repayment_amount: Amount,
    pub due_date: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRepaidEvent {
    pub loan_id: LoanId,
    pub borrower: Address,
    pub amount_paid: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanLiquidatedEvent {
    pub loan_id: LoanId,
    pub lender: Address,
    pub collateral_token: TokenId,
}
