// 6.2 ledger/ops.rs: the state machine. PENDING -> FUNDED(ACTIVE) -> {REPAID |
// LIQUIDATED}, no transition skips a state. each operation is split into a
// pure prepare_* (validation on &self, no mutation) and a commit_* (&mut self)
// so the concurrent surface can run adapter calls between the two without
// holding the store lock. validation order: existence, state, authorization,
// amount/time — all before any adapter call, so a failure leaves no trace.

use super::core::LoanLedger;
use super::results::LedgerError;
use crate::events::{
    EventPayload, LoanFundedEvent, LoanLiquidatedEvent, LoanRepaidEvent, LoanRequestedEvent,
};
use crate::loan::{
    due_date, repayment_amount, ActiveLoan, LoanRequest, LoanStatus, RequestStatus,
};
use crate::pricing::{max_loan_amount, price_loan, LoanTerms};
use crate::types::{Address, Amount, Bps, LoanId, Timestamp, TokenId};

/// Borrower-supplied inputs to a loan request. The risk score is an input:
/// the registry that produces it is an external collaborator, not a ledger
/// dependency.
#[derive(Debug, Clone)]
pub struct LoanRequestParams {
    pub borrower: Address,
    pub collateral_token: TokenId,
    pub declared_value: Amount,
    pub requested_amount: Amount,
    pub duration_days: u16,
    pub risk_score: u32,
}

/// Validated request, priced and carrying its allocated id. The custody lock
/// happens between prepare and commit.
#[derive(Debug, Clone)]
pub struct RequestPlan {
    pub loan_id: LoanId,
    pub borrower: Address,
    pub collateral_token: TokenId,
    pub declared_value: Amount,
    pub principal: Amount,
    pub terms: LoanTerms,
    pub duration_days: u16,
}

/// Validated funding, with the repayment schedule fixed at prepare time.
#[derive(Debug, Clone)]
pub struct FundingPlan {
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
}

#[derive(Debug, Clone)]
pub struct RepaymentPlan {
    pub loan_id: LoanId,
    pub borrower: Address,
    pub lender: Address,
    pub collateral_token: TokenId,
    pub repayment_amount: Amount,
}

#[derive(Debug, Clone)]
pub struct LiquidationPlan {
    pub loan_id: LoanId,
    pub lender: Address,
    pub collateral_token: TokenId,
    pub due_date: Timestamp,
}

impl LoanLedger {
    pub fn prepare_request(&self, params: &LoanRequestParams) -> Result<RequestPlan, LedgerError> {
        let terms = price_loan(params.risk_score);
        let max_loan = max_loan_amount(params.declared_value, &terms);

        if params.requested_amount.is_zero() || params.requested_amount > max_loan {
            return Err(LedgerError::InvalidAmount {
                requested: params.requested_amount,
                max_loan,
            });
        }
        if params.duration_days > self.config.max_duration_days {
            return Err(LedgerError::DurationTooLong {
                days: params.duration_days,
                max_days: self.config.max_duration_days,
            });
        }
        // the repayment schedule must be representable before we take custody
        if repayment_amount(params.requested_amount, terms.interest_rate, params.duration_days)
            .is_none()
        {
            return Err(LedgerError::InvalidAmount {
                requested: params.requested_amount,
                max_loan,
            });
        }

        Ok(RequestPlan {
            loan_id: self.allocate_loan_id(),
            borrower: params.borrower.clone(),
            collateral_token: params.collateral_token,
            declared_value: params.declared_value,
            principal: params.requested_amount,
            terms,
            duration_days: params.duration_days,
        })
    }

    pub fn commit_request(&mut self, plan: RequestPlan) -> LoanId {
        let loan_id = plan.loan_id;
        let request = LoanRequest {
            loan_id,
            borrower: plan.borrower.clone(),
            collateral_token: plan.collateral_token,
            declared_value: plan.declared_value,
            principal: plan.principal,
            interest_rate: plan.terms.interest_rate,
            duration_days: plan.duration_days,
            requested_at: self.current_time,
            status: RequestStatus::Pending,
        };

        self.requests.insert(loan_id, request);
        self.total_issued += 1;
        self.emit_event(EventPayload::LoanRequested(LoanRequestedEvent {
            loan_id,
            borrower: plan.borrower.clone(),
            collateral_token: plan.collateral_token,
            declared_value: plan.declared_value,
            principal: plan.principal,
            interest_rate: plan.terms.interest_rate,
            duration_days: plan.duration_days,
        }));
        // index append is the last step: readers never see an entry pointing
        // at a record that does not exist yet
        self.borrower_index
            .entry(plan.borrower)
            .or_default()
            .push(loan_id);

        loan_id
    }

    pub fn prepare_funding(
        &self,
        loan_id: LoanId,
        lender: &Address,
    ) -> Result<FundingPlan, LedgerError> {
        let request = self
            .requests
            .get(&loan_id)
            .ok_or(LedgerError::NotFound(loan_id))?;
        if request.status == RequestStatus::Funded {
            return Err(LedgerError::AlreadyFunded(loan_id));
        }

        let repayment =
            repayment_amount(request.principal, request.interest_rate, request.duration_days)
                .ok_or(LedgerError::InvalidAmount {
                    requested: request.principal,
                    max_loan: request.declared_value,
                })?;
        let funded_at = self.current_time;

        Ok(FundingPlan {
            loan_id,
            borrower: request.borrower.clone(),
            lender: lender.clone(),
            collateral_token: request.collateral_token,
            principal: request.principal,
            interest_rate: request.interest_rate,
            duration_days: request.duration_days,
            repayment_amount: repayment,
            funded_at,
            due_date: due_date(funded_at, request.duration_days),
        })
    }

    pub fn commit_funding(&mut self, plan: FundingPlan) -> ActiveLoan {
        if let Some(request) = self.requests.get_mut(&plan.loan_id) {
            request.status = RequestStatus::Funded;
        }

        let loan = ActiveLoan {
            loan_id: plan.loan_id,
            borrower: plan.borrower,
            lender: plan.lender.clone(),
            collateral_token: plan.collateral_token,
            principal: plan.principal,
            interest_rate: plan.interest_rate,
            duration_days: plan.duration_days,
            repayment_amount: plan.repayment_amount,
            funded_at: plan.funded_at,
            due_date: plan.due_date,
            status: LoanStatus::Active,
            resolved_at: None,
        };

        self.loans.insert(plan.loan_id, loan.clone());
        self.total_volume += plan.principal.value() as u128;
        self.emit_event(EventPayload::LoanFunded(LoanFundedEvent {
            loan_id: plan.loan_id,
            lender: plan.lender.clone(),
            principal: plan.principal,
            repayment_amount: plan.repayment_amount,
            due_date: plan.due_date,
        }));
        self.lender_index
            .entry(plan.lender)
            .or_default()
            .push(plan.loan_id);

        loan
    }

    pub fn prepare_repayment(
        &self,
        loan_id: LoanId,
        caller: &Address,
    ) -> Result<RepaymentPlan, LedgerError> {
        let loan = self
            .loans
            .get(&loan_id)
            .ok_or(LedgerError::NotFound(loan_id))?;
        if loan.status.is_terminal() {
            return Err(LedgerError::AlreadyResolved(loan_id));
        }
        if &loan.borrower != caller {
            return Err(LedgerError::Unauthorized {
                loan_id,
                caller: caller.clone(),
            });
        }

        Ok(RepaymentPlan {
            loan_id,
            borrower: loan.borrower.clone(),
            lender: loan.lender.clone(),
            collateral_token: loan.collateral_token,
            repayment_amount: loan.repayment_amount,
        })
    }

    pub fn commit_repayment(&mut self, loan_id: LoanId) -> Option<ActiveLoan> {
        let now = self.current_time;
        let (event, resolved) = {
            let loan = self.loans.get_mut(&loan_id)?;
            loan.status = LoanStatus::Repaid;
            loan.resolved_at = Some(now);
            (
                EventPayload::LoanRepaid(LoanRepaidEvent {
                    loan_id,
                    borrower: loan.borrower.clone(),
                    amount_paid: loan.repayment_amount,
                }),
                loan.clone(),
            )
        };
        self.emit_event(event);
        Some(resolved)
    }

    pub fn prepare_liquidation(
        &self,
        loan_id: LoanId,
        caller: &Address,
    ) -> Result<LiquidationPlan, LedgerError> {
        let loan = self
            .loans
            .get(&loan_id)
            .ok_or(LedgerError::NotFound(loan_id))?;
        if loan.status.is_terminal() {
            return Err(LedgerError::AlreadyResolved(loan_id));
        }
        if &loan.lender != caller {
            return Err(LedgerError::Unauthorized {
                loan_id,
                caller: caller.clone(),
            });
        }
        if !loan.is_overdue(self.current_time) {
            return Err(LedgerError::NotYetDue {
                loan_id,
                due_date: loan.due_date,
                now: self.current_time,
            });
        }

        Ok(LiquidationPlan {
            loan_id,
            lender: loan.lender.clone(),
            collateral_token: loan.collateral_token,
            due_date: loan.due_date,
        })
    }

    pub fn commit_liquidation(&mut self, loan_id: LoanId) -> Option<ActiveLoan> {
        let now = self.current_time;
        let (event, resolved) = {
            let loan = self.loans.get_mut(&loan_id)?;
            loan.status = LoanStatus::Liquidated;
            loan.resolved_at = Some(now);
            (
                EventPayload::LoanLiquidated(LoanLiquidatedEvent {
                    loan_id,
                    lender: loan.lender.clone(),
                    collateral_token: loan.collateral_token,
                }),
                loan.clone(),
            )
        };
        self.emit_event(event);
        Some(resolved)
    }
}
