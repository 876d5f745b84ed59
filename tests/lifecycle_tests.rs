//! Loan lifecycle scenario tests.
//!
//! End-to-end coverage of the request -> fund -> repay/liquidate state
//! machine against the in-memory settlement rails, including the boundary
//! and failure behavior the engine guarantees.

use lading_core::*;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);
const T0: i64 = 1_700_000_000;

struct Harness {
    ledger: SharedLedger,
    custody: MemoryCustody,
    bank: MemoryBank,
    borrower: Address,
    lender: Address,
}

impl Harness {
    fn new() -> Self {
        let ledger = SharedLedger::new(LedgerConfig::default());
        ledger.set_time(Timestamp::from_secs(T0));
        let custody = MemoryCustody::new();
        let borrower = Address::new("importer-co");
        custody.register(TokenId(7), borrower.clone());
        Self {
            ledger,
            custody,
            bank: MemoryBank::new(),
            borrower,
            lender: Address::new("liquidity-desk"),
        }
    }

    fn request(&self, amount: u64) -> Result<LoanId, LedgerError> {
        self.ledger.request_loan(
            &self.custody,
            LoanRequestParams {
                borrower: self.borrower.clone(),
                collateral_token: TokenId(7),
                declared_value: Amount::new(100_000),
                requested_amount: Amount::new(amount),
                duration_days: 90,
                risk_score: 250,
            },
            TIMEOUT,
        )
    }

    fn fund(&self, loan_id: LoanId) -> Result<ActiveLoan, LedgerError> {
        self.bank
            .register_deposit("fund", self.lender.clone(), Amount::new(80_000));
        self.ledger.fund_loan(
            &self.bank,
            loan_id,
            self.lender.clone(),
            PaymentProof::new("fund", self.lender.clone(), Amount::new(80_000)),
            TIMEOUT,
        )
    }

    fn repay(&self, loan_id: LoanId, amount: Amount) -> Result<ActiveLoan, LedgerError> {
        self.bank
            .register_deposit("repay", self.borrower.clone(), amount);
        self.ledger.repay_loan(
            &self.custody,
            &self.bank,
            loan_id,
            self.borrower.clone(),
            PaymentProof::new("repay", self.borrower.clone(), amount),
            TIMEOUT,
        )
    }
}

#[test]
fn reference_scenario_pricing_and_repayment() {
    let h = Harness::new();

    // riskScore 250, value 100_000: max loan 80_000 at 500 bps
    let loan_id = h.request(80_000).unwrap();
    let request = h.ledger.loan_request(loan_id).unwrap();
    assert_eq!(request.interest_rate, Bps::new(500));
    assert_eq!(request.status, RequestStatus::Pending);

    let loan = h.fund(loan_id).unwrap();
    // 80_000 + floor(80_000 * 500 * 90 / 3_650_000) = 80_986
    assert_eq!(loan.repayment_amount, Amount::new(80_986));
    assert_eq!(loan.due_date, Timestamp::from_secs(T0 + 90 * 86_400));

    let resolved = h.repay(loan_id, Amount::new(80_986)).unwrap();
    assert_eq!(resolved.status, LoanStatus::Repaid);
    assert_eq!(resolved.resolved_at, Some(h.ledger.time()));

    // conservation: lender received exactly the repayment amount
    assert_eq!(h.bank.total_paid_to(&h.lender), 80_986);
    // collateral back with the borrower
    assert_eq!(h.custody.holder_of(TokenId(7)), Some(h.borrower.clone()));
}

#[test]
fn one_unit_over_ltv_cap_is_invalid() {
    let h = Harness::new();
    let err = h.request(80_001).unwrap_err();
    assert_eq!(
        err,
        LedgerError::InvalidAmount {
            requested: Amount::new(80_001),
            max_loan: Amount::new(80_000),
        }
    );
    assert_eq!(err.class(), ErrorClass::Validation);
    // nothing recorded, collateral untouched
    assert_eq!(h.ledger.stats().total_issued, 0);
    assert!(!h.custody.is_locked(TokenId(7)));
}

#[test]
fn liquidation_boundary_is_exclusive() {
    let h = Harness::new();
    let loan_id = h.request(80_000).unwrap();
    let loan = h.fund(loan_id).unwrap();

    // immediately after funding
    let err = h
        .ledger
        .liquidate_loan(&h.custody, loan_id, h.lender.clone(), TIMEOUT)
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotYetDue { .. }));

    // at exactly the due date
    h.ledger.set_time(loan.due_date);
    let err = h
        .ledger
        .liquidate_loan(&h.custody, loan_id, h.lender.clone(), TIMEOUT)
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotYetDue { .. }));

    // one second past
    h.ledger.advance_time(1);
    let resolved = h
        .ledger
        .liquidate_loan(&h.custody, loan_id, h.lender.clone(), TIMEOUT)
        .unwrap();
    assert_eq!(resolved.status, LoanStatus::Liquidated);

    // collateral to the lender, no stable value moved to them
    assert_eq!(h.custody.holder_of(TokenId(7)), Some(h.lender.clone()));
    assert_eq!(h.bank.total_paid_to(&h.lender), 0);
}

#[test]
fn liquidation_requires_the_recorded_lender() {
    let h = Harness::new();
    let loan_id = h.request(80_000).unwrap();
    let loan = h.fund(loan_id).unwrap();
    h.ledger.set_time(loan.due_date.plus_secs(1));

    let err = h
        .ledger
        .liquidate_loan(&h.custody, loan_id, h.borrower.clone(), TIMEOUT)
        .unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized { .. }));
}

#[test]
fn repayment_requires_the_recorded_borrower() {
    let h = Harness::new();
    let loan_id = h.request(80_000).unwrap();
    h.fund(loan_id).unwrap();

    let intruder = Address::new("mallory");
    h.bank
        .register_deposit("fake", intruder.clone(), Amount::new(80_986));
    let err = h
        .ledger
        .repay_loan(
            &h.custody,
            &h.bank,
            loan_id,
            intruder.clone(),
            PaymentProof::new("fake", intruder, Amount::new(80_986)),
            TIMEOUT,
        )
        .unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized { .. }));
}

#[test]
fn repayment_must_be_exact() {
    let h = Harness::new();
    let loan_id = h.request(80_000).unwrap();
    h.fund(loan_id).unwrap();

    let err = h.repay(loan_id, Amount::new(80_985)).unwrap_err();
    assert_eq!(
        err,
        LedgerError::Payment(PaymentError::Mismatch {
            expected: Amount::new(80_986),
            actual: Amount::new(80_985),
        })
    );
    // loan still active, lender unpaid, collateral still locked
    assert_eq!(
        h.ledger.active_loan(loan_id).unwrap().status,
        LoanStatus::Active
    );
    assert_eq!(h.bank.total_paid_to(&h.lender), 0);
    assert!(h.custody.is_locked(TokenId(7)));
}

#[test]
fn exactly_one_resolution() {
    let h = Harness::new();
    let loan_id = h.request(80_000).unwrap();
    let loan = h.fund(loan_id).unwrap();

    let resolved = h.repay(loan_id, Amount::new(80_986)).unwrap();
    assert_eq!(resolved.status, LoanStatus::Repaid);

    // a liquidation attempt after repayment is AlreadyResolved even when overdue
    h.ledger.set_time(loan.due_date.plus_secs(1));
    let err = h
        .ledger
        .liquidate_loan(&h.custody, loan_id, h.lender.clone(), TIMEOUT)
        .unwrap_err();
    assert_eq!(err, LedgerError::AlreadyResolved(loan_id));

    // and a second repayment is too
    let err = h.repay(loan_id, Amount::new(80_986)).unwrap_err();
    assert_eq!(err, LedgerError::AlreadyResolved(loan_id));
}

#[test]
fn funding_twice_is_rejected() {
    let h = Harness::new();
    let loan_id = h.request(80_000).unwrap();
    h.fund(loan_id).unwrap();

    let other = Address::new("second-desk");
    h.bank
        .register_deposit("late", other.clone(), Amount::new(80_000));
    let err = h
        .ledger
        .fund_loan(
            &h.bank,
            loan_id,
            other.clone(),
            PaymentProof::new("late", other, Amount::new(80_000)),
            TIMEOUT,
        )
        .unwrap_err();
    assert_eq!(err, LedgerError::AlreadyFunded(loan_id));
}

#[test]
fn unknown_loan_ids_are_not_found() {
    let h = Harness::new();
    let ghost = LoanId(999);

    assert_eq!(h.fund(ghost).unwrap_err(), LedgerError::NotFound(ghost));
    assert_eq!(
        h.repay(ghost, Amount::new(1)).unwrap_err(),
        LedgerError::NotFound(ghost)
    );
    assert_eq!(
        h.ledger
            .liquidate_loan(&h.custody, ghost, h.lender.clone(), TIMEOUT)
            .unwrap_err(),
        LedgerError::NotFound(ghost)
    );
}

#[test]
fn rail_outage_is_retryable_and_leaves_state_unchanged() {
    let h = Harness::new();
    let loan_id = h.request(80_000).unwrap();
    h.fund(loan_id).unwrap();

    h.bank.set_unavailable(true);
    let err = h.repay(loan_id, Amount::new(80_986)).unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(err.class(), ErrorClass::External);
    assert_eq!(
        h.ledger.active_loan(loan_id).unwrap().status,
        LoanStatus::Active
    );

    // identical retry after the outage clears
    h.bank.set_unavailable(false);
    let resolved = h.repay(loan_id, Amount::new(80_986)).unwrap();
    assert_eq!(resolved.status, LoanStatus::Repaid);
    assert_eq!(h.bank.total_paid_to(&h.lender), 80_986);
}

#[test]
fn indices_and_events_track_the_lifecycle() {
    let h = Harness::new();
    let loan_id = h.request(80_000).unwrap();
    h.fund(loan_id).unwrap();
    h.repay(loan_id, Amount::new(80_986)).unwrap();

    assert_eq!(h.ledger.borrower_loans(&h.borrower), vec![loan_id]);
    assert_eq!(h.ledger.lender_loans(&h.lender), vec![loan_id]);

    let events = h.ledger.recent_events(10);
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0].payload, EventPayload::LoanRequested(_)));
    assert!(matches!(events[1].payload, EventPayload::LoanFunded(_)));
    assert!(matches!(events[2].payload, EventPayload::LoanRepaid(_)));

    let stats = h.ledger.stats();
    assert_eq!(stats.total_issued, 1);
    assert_eq!(stats.total_volume, 80_000);
    assert_eq!(stats.next_id, LoanId(2));
}
