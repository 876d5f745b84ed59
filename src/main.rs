//! Collateralized Lending Engine Simulation.
//!
//! Walks the full loan lifecycle against the in-memory settlement rails:
//! request, funding, repayment, liquidation, rejected requests, and a
//! multi-threaded funding race.

use lading_core::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

fn main() {
    println!("Collateralized Lending Engine Simulation");
    println!("Tokenized Bills of Lading as Collateral, Full Lifecycle\n");

    scenario_1_happy_path();
    scenario_2_pricing_tiers();
    scenario_3_liquidation();
    scenario_4_rejections();
    scenario_5_funding_race();

    println!("\nAll simulations completed successfully.");
}

/// Request, fund, repay.
fn scenario_1_happy_path() {
    println!("Scenario 1: Request / Fund / Repay\n");

    let ledger = SharedLedger::new(LedgerConfig::default());
    let custody = MemoryCustody::new();
    let bank = MemoryBank::new();

    let borrower = Address::new("importer-co");
    let lender = Address::new("liquidity-desk");
    custody.register(TokenId(7001), borrower.clone());
    ledger.set_time(Timestamp::from_secs(1_700_000_000));

    let loan_id = ledger
        .request_loan(
            &custody,
            LoanRequestParams {
                borrower: borrower.clone(),
                collateral_token: TokenId(7001),
                declared_value: Amount::new(100_000),
                requested_amount: Amount::new(80_000),
                duration_days: 90,
                risk_score: 250,
            },
            TIMEOUT,
        )
        .unwrap();

    let request = ledger.loan_request(loan_id).unwrap();
    println!(
        "  {} requested {} against {} (declared value {})",
        borrower, request.principal, request.collateral_token, request.declared_value
    );
    println!(
        "  priced at {} ({}% annual)",
        request.interest_rate,
        request.interest_rate.as_fraction() * rust_decimal_macros::dec!(100)
    );

    bank.register_deposit("fund-1", lender.clone(), Amount::new(80_000));
    let loan = ledger
        .fund_loan(
            &bank,
            loan_id,
            lender.clone(),
            PaymentProof::new("fund-1", lender.clone(), Amount::new(80_000)),
            TIMEOUT,
        )
        .unwrap();
    println!(
        "  {} funded; borrower owes {} by {}",
        lender, loan.repayment_amount, loan.due_date
    );

    ledger.advance_time(30 * 86_400);
    bank.register_deposit("repay-1", borrower.clone(), loan.repayment_amount);
    let resolved = ledger
        .repay_loan(
            &custody,
            &bank,
            loan_id,
            borrower.clone(),
            PaymentProof::new("repay-1", borrower.clone(), loan.repayment_amount),
            TIMEOUT,
        )
        .unwrap();
    println!(
        "  repaid early, status {:?}; collateral back with {}\n",
        resolved.status,
        custody.holder_of(TokenId(7001)).unwrap()
    );
}

/// The risk curve: advance rate down, cost of capital up.
fn scenario_2_pricing_tiers() {
    println!("Scenario 2: Risk Pricing Tiers\n");
    println!("  score  ltv     rate");
    for score in [100u32, 300, 301, 500, 650, 900] {
        let terms = price_loan(score);
        println!(
            "  {:>5}  {:>6}  {:>7}",
            score, terms.ltv, terms.interest_rate
        );
    }
    println!();
}

/// Overdue loan, lender claims the collateral.
fn scenario_3_liquidation() {
    println!("Scenario 3: Liquidation After Maturity\n");

    let ledger = SharedLedger::new(LedgerConfig::default());
    let custody = MemoryCustody::new();
    let bank = MemoryBank::new();

    let borrower = Address::new("exporter-ltd");
    let lender = Address::new("credit-fund");
    custody.register(TokenId(7002), borrower.clone());

    let loan_id = ledger
        .request_loan(
            &custody,
            LoanRequestParams {
                borrower: borrower.clone(),
                collateral_token: TokenId(7002),
                declared_value: Amount::new(50_000),
                requested_amount: Amount::new(30_000),
                duration_days: 60,
                risk_score: 620,
            },
            TIMEOUT,
        )
        .unwrap();

    bank.register_deposit("fund-2", lender.clone(), Amount::new(30_000));
    let loan = ledger
        .fund_loan(
            &bank,
            loan_id,
            lender.clone(),
            PaymentProof::new("fund-2", lender.clone(), Amount::new(30_000)),
            TIMEOUT,
        )
        .unwrap();

    // at the due date: still not liquidatable
    ledger.set_time(loan.due_date);
    let early = ledger.liquidate_loan(&custody, loan_id, lender.clone(), TIMEOUT);
    println!("  at due date: {}", early.unwrap_err());

    ledger.advance_time(1);
    let resolved = ledger
        .liquidate_loan(&custody, loan_id, lender.clone(), TIMEOUT)
        .unwrap();
    println!(
        "  one second later: status {:?}, collateral now held by {}",
        resolved.status,
        custody.holder_of(TokenId(7002)).unwrap()
    );
    println!(
        "  stable value moved to borrower only: lender paid {}, received {}\n",
        bank.total_paid_to(&borrower),
        bank.total_paid_to(&lender)
    );
}

/// Validation failures leave no trace.
fn scenario_4_rejections() {
    println!("Scenario 4: Rejected Requests\n");

    let ledger = SharedLedger::new(LedgerConfig::default());
    let custody = MemoryCustody::new();
    let borrower = Address::new("importer-co");
    custody.register(TokenId(7003), borrower.clone());

    let over_ltv = ledger.request_loan(
        &custody,
        LoanRequestParams {
            borrower: borrower.clone(),
            collateral_token: TokenId(7003),
            declared_value: Amount::new(100_000),
            requested_amount: Amount::new(80_001),
            duration_days: 90,
            risk_score: 250,
        },
        TIMEOUT,
    );
    println!("  over LTV cap: {}", over_ltv.unwrap_err());

    let too_long = ledger.request_loan(
        &custody,
        LoanRequestParams {
            borrower: borrower.clone(),
            collateral_token: TokenId(7003),
            declared_value: Amount::new(100_000),
            requested_amount: Amount::new(10_000),
            duration_days: 400,
            risk_score: 250,
        },
        TIMEOUT,
    );
    println!("  over max duration: {}", too_long.unwrap_err());

    let stats = ledger.stats();
    println!(
        "  ledger untouched: {} issued, volume {}\n",
        stats.total_issued, stats.total_volume
    );
}

/// Two lenders race to fund the same request.
fn scenario_5_funding_race() {
    println!("Scenario 5: Concurrent Funding Race\n");

    let ledger = Arc::new(SharedLedger::new(LedgerConfig::default()));
    let custody = Arc::new(MemoryCustody::new());
    let bank = Arc::new(MemoryBank::new());

    let borrower = Address::new("importer-co");
    custody.register(TokenId(7004), borrower.clone());

    let loan_id = ledger
        .request_loan(
            &*custody,
            LoanRequestParams {
                borrower: borrower.clone(),
                collateral_token: TokenId(7004),
                declared_value: Amount::new(100_000),
                requested_amount: Amount::new(80_000),
                duration_days: 90,
                risk_score: 250,
            },
            TIMEOUT,
        )
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let ledger = Arc::clone(&ledger);
            let bank = Arc::clone(&bank);
            thread::spawn(move || {
                let lender = Address::new(format!("lender-{i}"));
                let reference = format!("race-{i}");
                bank.register_deposit(reference.as_str(), lender.clone(), Amount::new(80_000));
                let proof = PaymentProof::new(reference.as_str(), lender.clone(), Amount::new(80_000));
                ledger.fund_loan(&*bank, loan_id, lender, proof, TIMEOUT)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    println!("  4 lenders raced, {} funded the loan", winners);
    for result in &results {
        match result {
            Ok(loan) => println!("  winner: {}", loan.lender),
            Err(e) => println!("  loser:  {}", e),
        }
    }
    println!(
        "  borrower disbursed exactly once: {}",
        bank.total_paid_to(&borrower)
    );
}
