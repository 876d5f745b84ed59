// 6.0: the loan ledger. single source of truth for the request -> funding ->
// repayment/liquidation lifecycle. deterministic, event-emitting, no external
// I/O of its own; settlement rails are injected at the command surface.

mod config;
mod core;
mod ops;
mod queries;
mod results;

pub use config::LedgerConfig;
pub use core::LoanLedger;
pub use ops::{FundingPlan, LiquidationPlan, LoanRequestParams, RepaymentPlan, RequestPlan};
pub use queries::LedgerStats;
pub use results::{ErrorClass, LedgerError};
