// lading-core: collateralized lending engine for tokenized trade documents.
// custody-first architecture: collateral control and conservation of funds
// take priority. all ledger computation is deterministic with no external
// I/O; settlement rails are injected behind adapter traits.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: LoanId, Address, TokenId, Amount, Bps, Timestamp
//   2.x  pricing.rs: risk-tiered LTV and interest pricing
//   3.x  loan.rs: LoanRequest, ActiveLoan, repayment and maturity math
//   4.x  custody.rs: collateral lock/release rail (in-memory impl included)
//   5.x  transfer.rs: stable-value verify/forward rail (in-memory impl included)
//   6.x  ledger/: the state machine: prepare/commit ops, queries, errors
//   7.x  events.rs: state transition events for audit
//   8.x  shared.rs: concurrent command surface: per-loan locks, timeouts

// core lending modules
pub mod ledger;
pub mod loan;
pub mod pricing;
pub mod types;

// integration modules
pub mod custody;
pub mod events;
pub mod shared;
pub mod transfer;

// re exports for convenience
pub use events::*;
pub use ledger::*;
pub use loan::*;
pub use pricing::*;
pub use types::*;
pub use custody::{CollateralCustody, CustodyError, MemoryCustody};
pub use shared::SharedLedger;
pub use transfer::{MemoryBank, PaymentError, PaymentProof, StableTransfer, TransferStep};
