//! Risk-tiered loan pricing.
//!
//! A single monotone risk curve drives both pricing dimensions: safer
//! collateral gets a higher advance rate and a lower cost of capital.
//! Pure functions over typed inputs, no state, no I/O.

use crate::types::{Amount, Bps, BPS_DENOMINATOR};
use serde::{Deserialize, Serialize};

/// Terms derived from a risk score: maximum advance rate and annual interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Maximum loan-to-value ratio.
    pub ltv: Bps,
    /// Annual simple-interest rate.
    pub interest_rate: Bps,
}

/// Map a risk score to loan terms. Total over the full u32 domain;
/// tier bounds are inclusive.
pub fn price_loan(risk_score: u32) -> LoanTerms {
    let (ltv, rate) = match risk_score {
        0..=300 => (8000, 500),
        301..=500 => (7000, 800),
        501..=700 => (6000, 1200),
        _ => (4000, 1800),
    };
    LoanTerms {
        ltv: Bps::new(ltv),
        interest_rate: Bps::new(rate),
    }
}

/// Maximum borrowable amount against a declared collateral value,
/// floor(value * ltv / 10000).
pub fn max_loan_amount(declared_value: Amount, terms: &LoanTerms) -> Amount {
    declared_value
        .mul_div_floor(terms.ltv.value() as u64, BPS_DENOMINATOR)
        .unwrap_or(Amount::ZERO)
}
