//! The accounting identity `Assets = Liabilities + Equity` and its tolerance.
//!
//! Extracted statements are rounded and occasionally restated, so the identity
//! is checked within `max(1.0, 1% of assets)` rather than exactly.

use crate::error::{ReportError, Result};
use chrono::NaiveDate;

/// Absolute floor of the identity tolerance, in reporting units.
pub const MIN_IDENTITY_TOLERANCE: f64 = 1.0;

/// Fraction of total assets accepted as rounding slack.
pub const RELATIVE_IDENTITY_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerificationResult {
    pub assets: f64,
    pub liabilities: f64,
    pub equity: f64,
    pub difference: f64,
    pub tolerance: f64,
}

impl VerificationResult {
    pub fn is_balanced(&self) -> bool {
        self.difference <= self.tolerance
    }
}

pub fn identity_tolerance(assets: f64) -> f64 {
    (RELATIVE_IDENTITY_TOLERANCE * assets).max(MIN_IDENTITY_TOLERANCE)
}

/// Measures how far a balance sheet is from `assets = liabilities + equity`.
pub fn measure_accounting_equation(assets: f64, liabilities: f64, equity: f64) -> VerificationResult {
    VerificationResult {
        assets,
        liabilities,
        equity,
        difference: (assets - (liabilities + equity)).abs(),
        tolerance: identity_tolerance(assets),
    }
}

/// Fails with [`ReportError::AccountingIdentityViolation`] when the gap exceeds the tolerance.
pub fn verify_accounting_equation(
    date: NaiveDate,
    assets: f64,
    liabilities: f64,
    equity: f64,
) -> Result<VerificationResult> {
    let verification = measure_accounting_equation(assets, liabilities, equity);

    if !verification.is_balanced() {
        return Err(ReportError::AccountingIdentityViolation {
            date,
            assets,
            liabilities,
            equity,
            difference: verification.difference,
            tolerance: verification.tolerance,
        });
    }

    Ok(verification)
}
