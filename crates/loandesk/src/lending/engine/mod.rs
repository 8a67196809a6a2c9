//! The loan lifecycle engine: a pure function of a loan record and a
//! calendar date.
//!
//! Every caller that needs a loan's state goes through [`assess`]; the cached
//! `(status, penalties)` columns on the record exist only so the book can be
//! queried without re-deriving, and are refreshed by [`refresh`] and
//! [`apply_payment`].

mod penalty;
mod status;

pub use penalty::{days_overdue, effective_penalty};
pub use status::resolve_status;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::domain::{Loan, LoanStatus};

/// Engine dials: the grace window length and the daily penalty rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Penalty-accruing days after the due date; the loan defaults the day
    /// after this window closes.
    pub grace_period_days: i64,
    /// Percent of the outstanding balance charged per overdue day.
    pub daily_penalty_rate: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grace_period_days: 7,
            daily_penalty_rate: dec!(3),
        }
    }
}

/// Snapshot of a loan's effective state as of a given day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanAssessment {
    pub status: LoanStatus,
    pub effective_penalty: Decimal,
    pub outstanding_balance: Decimal,
    pub total_due: Decimal,
    pub remaining_balance: Decimal,
    pub days_overdue: i64,
}

/// Derive a loan's effective state from dates and amounts. Pure; same inputs
/// and the same `today` always produce the same snapshot.
pub fn assess(loan: &Loan, today: NaiveDate, config: &EngineConfig) -> LoanAssessment {
    let effective_penalty = effective_penalty(loan, today, config);
    let status = resolve_status(loan, effective_penalty, today);
    let outstanding_balance = loan.outstanding_balance();
    let total_due = loan.total_amount + effective_penalty;

    LoanAssessment {
        status,
        effective_penalty,
        outstanding_balance,
        remaining_balance: (total_due - loan.amount_repaid).max(Decimal::ZERO),
        total_due,
        days_overdue: days_overdue(loan, today),
    }
}

/// Recompute and store the cached `(status, penalties)` pair as of `today`.
pub fn refresh(loan: &Loan, today: NaiveDate, config: &EngineConfig) -> Loan {
    let assessment = assess(loan, today, config);
    let mut updated = loan.clone();
    updated.penalties = assessment.effective_penalty;
    updated.status = assessment.status;
    updated
}

/// Errors raised by the payment applicator.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment amount must be positive (got {0})")]
    NonPositiveAmount(Decimal),
}

/// Apply a payment and refresh the cached state as of the payment day.
///
/// Overpayment is accepted; it simply pushes `amount_repaid` past the due
/// total, which resolves to `Paid`.
pub fn apply_payment(
    loan: &Loan,
    amount: Decimal,
    paid_on: NaiveDate,
    config: &EngineConfig,
) -> Result<Loan, PaymentError> {
    if amount <= Decimal::ZERO {
        return Err(PaymentError::NonPositiveAmount(amount));
    }

    let mut updated = loan.clone();
    updated.amount_repaid += amount;
    updated.last_payment_date = Some(paid_on);
    Ok(refresh(&updated, paid_on, config))
}
