use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::domain::{BorrowerRef, Loan, LoanDataError, LoanId, LoanPeriod, LoanSchedule, LoanStatus};

/// Loans above this principal may carry negotiated terms.
pub const NEGOTIABLE_THRESHOLD: Decimal = dec!(50000);
/// Minimum principal for the 4-week period.
pub const MIN_PRINCIPAL_FOUR_WEEKS: Decimal = dec!(12000);

/// Underwriting violations raised before a loan enters the book.
#[derive(Debug, thiserror::Error)]
pub enum TermsError {
    #[error("principal must be positive (got {0})")]
    PrincipalNotPositive(Decimal),
    #[error("4-week loans require principal of at least {minimum} (got {found})")]
    BelowFourWeekMinimum { minimum: Decimal, found: Decimal },
    #[error("only loans above {threshold} may carry negotiable terms")]
    BelowNegotiableThreshold { threshold: Decimal },
    #[error("custom rates require negotiable terms")]
    CustomRateRequiresNegotiable,
    #[error("interest rate must be within (0, 100] (got {0})")]
    RateOutOfRange(Decimal),
    #[error("loan terms are not negotiable")]
    NotNegotiable,
    #[error(transparent)]
    Data(#[from] LoanDataError),
}

/// Inbound origination request, validated by [`underwrite`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub borrower: BorrowerRef,
    pub principal: Decimal,
    pub period: LoanPeriod,
    pub date_issued: NaiveDate,
    #[serde(default)]
    pub negotiable: bool,
    /// Admin-set rate, honored only on negotiable loans.
    #[serde(default)]
    pub custom_rate: Option<Decimal>,
}

/// Derive the calendar anchors for a loan issued on `date_issued`.
pub fn repayment_schedule(
    date_issued: NaiveDate,
    period: LoanPeriod,
    grace_period_days: i64,
) -> LoanSchedule {
    let due_date = date_issued + Duration::days(period.weeks() * 7);
    LoanSchedule {
        date_issued,
        due_date,
        grace_period_end: due_date + Duration::days(grace_period_days),
    }
}

/// Resolve the contract rate for an application: the period tier, unless the
/// loan is negotiable and carries an admin-set rate.
pub fn contract_rate(application: &LoanApplication) -> Result<Decimal, TermsError> {
    match application.custom_rate {
        Some(_) if !application.negotiable => Err(TermsError::CustomRateRequiresNegotiable),
        Some(rate) if rate <= Decimal::ZERO || rate > dec!(100) => {
            Err(TermsError::RateOutOfRange(rate))
        }
        Some(rate) => Ok(rate),
        None => Ok(application.period.standard_rate()),
    }
}

/// Validate an application against the origination rules and produce the loan
/// record that enters the book.
pub fn underwrite(
    application: &LoanApplication,
    grace_period_days: i64,
    id: LoanId,
) -> Result<Loan, TermsError> {
    if application.principal <= Decimal::ZERO {
        return Err(TermsError::PrincipalNotPositive(application.principal));
    }
    if application.period == LoanPeriod::FourWeeks
        && application.principal < MIN_PRINCIPAL_FOUR_WEEKS
    {
        return Err(TermsError::BelowFourWeekMinimum {
            minimum: MIN_PRINCIPAL_FOUR_WEEKS,
            found: application.principal,
        });
    }
    if application.negotiable && application.principal <= NEGOTIABLE_THRESHOLD {
        return Err(TermsError::BelowNegotiableThreshold {
            threshold: NEGOTIABLE_THRESHOLD,
        });
    }

    let rate = contract_rate(application)?;
    let total_amount = total_with_rate(application.principal, rate);
    let schedule = repayment_schedule(application.date_issued, application.period, grace_period_days);

    let loan = Loan::new(
        id,
        application.borrower.clone(),
        application.principal,
        rate,
        application.negotiable,
        application.period,
        total_amount,
        Decimal::ZERO,
        Decimal::ZERO,
        schedule,
        LoanStatus::Active,
        None,
    )?;

    Ok(loan)
}

/// Principal plus simple interest at `rate` percent.
pub fn total_with_rate(principal: Decimal, rate: Decimal) -> Decimal {
    principal + principal * rate / dec!(100)
}

/// Replace the rate on a negotiable loan, recomputing the contract total.
/// Repayments already made are preserved.
pub fn renegotiate_rate(loan: &Loan, rate: Decimal) -> Result<Loan, TermsError> {
    if !loan.negotiable {
        return Err(TermsError::NotNegotiable);
    }
    if rate <= Decimal::ZERO || rate > dec!(100) {
        return Err(TermsError::RateOutOfRange(rate));
    }

    let mut updated = loan.clone();
    updated.interest_rate = rate;
    updated.total_amount = total_with_rate(loan.principal, rate);
    Ok(updated)
}
