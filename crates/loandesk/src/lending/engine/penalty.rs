use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::EngineConfig;
use crate::lending::domain::Loan;

/// Whole calendar days past the due date, floored at zero.
pub fn days_overdue(loan: &Loan, today: NaiveDate) -> i64 {
    (today - loan.schedule.due_date).num_days().max(0)
}

/// Penalty accrued to date, recomputed from scratch on every call.
///
/// No penalty accrues on or before the due date. Past it, the daily rate is
/// charged on the outstanding balance for each overdue day, capped at the
/// grace-window length, so the figure stops growing once the loan defaults.
/// A fully repaid loan has zero outstanding balance and therefore accrues
/// nothing, whatever its stored status says.
///
/// Recomputing rather than accumulating makes the calculator idempotent: the
/// same `today` always yields the same figure, and a later `today` (with no
/// intervening payment) never yields a smaller one.
pub fn effective_penalty(loan: &Loan, today: NaiveDate, config: &EngineConfig) -> Decimal {
    if today <= loan.schedule.due_date {
        return Decimal::ZERO;
    }

    let chargeable_days = days_overdue(loan, today).min(config.grace_period_days);
    let outstanding = loan.outstanding_balance();

    config.daily_penalty_rate / dec!(100) * outstanding * Decimal::from(chargeable_days)
}
