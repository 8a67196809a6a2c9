use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::lending::domain::{Loan, LoanStatus};

/// Resolve a loan's lifecycle state as of `today`. First match wins:
///
/// 1. repaid covers total plus penalties -> `Paid`
/// 2. past the grace window -> `Defaulted`
/// 3. past the due date -> `PastDue`
/// 4. on the due date -> `Due`
/// 5. otherwise -> `Active`
///
/// All comparisons are calendar-day comparisons: a loan is `Due` for the
/// whole of its due day and `Defaulted` from the day after
/// `grace_period_end`. `Paid` is checked first so a defaulted loan that is
/// later repaid in full (including the capped penalty) resolves to `Paid`;
/// there is no other exit from `Defaulted`.
pub fn resolve_status(loan: &Loan, effective_penalty: Decimal, today: NaiveDate) -> LoanStatus {
    if loan.amount_repaid >= loan.total_amount + effective_penalty {
        return LoanStatus::Paid;
    }
    if today > loan.schedule.grace_period_end {
        return LoanStatus::Defaulted;
    }
    if today > loan.schedule.due_date {
        return LoanStatus::PastDue;
    }
    if today == loan.schedule.due_date {
        return LoanStatus::Due;
    }
    LoanStatus::Active
}
