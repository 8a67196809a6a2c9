use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{Loan, LoanStatus};
use super::engine::{self, EngineConfig};
use super::repository::{LoanNotice, LoanRepository, NoticeKind, NoticePublisher, RepositoryError};

/// Counters describing one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepOutcome {
    pub processed: u32,
    pub statuses_updated: u32,
    pub penalties_applied: u32,
    pub defaults: u32,
    pub reminders: u32,
    pub errors: u32,
}

/// Recompute and persist `(status, penalties)` for every open loan as of
/// `today`, emitting due-date reminders and default notices along the way.
///
/// Writes happen only when the recomputed pair differs from the stored one,
/// so a second pass at the same `today` persists nothing. The computed values
/// are a pure function of `today` and stable inputs, so an overlapping manual
/// trigger converges to the same state without locking.
///
/// A failure on one loan is logged and counted; the rest of the batch still
/// runs.
pub fn run_sweep<R, N>(
    repository: &R,
    notices: &N,
    config: &EngineConfig,
    today: NaiveDate,
) -> Result<SweepOutcome, RepositoryError>
where
    R: LoanRepository + ?Sized,
    N: NoticePublisher + ?Sized,
{
    let loans = repository.open_loans()?;
    let mut outcome = SweepOutcome::default();

    for loan in loans {
        outcome.processed += 1;

        let refreshed = engine::refresh(&loan, today, config);
        let penalty_changed = refreshed.penalties != loan.penalties;
        let status_changed = refreshed.status != loan.status;
        let newly_defaulted = status_changed && refreshed.status == LoanStatus::Defaulted;

        if penalty_changed || status_changed {
            if let Err(err) = repository.update(refreshed.clone()) {
                warn!(loan_id = %loan.id.0, %err, "sweep failed to persist loan");
                outcome.errors += 1;
                continue;
            }
            if penalty_changed {
                outcome.penalties_applied += 1;
            }
            if status_changed {
                outcome.statuses_updated += 1;
            }
        }

        if newly_defaulted {
            outcome.defaults += 1;
            if let Err(err) = notices.publish(default_notice(&refreshed)) {
                warn!(loan_id = %refreshed.id.0, %err, "sweep failed to publish default notice");
                outcome.errors += 1;
            }
        }

        if reminder_due(&refreshed, today) {
            outcome.reminders += 1;
            if let Err(err) = notices.publish(reminder_notice(&refreshed)) {
                warn!(loan_id = %refreshed.id.0, %err, "sweep failed to publish reminder");
                outcome.errors += 1;
            }
        }
    }

    info!(
        processed = outcome.processed,
        statuses_updated = outcome.statuses_updated,
        penalties_applied = outcome.penalties_applied,
        defaults = outcome.defaults,
        reminders = outcome.reminders,
        errors = outcome.errors,
        "sweep complete"
    );

    Ok(outcome)
}

/// A reminder goes out the day before the due date while a balance is still
/// outstanding.
fn reminder_due(loan: &Loan, today: NaiveDate) -> bool {
    loan.status != LoanStatus::Paid
        && loan.schedule.due_date == today + Duration::days(1)
        && loan.outstanding_balance() > Decimal::ZERO
}

fn reminder_notice(loan: &Loan) -> LoanNotice {
    let mut details = BTreeMap::new();
    details.insert("due_date".to_string(), loan.schedule.due_date.to_string());
    details.insert(
        "outstanding_balance".to_string(),
        loan.outstanding_balance().to_string(),
    );
    LoanNotice {
        kind: NoticeKind::DueDateReminder,
        loan_id: loan.id.clone(),
        borrower: loan.borrower.clone(),
        details,
    }
}

fn default_notice(loan: &Loan) -> LoanNotice {
    let mut details = BTreeMap::new();
    details.insert(
        "total_due".to_string(),
        (loan.total_amount + loan.penalties).to_string(),
    );
    details.insert("penalties".to_string(), loan.penalties.to_string());
    details.insert(
        "grace_period_end".to_string(),
        loan.schedule.grace_period_end.to_string(),
    );
    LoanNotice {
        kind: NoticeKind::DefaultNotice,
        loan_id: loan.id.clone(),
        borrower: loan.borrower.clone(),
        details,
    }
}
