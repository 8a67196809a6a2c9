use super::common::*;
use crate::lending::domain::{LoanPeriod, LoanStatus};
use crate::lending::repository::{LoanRepository, NoticeKind};
use crate::lending::sweep::run_sweep;
use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

#[test]
fn sweep_recomputes_the_open_book_and_emits_notices() {
    let (service, repository, notices) = build_service();

    // One-week loans issued the same Monday: their due date is 2026-01-12.
    let overdue = service
        .originate(application(dec!(10000), LoanPeriod::OneWeek))
        .expect("overdue loan originates");
    let defaulting = service
        .originate(application(dec!(10000), LoanPeriod::OneWeek))
        .expect("defaulting loan originates");
    service
        .record_payment(&defaulting.id, dec!(1000), issued() + Duration::days(2))
        .expect("partial payment records");
    // A 4-week loan due 2026-02-02: the sweep on 2026-02-01 should remind.
    let due_soon = service
        .originate(application(dec!(15000), LoanPeriod::FourWeeks))
        .expect("due-soon loan originates");
    let settled = service
        .originate(application(dec!(5000), LoanPeriod::OneWeek))
        .expect("settled loan originates");
    service
        .record_payment(&settled.id, dec!(6000), issued() + Duration::days(1))
        .expect("payoff records");

    let today = day(2026, 2, 1); // due+20 for the 1-week loans
    let outcome = run_sweep(
        repository.as_ref(),
        notices.as_ref(),
        &engine_config(),
        today,
    )
    .expect("sweep runs");

    // The settled loan is out of the working set entirely.
    assert_eq!(outcome.processed, 3);
    assert_eq!(outcome.defaults, 2);
    assert_eq!(outcome.statuses_updated, 2);
    assert_eq!(outcome.penalties_applied, 2);
    assert_eq!(outcome.reminders, 1);
    assert_eq!(outcome.errors, 0);

    let swept_overdue = repository
        .fetch(&overdue.id)
        .expect("fetch succeeds")
        .expect("loan stored");
    assert_eq!(swept_overdue.status, LoanStatus::Defaulted);
    assert_eq!(swept_overdue.penalties, dec!(2520));

    let swept_defaulting = repository
        .fetch(&defaulting.id)
        .expect("fetch succeeds")
        .expect("loan stored");
    assert_eq!(swept_defaulting.status, LoanStatus::Defaulted);
    // 3% x (12 000 - 1 000) x 7 capped days.
    assert_eq!(swept_defaulting.penalties, dec!(2310));

    let swept_due_soon = repository
        .fetch(&due_soon.id)
        .expect("fetch succeeds")
        .expect("loan stored");
    assert_eq!(swept_due_soon.status, LoanStatus::Active);
    assert_eq!(swept_due_soon.penalties, Decimal::ZERO);

    let events = notices.events();
    assert_eq!(events.len(), 3);
    assert_eq!(
        events
            .iter()
            .filter(|notice| notice.kind == NoticeKind::DefaultNotice)
            .count(),
        2
    );
    let reminder = events
        .iter()
        .find(|notice| notice.kind == NoticeKind::DueDateReminder)
        .expect("reminder emitted");
    assert_eq!(reminder.loan_id, due_soon.id);
    assert_eq!(
        reminder.details.get("due_date").map(String::as_str),
        Some("2026-02-02")
    );
}

#[test]
fn sweep_is_idempotent_for_a_fixed_day() {
    let (service, repository, notices) = build_service();
    service
        .originate(application(dec!(10000), LoanPeriod::OneWeek))
        .expect("loan originates");

    let today = day(2026, 1, 15); // three days into grace
    let first = run_sweep(
        repository.as_ref(),
        notices.as_ref(),
        &engine_config(),
        today,
    )
    .expect("first sweep runs");
    assert_eq!(first.penalties_applied, 1);
    assert_eq!(first.statuses_updated, 1);

    let book_after_first = repository.loans().expect("book reads");

    let second = run_sweep(
        repository.as_ref(),
        notices.as_ref(),
        &engine_config(),
        today,
    )
    .expect("second sweep runs");
    assert_eq!(second.penalties_applied, 0);
    assert_eq!(second.statuses_updated, 0);
    assert_eq!(second.defaults, 0);

    assert_eq!(repository.loans().expect("book reads"), book_after_first);
}

#[test]
fn sweep_skips_reminders_for_settled_loans() {
    let (service, repository, notices) = build_service();
    let loan = service
        .originate(application(dec!(10000), LoanPeriod::OneWeek))
        .expect("loan originates");
    service
        .record_payment(&loan.id, dec!(12000), issued() + Duration::days(2))
        .expect("payoff records");

    let day_before_due = loan.schedule.due_date - Duration::days(1);
    let outcome = run_sweep(
        repository.as_ref(),
        notices.as_ref(),
        &engine_config(),
        day_before_due,
    )
    .expect("sweep runs");

    assert_eq!(outcome.reminders, 0);
    assert!(notices.events().is_empty());
}

#[test]
fn sweep_continues_past_a_failing_loan() {
    let (service, repository, _) = build_service();
    let poisoned = service
        .originate(application(dec!(10000), LoanPeriod::OneWeek))
        .expect("poisoned loan originates");
    let healthy = service
        .originate(application(dec!(10000), LoanPeriod::OneWeek))
        .expect("healthy loan originates");

    let flaky = FlakyRepository {
        inner: MemoryRepository {
            records: repository.records.clone(),
        },
        poison: poisoned.id.clone(),
    };
    let notices = Arc::new(MemoryNotices::default());

    let today = day(2026, 1, 15);
    let outcome = run_sweep(&flaky, notices.as_ref(), &engine_config(), today)
        .expect("sweep runs");

    assert_eq!(outcome.errors, 1);
    assert_eq!(outcome.penalties_applied, 1);

    let untouched = repository
        .fetch(&poisoned.id)
        .expect("fetch succeeds")
        .expect("loan stored");
    assert_eq!(untouched.status, LoanStatus::Active);

    let updated = repository
        .fetch(&healthy.id)
        .expect("fetch succeeds")
        .expect("loan stored");
    assert_eq!(updated.status, LoanStatus::PastDue);
    assert_eq!(updated.penalties, dec!(1080));
}

#[test]
fn paid_cache_removes_a_loan_from_later_sweeps() {
    let (service, repository, notices) = build_service();
    let loan = service
        .originate(application(dec!(10000), LoanPeriod::OneWeek))
        .expect("loan originates");
    service
        .record_payment(&loan.id, dec!(12000), issued() + Duration::days(1))
        .expect("payoff records");

    let outcome = run_sweep(
        repository.as_ref(),
        notices.as_ref(),
        &engine_config(),
        day(2026, 3, 1),
    )
    .expect("sweep runs");

    assert_eq!(outcome.processed, 0);
}
