use crate::infra::{InMemoryLoanRepository, InMemoryNoticePublisher};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use loandesk::error::AppError;
use loandesk::lending::{
    BorrowerRef, EngineConfig, LoanApplication, LoanPeriod, LoanService, LoanStatementView,
};
use rust_decimal_macros::dec;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Issue date for the demo book (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) issued: Option<NaiveDate>,
    /// Skip the default-and-settlement portion of the demo.
    #[arg(long)]
    pub(crate) skip_default: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        issued,
        skip_default,
    } = args;

    let issued = issued.unwrap_or_else(|| Local::now().date_naive());
    let config = EngineConfig::default();

    println!("Loan back office demo");
    println!(
        "Book issued {issued} | grace window {} days | daily penalty {}%",
        config.grace_period_days, config.daily_penalty_rate
    );

    let repository = Arc::new(InMemoryLoanRepository::default());
    let notices = Arc::new(InMemoryNoticePublisher::default());
    let service = LoanService::new(repository, notices.clone(), config);

    let slipping = service.originate(LoanApplication {
        borrower: BorrowerRef("BRW-014".to_string()),
        principal: dec!(10000),
        period: LoanPeriod::OneWeek,
        date_issued: issued,
        negotiable: false,
        custom_rate: None,
    })?;
    let punctual = service.originate(LoanApplication {
        borrower: BorrowerRef("BRW-015".to_string()),
        principal: dec!(8000),
        period: LoanPeriod::TwoWeeks,
        date_issued: issued,
        negotiable: false,
        custom_rate: None,
    })?;
    let negotiated = service.originate(LoanApplication {
        borrower: BorrowerRef("BRW-016".to_string()),
        principal: dec!(60000),
        period: LoanPeriod::FourWeeks,
        date_issued: issued,
        negotiable: true,
        custom_rate: Some(dec!(18)),
    })?;

    println!("\nOriginated loans");
    for view in [
        service.statement(&slipping.id, issued)?,
        service.statement(&punctual.id, issued)?,
        service.statement(&negotiated.id, issued)?,
    ] {
        print_statement(&view);
    }

    let due = slipping.schedule.due_date;

    println!("\nSweep the day before the first due date ({})", due - Duration::days(1));
    let outcome = service.run_sweep(due - Duration::days(1))?;
    println!(
        "- processed {} | reminders {} | statuses updated {}",
        outcome.processed, outcome.reminders, outcome.statuses_updated
    );

    println!("\nPunctual borrower settles early");
    let receipt = service.record_payment(&punctual.id, dec!(10240), issued + Duration::days(6))?;
    println!(
        "- paid {} | remaining {} | status {}",
        receipt.amount_paid, receipt.remaining_balance, receipt.loan.status
    );

    println!("\nThree days into the grace window ({})", due + Duration::days(3));
    service.run_sweep(due + Duration::days(3))?;
    print_statement(&service.statement(&slipping.id, due + Duration::days(3))?);

    println!("\nNegotiated loan is re-rated to 25%");
    let view = service.renegotiate_rate(&negotiated.id, dec!(25), due + Duration::days(3))?;
    print_statement(&view);

    if !skip_default {
        let after_grace = slipping.schedule.grace_period_end + Duration::days(1);
        println!("\nSweep past the grace window ({after_grace})");
        let outcome = service.run_sweep(after_grace)?;
        println!(
            "- defaults {} | penalties applied {}",
            outcome.defaults, outcome.penalties_applied
        );
        print_statement(&service.statement(&slipping.id, after_grace)?);

        println!("\nDefaulted borrower settles in full");
        let statement = service.statement(&slipping.id, after_grace + Duration::days(2))?;
        let receipt = service.record_payment(
            &slipping.id,
            statement.remaining_balance,
            after_grace + Duration::days(2),
        )?;
        println!(
            "- paid {} | remaining {} | status {}",
            receipt.amount_paid, receipt.remaining_balance, receipt.loan.status
        );
    }

    let as_of = due + Duration::days(14);
    let summary = service.portfolio(as_of)?;
    println!("\nPortfolio as of {as_of}");
    println!(
        "- {} loans | active {} | due {} | past due {} | defaulted {} | paid {}",
        summary.total_loans,
        summary.active,
        summary.due,
        summary.past_due,
        summary.defaulted,
        summary.paid
    );
    println!(
        "- principal issued {} | repaid {} | outstanding {} | penalties {}",
        summary.principal_issued,
        summary.total_repaid,
        summary.total_outstanding,
        summary.total_penalties
    );

    let events = notices.events();
    if events.is_empty() {
        println!("\nNotices: none dispatched");
    } else {
        println!("\nNotices");
        for notice in events {
            println!(
                "- {} -> {} ({})",
                notice.kind.label(),
                notice.loan_id.0,
                notice.borrower.0
            );
        }
    }

    Ok(())
}

fn print_statement(view: &LoanStatementView) {
    println!(
        "- {} [{}] principal {} at {}% | due {} | repaid {} | penalty {} | remaining {}",
        view.loan_id.0,
        view.status,
        view.principal,
        view.interest_rate,
        view.due_date,
        view.amount_repaid,
        view.effective_penalty,
        view.remaining_balance
    );
}
