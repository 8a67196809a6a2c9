use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::{Loan, LoanStatus};
use super::engine::{self, EngineConfig};

/// Aggregate book figures as of a given day, derived through the engine so
/// the report can never disagree with the resolver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub as_of: NaiveDate,
    pub total_loans: u32,
    pub active: u32,
    pub due: u32,
    pub past_due: u32,
    pub defaulted: u32,
    pub paid: u32,
    pub principal_issued: Decimal,
    pub total_repaid: Decimal,
    pub total_outstanding: Decimal,
    pub total_penalties: Decimal,
}

pub fn portfolio_summary(loans: &[Loan], as_of: NaiveDate, config: &EngineConfig) -> PortfolioSummary {
    let mut summary = PortfolioSummary {
        as_of,
        total_loans: loans.len() as u32,
        active: 0,
        due: 0,
        past_due: 0,
        defaulted: 0,
        paid: 0,
        principal_issued: Decimal::ZERO,
        total_repaid: Decimal::ZERO,
        total_outstanding: Decimal::ZERO,
        total_penalties: Decimal::ZERO,
    };

    for loan in loans {
        let assessment = engine::assess(loan, as_of, config);
        match assessment.status {
            LoanStatus::Active => summary.active += 1,
            LoanStatus::Due => summary.due += 1,
            LoanStatus::PastDue => summary.past_due += 1,
            LoanStatus::Defaulted => summary.defaulted += 1,
            LoanStatus::Paid => summary.paid += 1,
        }
        summary.principal_issued += loan.principal;
        summary.total_repaid += loan.amount_repaid;
        summary.total_outstanding += assessment.remaining_balance;
        summary.total_penalties += assessment.effective_penalty;
    }

    summary
}
