use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::{Loan, LoanId};
use super::engine::{self, EngineConfig, PaymentError};
use super::report::{portfolio_summary, PortfolioSummary};
use super::repository::{
    LoanRepository, LoanStatementView, NoticeError, NoticePublisher, RepositoryError,
};
use super::sweep::{self, SweepOutcome};
use super::terms::{self, LoanApplication, TermsError};

/// Service composing the underwriting rules, the lifecycle engine, and the
/// storage/notification boundaries. HTTP handlers, reports, and the sweep job
/// all read loan state through here so status is derived in exactly one
/// place.
pub struct LoanService<R, N> {
    repository: Arc<R>,
    notices: Arc<N>,
    config: EngineConfig,
}

static LOAN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_loan_id(date_issued: NaiveDate) -> LoanId {
    let seq = LOAN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LoanId(format!("LD-{}-{seq:04}", date_issued.year()))
}

/// Receipt returned after a payment is recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentReceipt {
    pub loan: LoanStatementView,
    pub amount_paid: Decimal,
    pub total_repaid: Decimal,
    pub total_due: Decimal,
    pub remaining_balance: Decimal,
}

impl<R, N> LoanService<R, N>
where
    R: LoanRepository + 'static,
    N: NoticePublisher + 'static,
{
    pub fn new(repository: Arc<R>, notices: Arc<N>, config: EngineConfig) -> Self {
        Self {
            repository,
            notices,
            config,
        }
    }

    /// Underwrite an application and enter the resulting loan into the book.
    pub fn originate(&self, application: LoanApplication) -> Result<Loan, LoanServiceError> {
        let id = next_loan_id(application.date_issued);
        let loan = terms::underwrite(&application, self.config.grace_period_days, id)?;
        let stored = self.repository.insert(loan)?;
        Ok(stored)
    }

    /// Record a payment against a loan and persist the refreshed state.
    pub fn record_payment(
        &self,
        id: &LoanId,
        amount: Decimal,
        paid_on: NaiveDate,
    ) -> Result<PaymentReceipt, LoanServiceError> {
        let loan = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;

        let updated = engine::apply_payment(&loan, amount, paid_on, &self.config)?;
        self.repository.update(updated.clone())?;

        let assessment = engine::assess(&updated, paid_on, &self.config);
        Ok(PaymentReceipt {
            amount_paid: amount,
            total_repaid: updated.amount_repaid,
            total_due: assessment.total_due,
            remaining_balance: assessment.remaining_balance,
            loan: LoanStatementView::from_assessment(&updated, &assessment),
        })
    }

    /// Fetch a loan and derive its effective state as of `as_of`. The stored
    /// status/penalty columns are never surfaced directly.
    pub fn statement(
        &self,
        id: &LoanId,
        as_of: NaiveDate,
    ) -> Result<LoanStatementView, LoanServiceError> {
        let loan = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        let assessment = engine::assess(&loan, as_of, &self.config);
        Ok(LoanStatementView::from_assessment(&loan, &assessment))
    }

    /// Replace the rate on a negotiable loan and persist the refreshed state.
    pub fn renegotiate_rate(
        &self,
        id: &LoanId,
        rate: Decimal,
        as_of: NaiveDate,
    ) -> Result<LoanStatementView, LoanServiceError> {
        let loan = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        let renegotiated = terms::renegotiate_rate(&loan, rate)?;
        let refreshed = engine::refresh(&renegotiated, as_of, &self.config);
        self.repository.update(refreshed.clone())?;

        let assessment = engine::assess(&refreshed, as_of, &self.config);
        Ok(LoanStatementView::from_assessment(&refreshed, &assessment))
    }

    /// Portfolio totals across the whole book, recomputed as of `as_of`.
    pub fn portfolio(&self, as_of: NaiveDate) -> Result<PortfolioSummary, LoanServiceError> {
        let loans = self.repository.loans()?;
        Ok(portfolio_summary(&loans, as_of, &self.config))
    }

    /// Run one sweep pass over the open book as of `today`.
    pub fn run_sweep(&self, today: NaiveDate) -> Result<SweepOutcome, LoanServiceError> {
        let outcome = sweep::run_sweep(
            self.repository.as_ref(),
            self.notices.as_ref(),
            &self.config,
            today,
        )?;
        Ok(outcome)
    }
}

/// Error raised by the loan service.
#[derive(Debug, thiserror::Error)]
pub enum LoanServiceError {
    #[error(transparent)]
    Terms(#[from] TermsError),
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notice(#[from] NoticeError),
}
