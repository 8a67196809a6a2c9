use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::{BorrowerRef, Loan, LoanId, LoanStatus};
use super::engine::LoanAssessment;

/// Storage abstraction so the service and sweep can be exercised in
/// isolation. The engine never touches storage itself; callers read a record,
/// run the engine, and write the result back.
pub trait LoanRepository: Send + Sync {
    fn insert(&self, loan: Loan) -> Result<Loan, RepositoryError>;
    fn update(&self, loan: Loan) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &LoanId) -> Result<Option<Loan>, RepositoryError>;
    /// Every loan in the book, paid history included.
    fn loans(&self) -> Result<Vec<Loan>, RepositoryError>;

    /// The sweep's working set: loans whose cached status is not `Paid`.
    /// `Paid` is absorbing, so filtering on the cache cannot drop a loan
    /// that still needs processing.
    fn open_loans(&self) -> Result<Vec<Loan>, RepositoryError> {
        Ok(self
            .loans()?
            .into_iter()
            .filter(|loan| loan.status != LoanStatus::Paid)
            .collect())
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("loan already exists")]
    Conflict,
    #[error("loan not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notification hook (email/SMS adapters live behind this).
pub trait NoticePublisher: Send + Sync {
    fn publish(&self, notice: LoanNotice) -> Result<(), NoticeError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Sent the day before the due date while a balance is outstanding.
    DueDateReminder,
    /// Sent when a loan newly transitions into `Defaulted`.
    DefaultNotice,
}

impl NoticeKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::DueDateReminder => "due_date_reminder",
            Self::DefaultNotice => "default_notice",
        }
    }
}

/// Notification payload handed to the dispatch adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanNotice {
    pub kind: NoticeKind,
    pub loan_id: LoanId,
    pub borrower: BorrowerRef,
    pub details: BTreeMap<String, String>,
}

/// Notice dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NoticeError {
    #[error("notice transport unavailable: {0}")]
    Transport(String),
}

/// The always-recomputed public view of a loan: the "effective" state, as
/// opposed to whatever the stored columns say.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanStatementView {
    pub loan_id: LoanId,
    pub borrower: BorrowerRef,
    pub status: &'static str,
    pub principal: Decimal,
    pub interest_rate: Decimal,
    pub total_amount: Decimal,
    pub amount_repaid: Decimal,
    pub outstanding_balance: Decimal,
    pub effective_penalty: Decimal,
    pub total_due: Decimal,
    pub remaining_balance: Decimal,
    pub date_issued: NaiveDate,
    pub due_date: NaiveDate,
    pub grace_period_end: NaiveDate,
    pub days_overdue: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_payment_date: Option<NaiveDate>,
}

impl LoanStatementView {
    pub fn from_assessment(loan: &Loan, assessment: &LoanAssessment) -> Self {
        Self {
            loan_id: loan.id.clone(),
            borrower: loan.borrower.clone(),
            status: assessment.status.label(),
            principal: loan.principal,
            interest_rate: loan.interest_rate,
            total_amount: loan.total_amount,
            amount_repaid: loan.amount_repaid,
            outstanding_balance: assessment.outstanding_balance,
            effective_penalty: assessment.effective_penalty,
            total_due: assessment.total_due,
            remaining_balance: assessment.remaining_balance,
            date_issued: loan.schedule.date_issued,
            due_date: loan.schedule.due_date,
            grace_period_end: loan.schedule.grace_period_end,
            days_overdue: assessment.days_overdue,
            last_payment_date: loan.last_payment_date,
        }
    }
}
