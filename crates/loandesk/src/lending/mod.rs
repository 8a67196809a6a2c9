//! Loan lifecycle back office: origination terms, the status/penalty engine,
//! payment application, the daily sweep, and the boundaries callers plug
//! storage and notification adapters into.

pub mod domain;
pub mod engine;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;
pub mod sweep;
pub mod terms;

#[cfg(test)]
mod tests;

pub use domain::{
    BorrowerRef, Loan, LoanDataError, LoanId, LoanPeriod, LoanSchedule, LoanStatus,
};
pub use engine::{EngineConfig, LoanAssessment, PaymentError};
pub use report::PortfolioSummary;
pub use repository::{
    LoanNotice, LoanRepository, LoanStatementView, NoticeError, NoticeKind, NoticePublisher,
    RepositoryError,
};
pub use router::lending_router;
pub use service::{LoanService, LoanServiceError, PaymentReceipt};
pub use sweep::SweepOutcome;
pub use terms::{LoanApplication, TermsError, MIN_PRINCIPAL_FOUR_WEEKS, NEGOTIABLE_THRESHOLD};
