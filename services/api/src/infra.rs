use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use loandesk::lending::{
    Loan, LoanId, LoanNotice, LoanRepository, NoticeError, NoticePublisher, RepositoryError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Book storage for local runs and demos; a database-backed adapter slots in
/// behind the same trait in deployment.
#[derive(Default, Clone)]
pub(crate) struct InMemoryLoanRepository {
    records: Arc<Mutex<HashMap<LoanId, Loan>>>,
}

impl LoanRepository for InMemoryLoanRepository {
    fn insert(&self, loan: Loan) -> Result<Loan, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&loan.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(loan.id.clone(), loan.clone());
        Ok(loan)
    }

    fn update(&self, loan: Loan) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&loan.id) {
            guard.insert(loan.id.clone(), loan);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &LoanId) -> Result<Option<Loan>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn loans(&self) -> Result<Vec<Loan>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut loans: Vec<Loan> = guard.values().cloned().collect();
        loans.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(loans)
    }
}

/// Records reminders and default notices instead of dispatching them; the
/// email/SMS gateway adapter implements the same trait in deployment.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNoticePublisher {
    events: Arc<Mutex<Vec<LoanNotice>>>,
}

impl NoticePublisher for InMemoryNoticePublisher {
    fn publish(&self, notice: LoanNotice) -> Result<(), NoticeError> {
        let mut guard = self.events.lock().expect("notice mutex poisoned");
        guard.push(notice);
        Ok(())
    }
}

impl InMemoryNoticePublisher {
    pub(crate) fn events(&self) -> Vec<LoanNotice> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
