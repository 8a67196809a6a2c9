use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::lending::domain::{BorrowerRef, Loan, LoanId, LoanPeriod};
use crate::lending::engine::EngineConfig;
use crate::lending::repository::{
    LoanNotice, LoanRepository, NoticeError, NoticePublisher, RepositoryError,
};
use crate::lending::router::lending_router;
use crate::lending::service::LoanService;
use crate::lending::terms::{underwrite, LoanApplication};

pub(super) fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Monday 2026-01-05; a 1-week loan comes due 2026-01-12 with grace through
/// 2026-01-19.
pub(super) fn issued() -> NaiveDate {
    day(2026, 1, 5)
}

pub(super) fn engine_config() -> EngineConfig {
    EngineConfig {
        grace_period_days: 7,
        daily_penalty_rate: dec!(3),
    }
}

pub(super) fn application(principal: Decimal, period: LoanPeriod) -> LoanApplication {
    LoanApplication {
        borrower: BorrowerRef("BRW-001".to_string()),
        principal,
        period,
        date_issued: issued(),
        negotiable: false,
        custom_rate: None,
    }
}

/// The reference loan from the penalty scenarios: 10 000 at the 1-week 20%
/// tier, so the contract total is 12 000.
pub(super) fn standard_loan() -> Loan {
    underwrite(
        &application(dec!(10000), LoanPeriod::OneWeek),
        engine_config().grace_period_days,
        LoanId("LD-2026-0001".to_string()),
    )
    .expect("reference loan underwrites")
}

pub(super) fn negotiable_application() -> LoanApplication {
    LoanApplication {
        borrower: BorrowerRef("BRW-002".to_string()),
        principal: dec!(60000),
        period: LoanPeriod::TwoWeeks,
        date_issued: issued(),
        negotiable: true,
        custom_rate: Some(dec!(18)),
    }
}

pub(super) fn build_service() -> (
    LoanService<MemoryRepository, MemoryNotices>,
    Arc<MemoryRepository>,
    Arc<MemoryNotices>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notices = Arc::new(MemoryNotices::default());
    let service = LoanService::new(repository.clone(), notices.clone(), engine_config());
    (service, repository, notices)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<LoanId, Loan>>>,
}

impl LoanRepository for MemoryRepository {
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

#[derive(Default, Clone)]
pub(super) struct MemoryNotices {
    events: Arc<Mutex<Vec<LoanNotice>>>,
}

impl MemoryNotices {
    pub(super) fn events(&self) -> Vec<LoanNotice> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }
}

impl NoticePublisher for MemoryNotices {
    fn publish(&self, notice: LoanNotice) -> Result<(), NoticeError> {
        self.events
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

/// Wraps a memory repository but refuses to persist one chosen loan, for the
/// sweep's continue-on-failure contract.
pub(super) struct FlakyRepository {
    pub(super) inner: MemoryRepository,
    pub(super) poison: LoanId,
}

impl LoanRepository for FlakyRepository {
    fn insert(&self, loan: Loan) -> Result<Loan, RepositoryError> {
        self.inner.insert(loan)
    }

    fn update(&self, loan: Loan) -> Result<(), RepositoryError> {
        if loan.id == self.poison {
            return Err(RepositoryError::Unavailable("row lock timeout".to_string()));
        }
        self.inner.update(loan)
    }

    fn fetch(&self, id: &LoanId) -> Result<Option<Loan>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn loans(&self) -> Result<Vec<Loan>, RepositoryError> {
        self.inner.loans()
    }
}

pub(super) struct UnavailableRepository;

impl LoanRepository for UnavailableRepository {
    fn insert(&self, _loan: Loan) -> Result<Loan, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _loan: Loan) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &LoanId) -> Result<Option<Loan>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn loans(&self) -> Result<Vec<Loan>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn router_with_service(
    service: LoanService<MemoryRepository, MemoryNotices>,
) -> axum::Router {
    lending_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
