use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use super::domain::{BorrowerRef, LoanId, LoanPeriod};
use super::repository::{LoanRepository, NoticePublisher, RepositoryError};
use super::service::{LoanService, LoanServiceError};
use super::terms::LoanApplication;

/// Router builder exposing the loan back-office endpoints.
pub fn lending_router<R, N>(service: Arc<LoanService<R, N>>) -> Router
where
    R: LoanRepository + 'static,
    N: NoticePublisher + 'static,
{
    Router::new()
        .route("/api/v1/loans", post(originate_handler::<R, N>))
        .route("/api/v1/loans/:loan_id", get(statement_handler::<R, N>))
        .route(
            "/api/v1/loans/:loan_id/payments",
            post(payment_handler::<R, N>),
        )
        .route("/api/v1/loans/:loan_id/rate", post(rate_handler::<R, N>))
        .route("/api/v1/sweep", post(sweep_handler::<R, N>))
        .route(
            "/api/v1/reports/portfolio",
            get(portfolio_handler::<R, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct OriginationRequest {
    pub borrower: String,
    pub principal: Decimal,
    pub period_weeks: i64,
    #[serde(default)]
    pub date_issued: Option<NaiveDate>,
    #[serde(default)]
    pub negotiable: bool,
    #[serde(default)]
    pub custom_rate: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub paid_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct RateChangeRequest {
    pub interest_rate: Decimal,
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SweepRequest {
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct AsOfQuery {
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

fn today_or(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

pub(crate) async fn originate_handler<R, N>(
    State(service): State<Arc<LoanService<R, N>>>,
    axum::Json(request): axum::Json<OriginationRequest>,
) -> Response
where
    R: LoanRepository + 'static,
    N: NoticePublisher + 'static,
{
    let Some(period) = LoanPeriod::from_weeks(request.period_weeks) else {
        let payload = json!({ "error": "loan period must be 1, 2, 3, or 4 weeks" });
        return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
    };

    let date_issued = today_or(request.date_issued);
    let application = LoanApplication {
        borrower: BorrowerRef(request.borrower),
        principal: request.principal,
        period,
        date_issued,
        negotiable: request.negotiable,
        custom_rate: request.custom_rate,
    };

    match service
        .originate(application)
        .and_then(|loan| service.statement(&loan.id, date_issued))
    {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn statement_handler<R, N>(
    State(service): State<Arc<LoanService<R, N>>>,
    Path(loan_id): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    R: LoanRepository + 'static,
    N: NoticePublisher + 'static,
{
    let id = LoanId(loan_id);
    match service.statement(&id, today_or(query.as_of)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn payment_handler<R, N>(
    State(service): State<Arc<LoanService<R, N>>>,
    Path(loan_id): Path<String>,
    axum::Json(request): axum::Json<PaymentRequest>,
) -> Response
where
    R: LoanRepository + 'static,
    N: NoticePublisher + 'static,
{
    let id = LoanId(loan_id);
    match service.record_payment(&id, request.amount, today_or(request.paid_on)) {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn rate_handler<R, N>(
    State(service): State<Arc<LoanService<R, N>>>,
    Path(loan_id): Path<String>,
    axum::Json(request): axum::Json<RateChangeRequest>,
) -> Response
where
    R: LoanRepository + 'static,
    N: NoticePublisher + 'static,
{
    let id = LoanId(loan_id);
    match service.renegotiate_rate(&id, request.interest_rate, today_or(request.as_of)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn sweep_handler<R, N>(
    State(service): State<Arc<LoanService<R, N>>>,
    request: Option<axum::Json<SweepRequest>>,
) -> Response
where
    R: LoanRepository + 'static,
    N: NoticePublisher + 'static,
{
    let today = today_or(request.and_then(|axum::Json(body)| body.today));
    match service.run_sweep(today) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn portfolio_handler<R, N>(
    State(service): State<Arc<LoanService<R, N>>>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    R: LoanRepository + 'static,
    N: NoticePublisher + 'static,
{
    match service.portfolio(today_or(query.as_of)) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: LoanServiceError) -> Response {
    let status = match &err {
        LoanServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        LoanServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        LoanServiceError::Repository(RepositoryError::Unavailable(_))
        | LoanServiceError::Notice(_) => StatusCode::INTERNAL_SERVER_ERROR,
        LoanServiceError::Terms(_) | LoanServiceError::Payment(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };

    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
