use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::CloseError;
use super::feed::OperationalDataFeed;
use super::report::{ReportSection, ReportWarning};
use super::service::MonthEndCloseService;
use super::store::CloseStore;

/// Router builder exposing the month-end close endpoints.
pub fn close_router<S, F>(service: Arc<MonthEndCloseService<S, F>>) -> Router
where
    S: CloseStore + 'static,
    F: OperationalDataFeed + 'static,
{
    Router::new()
        .route("/api/v1/close/periods", post(create_period_handler::<S, F>))
        .route(
            "/api/v1/close/periods/:year/:month",
            get(period_status_handler::<S, F>),
        )
        .route(
            "/api/v1/close/periods/:year/:month/checklist",
            get(checklist_handler::<S, F>),
        )
        .route(
            "/api/v1/close/periods/:year/:month/checklist/toggle",
            post(toggle_item_handler::<S, F>),
        )
        .route(
            "/api/v1/close/periods/:year/:month/auto-checks",
            post(auto_checks_handler::<S, F>),
        )
        .route(
            "/api/v1/close/periods/:year/:month/close",
            post(close_month_handler::<S, F>),
        )
        .route(
            "/api/v1/close/periods/:year/:month/report-pack",
            post(report_pack_handler::<S, F>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatePeriodRequest {
    pub(crate) year: i32,
    pub(crate) month: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToggleItemRequest {
    pub(crate) item: String,
    pub(crate) completed: bool,
    pub(crate) actor: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CloseMonthRequest {
    pub(crate) signed_by: String,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportPackRequest {
    pub(crate) sections: Vec<ReportSection>,
    pub(crate) actor: String,
    /// Report date override for reproducible artifacts; defaults to today.
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) include_csv: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportPageSummary {
    pub(crate) number: usize,
    pub(crate) section: ReportSection,
    pub(crate) label: &'static str,
    pub(crate) row_count: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportPackResponse {
    pub(crate) period: String,
    pub(crate) generated_on: NaiveDate,
    pub(crate) pages: Vec<ReportPageSummary>,
    pub(crate) artifact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) csv: Option<String>,
    pub(crate) warnings: Vec<ReportWarning>,
}

pub(crate) async fn create_period_handler<S, F>(
    State(service): State<Arc<MonthEndCloseService<S, F>>>,
    axum::Json(payload): axum::Json<CreatePeriodRequest>,
) -> Response
where
    S: CloseStore + 'static,
    F: OperationalDataFeed + 'static,
{
    match service.create_period(payload.year, payload.month) {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(err) => close_error_response(err),
    }
}

pub(crate) async fn period_status_handler<S, F>(
    State(service): State<Arc<MonthEndCloseService<S, F>>>,
    Path((year, month)): Path<(i32, u32)>,
) -> Response
where
    S: CloseStore + 'static,
    F: OperationalDataFeed + 'static,
{
    let today = Local::now().date_naive();
    match service.period_status(year, month, today) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => close_error_response(err),
    }
}

pub(crate) async fn checklist_handler<S, F>(
    State(service): State<Arc<MonthEndCloseService<S, F>>>,
    Path((year, month)): Path<(i32, u32)>,
) -> Response
where
    S: CloseStore + 'static,
    F: OperationalDataFeed + 'static,
{
    let now = Local::now().naive_local();
    match service.checklist_view(year, month, now) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => close_error_response(err),
    }
}

pub(crate) async fn toggle_item_handler<S, F>(
    State(service): State<Arc<MonthEndCloseService<S, F>>>,
    Path((year, month)): Path<(i32, u32)>,
    axum::Json(payload): axum::Json<ToggleItemRequest>,
) -> Response
where
    S: CloseStore + 'static,
    F: OperationalDataFeed + 'static,
{
    let now = Local::now().naive_local();
    match service.toggle_item(
        year,
        month,
        &payload.item,
        payload.completed,
        &payload.actor,
        now,
    ) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => close_error_response(err),
    }
}

pub(crate) async fn auto_checks_handler<S, F>(
    State(service): State<Arc<MonthEndCloseService<S, F>>>,
    Path((year, month)): Path<(i32, u32)>,
) -> Response
where
    S: CloseStore + 'static,
    F: OperationalDataFeed + 'static,
{
    let now = Local::now().naive_local();
    match service.run_auto_checks(year, month, now) {
        Ok(run) => (StatusCode::OK, axum::Json(run)).into_response(),
        Err(err) => close_error_response(err),
    }
}

pub(crate) async fn close_month_handler<S, F>(
    State(service): State<Arc<MonthEndCloseService<S, F>>>,
    Path((year, month)): Path<(i32, u32)>,
    axum::Json(payload): axum::Json<CloseMonthRequest>,
) -> Response
where
    S: CloseStore + 'static,
    F: OperationalDataFeed + 'static,
{
    let now = Local::now().naive_local();
    match service.close_month(
        year,
        month,
        &payload.signed_by,
        payload.notes,
        now.date(),
        now,
    ) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => close_error_response(err),
    }
}

pub(crate) async fn report_pack_handler<S, F>(
    State(service): State<Arc<MonthEndCloseService<S, F>>>,
    Path((year, month)): Path<(i32, u32)>,
    axum::Json(payload): axum::Json<ReportPackRequest>,
) -> Response
where
    S: CloseStore + 'static,
    F: OperationalDataFeed + 'static,
{
    let now = Local::now().naive_local();
    let today = payload.today.unwrap_or_else(|| now.date());

    let outcome =
        match service.generate_report_pack(year, month, &payload.sections, &payload.actor, today, now)
        {
            Ok(outcome) => outcome,
            Err(err) => return close_error_response(err),
        };

    let csv = if payload.include_csv {
        match outcome.pack.to_csv() {
            Ok(csv) => Some(csv),
            Err(err) => {
                let body = json!({ "error": format!("csv export failed: {err}") });
                return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response();
            }
        }
    } else {
        None
    };

    let response = ReportPackResponse {
        period: outcome.pack.period.to_string(),
        generated_on: outcome.pack.generated_on,
        pages: outcome
            .pack
            .pages
            .iter()
            .map(|page| ReportPageSummary {
                number: page.number,
                section: page.section,
                label: page.label,
                row_count: page.rows.len(),
            })
            .collect(),
        artifact: outcome.pack.to_text(),
        csv,
        warnings: outcome.warnings,
    };

    (StatusCode::OK, axum::Json(response)).into_response()
}

/// One place for the error taxonomy to HTTP mapping: missing records are
/// 404, duplicate or already-closed conflicts are 409, violated
/// preconditions are 412, malformed input is 422.
pub(crate) fn close_error_response(err: CloseError) -> Response {
    let status = match &err {
        CloseError::PeriodNotFound(_) | CloseError::ItemNotFound { .. } => StatusCode::NOT_FOUND,
        CloseError::PeriodAlreadyExists(_) | CloseError::PeriodAlreadyClosed(_) => {
            StatusCode::CONFLICT
        }
        CloseError::PeriodClosed(_)
        | CloseError::ItemIsAutoManaged { .. }
        | CloseError::ChecklistIncomplete { .. } => StatusCode::PRECONDITION_FAILED,
        CloseError::PeriodOutOfRange { .. } | CloseError::NoSectionsSelected => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        CloseError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let mut body = json!({ "error": err.to_string() });
    if let CloseError::ChecklistIncomplete { remaining, .. } = &err {
        body["remaining_items"] = json!(remaining);
    }

    (status, axum::Json(body)).into_response()
}
