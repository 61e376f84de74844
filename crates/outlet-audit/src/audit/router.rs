use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::json;
use tracing::error;

use super::domain::{parse_date, Caller, ChecklistPointId, DateRange, DivisionId, OutletId, VisitId};
use super::repository::{AuditRepository, CallerDirectory};
use super::service::{AuditReportService, ReportError, ResponseSubmission};

type SharedService<R, C> = Arc<AuditReportService<R, C>>;

/// Router builder exposing the report and response-capture endpoints.
pub fn report_router<R, C>(service: SharedService<R, C>) -> Router
where
    R: AuditRepository + 'static,
    C: CallerDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/reports/visits/:visit_id",
            get(visit_report_handler::<R, C>),
        )
        .route(
            "/api/v1/reports/outlets/:outlet_id",
            get(outlet_report_handler::<R, C>),
        )
        .route(
            "/api/v1/reports/divisions/:division_id",
            get(division_report_handler::<R, C>),
        )
        .route(
            "/api/v1/reports/summary",
            get(range_report_handler::<R, C>),
        )
        .route("/api/v1/dashboard", get(dashboard_handler::<R, C>))
        .route(
            "/api/v1/visits/:visit_id/responses/:point_id",
            put(record_response_handler::<R, C>),
        )
        .with_state(service)
}

/// Optional inclusive `from`/`to` bounds, both `YYYY-MM-DD`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RangeQuery {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) to: Option<NaiveDate>,
}

impl RangeQuery {
    fn into_range(self) -> Result<DateRange, ReportError> {
        Ok(DateRange::new(self.from, self.to)?)
    }
}

pub(crate) async fn visit_report_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    headers: HeaderMap,
    visit_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    R: AuditRepository + 'static,
    C: CallerDirectory + 'static,
{
    let result = authenticate(&service, &headers).and_then(|caller| {
        let Path(visit_id) = visit_id?;
        service.visit_report(&caller, VisitId(visit_id))
    });
    respond(result)
}

pub(crate) async fn outlet_report_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    headers: HeaderMap,
    outlet_id: Result<Path<u64>, PathRejection>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Response
where
    R: AuditRepository + 'static,
    C: CallerDirectory + 'static,
{
    let result = authenticate(&service, &headers).and_then(|caller| {
        let Path(outlet_id) = outlet_id?;
        let range = requested_range(query)?;
        service.outlet_report(&caller, OutletId(outlet_id), range)
    });
    respond(result)
}

pub(crate) async fn division_report_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    headers: HeaderMap,
    division_id: Result<Path<u64>, PathRejection>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Response
where
    R: AuditRepository + 'static,
    C: CallerDirectory + 'static,
{
    let result = authenticate(&service, &headers).and_then(|caller| {
        let Path(division_id) = division_id?;
        let range = requested_range(query)?;
        service.division_report(&caller, DivisionId(division_id), range)
    });
    respond(result)
}

pub(crate) async fn range_report_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    headers: HeaderMap,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Response
where
    R: AuditRepository + 'static,
    C: CallerDirectory + 'static,
{
    let result = authenticate(&service, &headers).and_then(|caller| {
        let range = requested_range(query)?;
        service.range_report(&caller, range)
    });
    respond(result)
}

pub(crate) async fn dashboard_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    headers: HeaderMap,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Response
where
    R: AuditRepository + 'static,
    C: CallerDirectory + 'static,
{
    let result = authenticate(&service, &headers).and_then(|caller| {
        let range = requested_range(query)?;
        service.dashboard(&caller, range)
    });
    respond(result)
}

pub(crate) async fn record_response_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    headers: HeaderMap,
    ids: Result<Path<(u64, u64)>, PathRejection>,
    submission: Result<axum::Json<ResponseSubmission>, JsonRejection>,
) -> Response
where
    R: AuditRepository + 'static,
    C: CallerDirectory + 'static,
{
    let result = authenticate(&service, &headers).and_then(|caller| {
        let Path((visit_id, point_id)) = ids?;
        let axum::Json(submission) = submission?;
        service.record_response(
            &caller,
            VisitId(visit_id),
            ChecklistPointId(point_id),
            submission,
        )
    });
    respond(result)
}

/// Parsed after authentication: an anonymous caller gets 401 whatever the query holds.
fn requested_range(
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<DateRange, ReportError> {
    let Query(query) = query?;
    query.into_range()
}

fn authenticate<R, C>(
    service: &AuditReportService<R, C>,
    headers: &HeaderMap,
) -> Result<Caller, ReportError>
where
    R: AuditRepository + 'static,
    C: CallerDirectory + 'static,
{
    let token = bearer_token(headers).ok_or(ReportError::Unauthenticated)?;
    service.authenticate(token)
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim())
    } else {
        None
    }
}

fn respond<T: serde::Serialize>(result: Result<T, ReportError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, axum::Json(body)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) fn error_status(err: &ReportError) -> StatusCode {
    match err {
        ReportError::Unauthenticated => StatusCode::UNAUTHORIZED,
        ReportError::Forbidden(_) => StatusCode::FORBIDDEN,
        ReportError::VisitNotFound(_)
        | ReportError::OutletNotFound(_)
        | ReportError::DivisionNotFound(_)
        | ReportError::UnknownChecklistPoint(_) => StatusCode::NOT_FOUND,
        ReportError::InvalidRange(_) | ReportError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
        ReportError::InvalidAnswer(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ReportError::VisitNotEditable { .. } => StatusCode::CONFLICT,
        ReportError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: ReportError) -> Response {
    let status = error_status(&err);
    if status.is_server_error() {
        error!(error = %err, "report request failed");
    }

    let mut response = (status, axum::Json(json!({ "error": err.to_string() }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
        response.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            header::HeaderValue::from_static("Bearer"),
        );
    }
    response
}

impl From<PathRejection> for ReportError {
    fn from(rejection: PathRejection) -> Self {
        ReportError::MalformedRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ReportError {
    fn from(rejection: QueryRejection) -> Self {
        ReportError::MalformedRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ReportError {
    fn from(rejection: JsonRejection) -> Self {
        ReportError::MalformedRequest(rejection.body_text())
    }
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
