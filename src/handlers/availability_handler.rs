use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::{
    engine::{self, BookingError, Selection, TimeSlot, YearMonth},
    models::{
        CalendarMonthResponse, RangeCheckResponse, Service, SelectionResponse, SelectionTapInput,
        SelectionValidateInput, SelectionValidationResponse, Shop,
    },
    AppError, AppResult, AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct SlotsQuery {
    /// `YYYY-MM-DD`
    pub date: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CalendarQuery {
    /// `YYYY-MM`; defaults to the current month
    pub month: Option<String>,
    /// Selected start date, `YYYY-MM-DD`
    pub start: Option<String>,
    /// Selected end date, `YYYY-MM-DD`
    pub end: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RangeQuery {
    pub start: String,
    pub end: String,
}

pub(crate) fn parse_query_date(name: &str, value: &str) -> AppResult<NaiveDate> {
    engine::parse_date(value).map_err(|e| AppError::BadRequest(format!("Invalid {}: {}", name, e)))
}

pub(crate) fn parse_query_month(value: Option<&str>, today: NaiveDate) -> AppResult<YearMonth> {
    match value {
        Some(raw) => raw
            .parse::<YearMonth>()
            .map_err(|e| AppError::BadRequest(format!("Invalid month: {}", e))),
        None => Ok(YearMonth::of(today)),
    }
}

/// Load a shop and one of its services
pub(crate) async fn load_shop_service(
    state: &AppState,
    shop_id: &str,
    service_id: &str,
) -> AppResult<(Shop, Service)> {
    let shop = state.directory.fetch_shop(shop_id).await?;
    let service = state.directory.fetch_service(service_id).await?;

    if service.shop_id != shop.id {
        return Err(AppError::NotFound(format!(
            "Service {} not found for shop {}",
            service_id, shop_id
        )));
    }

    Ok((shop, service))
}

/// GET /api/shops/{shop_id}/services/{service_id}/slots?date=
#[utoipa::path(
    get,
    path = "/api/shops/{shop_id}/services/{service_id}/slots",
    params(
        ("shop_id" = String, Path, description = "Shop id"),
        ("service_id" = String, Path, description = "Service id"),
        SlotsQuery
    ),
    responses(
        (status = 200, description = "Ordered time slots for the date", body = Vec<TimeSlot>),
        (status = 400, description = "Invalid date format"),
        (status = 404, description = "Shop or service not found")
    ),
    tag = "availability"
)]
pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    Path((shop_id, service_id)): Path<(String, String)>,
    Query(query): Query<SlotsQuery>,
) -> AppResult<Json<Vec<TimeSlot>>> {
    let date = parse_query_date("date", &query.date)?;
    let (shop, service) = load_shop_service(&state, &shop_id, &service_id).await?;
    let bookings = state.bookings.fetch_bookings_for_shop(&shop.id).await?;

    let slots = engine::compute_slots_for_service(date, &shop.hours, &service.profile, &bookings);
    tracing::debug!(shop_id = %shop_id, service_id = %service_id, %date, count = slots.len(), "Computed slots");

    Ok(Json(slots))
}

/// GET /api/shops/{shop_id}/calendar?month=&start=&end=
#[utoipa::path(
    get,
    path = "/api/shops/{shop_id}/calendar",
    params(
        ("shop_id" = String, Path, description = "Shop id"),
        CalendarQuery
    ),
    responses(
        (status = 200, description = "42-cell month grid", body = CalendarMonthResponse),
        (status = 400, description = "Invalid month or date format"),
        (status = 404, description = "Shop not found")
    ),
    tag = "availability"
)]
pub async fn get_calendar(
    State(state): State<Arc<AppState>>,
    Path(shop_id): Path<String>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<CalendarMonthResponse>> {
    let today = state.clock.today();
    let month = parse_query_month(query.month.as_deref(), today)?;

    let selection = Selection {
        start_date: query.start.as_deref().map(|v| parse_query_date("start", v)).transpose()?,
        end_date: query.end.as_deref().map(|v| parse_query_date("end", v)).transpose()?,
        time_slot: None,
    };

    let shop = state.directory.fetch_shop(&shop_id).await?;
    let bookings = state.bookings.fetch_bookings_for_shop(&shop.id).await?;
    let days = engine::build_month(month, today, &selection, &bookings);

    Ok(Json(CalendarMonthResponse {
        month: month.to_string(),
        days,
    }))
}

/// GET /api/shops/{shop_id}/range-check?start=&end=
#[utoipa::path(
    get,
    path = "/api/shops/{shop_id}/range-check",
    params(
        ("shop_id" = String, Path, description = "Shop id"),
        RangeQuery
    ),
    responses(
        (status = 200, description = "Whether any day of the range is held", body = RangeCheckResponse),
        (status = 400, description = "Invalid date format or end before start"),
        (status = 404, description = "Shop not found")
    ),
    tag = "availability"
)]
pub async fn check_range(
    State(state): State<Arc<AppState>>,
    Path(shop_id): Path<String>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<RangeCheckResponse>> {
    let start = parse_query_date("start", &query.start)?;
    let end = parse_query_date("end", &query.end)?;
    if end < start {
        return Err(AppError::BadRequest("end must not be before start".to_string()));
    }

    let shop = state.directory.fetch_shop(&shop_id).await?;
    let bookings = state.bookings.fetch_bookings_for_shop(&shop.id).await?;

    Ok(Json(RangeCheckResponse {
        start,
        end,
        is_blocked: engine::is_range_blocked(start, end, &bookings),
    }))
}

/// POST /api/shops/{shop_id}/services/{service_id}/selection/tap
#[utoipa::path(
    post,
    path = "/api/shops/{shop_id}/services/{service_id}/selection/tap",
    params(
        ("shop_id" = String, Path, description = "Shop id"),
        ("service_id" = String, Path, description = "Service id")
    ),
    request_body = SelectionTapInput,
    responses(
        (status = 200, description = "Selection after the tap", body = SelectionResponse),
        (status = 400, description = "Neither a date nor a time slot was tapped")
    ),
    tag = "availability"
)]
pub async fn tap_selection(
    State(state): State<Arc<AppState>>,
    Path((shop_id, service_id)): Path<(String, String)>,
    Json(input): Json<SelectionTapInput>,
) -> AppResult<Json<SelectionResponse>> {
    let (_, service) = load_shop_service(&state, &shop_id, &service_id).await?;
    let mut selection = input.selection;

    match (input.date, input.time_slot) {
        (Some(date), None) => selection.tap(date, service.profile.allows_multi_day_booking),
        (None, Some(slot)) => selection.toggle_time_slot(slot),
        _ => {
            return Err(AppError::BadRequest(
                "Tap exactly one of date or timeSlot".to_string(),
            ))
        }
    }

    Ok(Json(SelectionResponse {
        state: selection.state(),
        selection,
    }))
}

/// POST /api/shops/{shop_id}/services/{service_id}/selection/validate
#[utoipa::path(
    post,
    path = "/api/shops/{shop_id}/services/{service_id}/selection/validate",
    params(
        ("shop_id" = String, Path, description = "Shop id"),
        ("service_id" = String, Path, description = "Service id")
    ),
    request_body = SelectionValidateInput,
    responses(
        (status = 200, description = "Whether the selection can be submitted", body = SelectionValidationResponse)
    ),
    tag = "availability"
)]
pub async fn validate_selection(
    State(state): State<Arc<AppState>>,
    Path((shop_id, service_id)): Path<(String, String)>,
    Json(input): Json<SelectionValidateInput>,
) -> AppResult<Json<SelectionValidationResponse>> {
    let (shop, service) = load_shop_service(&state, &shop_id, &service_id).await?;
    let bookings = state.bookings.fetch_bookings_for_shop(&shop.id).await?;

    let result = engine::validate_selection(
        &input.selection,
        &shop.hours,
        &service.profile,
        &bookings,
        state.clock.today(),
    );

    let response = match result {
        Ok(validated) => SelectionValidationResponse {
            can_submit: true,
            reason: None,
            validated: Some(validated),
        },
        Err(e @ (BookingError::Validation(_) | BookingError::Conflict(_))) => SelectionValidationResponse {
            can_submit: false,
            reason: Some(e.to_string()),
            validated: None,
        },
        Err(e) => return Err(e.into()),
    };

    Ok(Json(response))
}
