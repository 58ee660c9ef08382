use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::{
    engine::{self, format_date},
    extractors::{require_shop_owner, AuthenticatedUser},
    handlers::availability_handler::parse_query_month,
    models::{AnalyticsResponse, Booking, IndicatorsResponse},
    AppResult, AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct IndicatorsQuery {
    /// `YYYY-MM`; defaults to the current month
    pub month: Option<String>,
}

/// GET /api/shops/{shop_id}/bookings
#[utoipa::path(
    get,
    path = "/api/shops/{shop_id}/bookings",
    params(
        ("shop_id" = String, Path, description = "Shop id")
    ),
    responses(
        (status = 200, description = "All bookings of the shop, newest first", body = Vec<Booking>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller does not own the shop")
    ),
    tag = "owner"
)]
pub async fn get_shop_bookings(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(shop_id): Path<String>,
) -> AppResult<Json<Vec<Booking>>> {
    let shop = require_shop_owner(state.directory.as_ref(), &shop_id, &auth).await?;
    let bookings = state.bookings.fetch_bookings_for_shop(&shop.id).await?;

    Ok(Json(bookings))
}

/// GET /api/shops/{shop_id}/bookings/today
#[utoipa::path(
    get,
    path = "/api/shops/{shop_id}/bookings/today",
    params(
        ("shop_id" = String, Path, description = "Shop id")
    ),
    responses(
        (status = 200, description = "Today's accepted bookings by start time", body = Vec<Booking>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller does not own the shop")
    ),
    tag = "owner"
)]
pub async fn get_todays_bookings(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(shop_id): Path<String>,
) -> AppResult<Json<Vec<Booking>>> {
    let shop = require_shop_owner(state.directory.as_ref(), &shop_id, &auth).await?;
    let bookings = state.bookings.fetch_bookings_for_shop(&shop.id).await?;

    Ok(Json(engine::todays_accepted_bookings(&bookings, state.clock.today())))
}

/// GET /api/shops/{shop_id}/analytics
#[utoipa::path(
    get,
    path = "/api/shops/{shop_id}/analytics",
    params(
        ("shop_id" = String, Path, description = "Shop id")
    ),
    responses(
        (status = 200, description = "Status counts and this week's load", body = AnalyticsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller does not own the shop")
    ),
    tag = "owner"
)]
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(shop_id): Path<String>,
) -> AppResult<Json<AnalyticsResponse>> {
    let shop = require_shop_owner(state.directory.as_ref(), &shop_id, &auth).await?;
    let bookings = state.bookings.fetch_bookings_for_shop(&shop.id).await?;
    let today = state.clock.today();

    Ok(Json(AnalyticsResponse {
        analytics: engine::calculate_analytics(&bookings, today),
        weekly: engine::weekly_booking_counts(&bookings, today),
    }))
}

/// GET /api/shops/{shop_id}/indicators?month=
#[utoipa::path(
    get,
    path = "/api/shops/{shop_id}/indicators",
    params(
        ("shop_id" = String, Path, description = "Shop id"),
        IndicatorsQuery
    ),
    responses(
        (status = 200, description = "Per-day accepted/pending/denied counts", body = IndicatorsResponse),
        (status = 400, description = "Invalid month"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller does not own the shop")
    ),
    tag = "owner"
)]
pub async fn get_day_indicators(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(shop_id): Path<String>,
    Query(query): Query<IndicatorsQuery>,
) -> AppResult<Json<IndicatorsResponse>> {
    let month = parse_query_month(query.month.as_deref(), state.clock.today())?;
    let shop = require_shop_owner(state.directory.as_ref(), &shop_id, &auth).await?;
    let bookings = state.bookings.fetch_bookings_for_shop(&shop.id).await?;

    let days = engine::day_indicators(&bookings, month)
        .into_iter()
        .map(|(date, counts)| (format_date(date), counts))
        .collect();

    Ok(Json(IndicatorsResponse {
        month: month.to_string(),
        days,
    }))
}

/// GET /api/owner/bookings
#[utoipa::path(
    get,
    path = "/api/owner/bookings",
    responses(
        (status = 200, description = "Bookings across the caller's shops, newest first", body = Vec<Booking>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "owner"
)]
pub async fn get_owner_bookings(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Vec<Booking>>> {
    let bookings = state.bookings.fetch_bookings_for_owner(&auth.user_id).await?;
    tracing::debug!(owner_id = %auth.user_id, count = bookings.len(), "Fetched owner bookings");

    Ok(Json(bookings))
}
