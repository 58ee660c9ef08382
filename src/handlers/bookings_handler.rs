use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use metrics::counter;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::{
    engine::{lifecycle, BookingError, BookingRequest, BookingStatus, BookingSubmitter},
    extractors::{AuthenticatedUser, MaybeUser},
    handlers::availability_handler::load_shop_service,
    models::{Booking, BookingMutationResponse, CreateBookingInput, UpdateStatusInput},
    AppError, AppResult, AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct MyBookingsQuery {
    /// Narrow to one status, e.g. `PENDING`
    pub status: Option<String>,
}

fn submission_outcome(result: &Result<impl Sized, BookingError>) -> &'static str {
    match result {
        Ok(_) => "created",
        Err(BookingError::Conflict(_)) => "conflict",
        Err(BookingError::Unauthenticated) => "unauthenticated",
        Err(BookingError::Validation(_) | BookingError::Format(_)) => "invalid",
        Err(_) => "error",
    }
}

/// POST /api/shops/{shop_id}/services/{service_id}/bookings
#[utoipa::path(
    post,
    path = "/api/shops/{shop_id}/services/{service_id}/bookings",
    params(
        ("shop_id" = String, Path, description = "Shop id"),
        ("service_id" = String, Path, description = "Service id")
    ),
    request_body = CreateBookingInput,
    responses(
        (status = 201, description = "Booking request created as PENDING", body = BookingMutationResponse),
        (status = 401, description = "Please sign in to book"),
        (status = 409, description = "Slot or range was just booked"),
        (status = 422, description = "Selection is incomplete or not bookable")
    ),
    tag = "bookings"
)]
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    Path((shop_id, service_id)): Path<(String, String)>,
    Json(input): Json<CreateBookingInput>,
) -> AppResult<(StatusCode, Json<BookingMutationResponse>)> {
    let customer = user.as_ref().map(AuthenticatedUser::as_customer);
    let (shop, service) = load_shop_service(&state, &shop_id, &service_id).await?;

    let submitter = BookingSubmitter::new(state.bookings.clone(), state.clock.clone());
    let result = submitter
        .submit(BookingRequest {
            shop: &shop,
            service: &service,
            selection: &input.selection,
            customer: customer.as_ref(),
            notes: &input.notes,
        })
        .await;

    counter!("bookings_submitted_total", "outcome" => submission_outcome(&result)).increment(1);

    let submitted = result.map_err(|e| {
        tracing::info!(error = %e, shop_id = %shop_id, service_id = %service_id, "Booking request rejected");
        e
    })?;

    Ok((
        StatusCode::CREATED,
        Json(BookingMutationResponse {
            success: true,
            booking_id: Some(submitted.id),
            message: Some("Booking request sent".to_string()),
        }),
    ))
}

/// PUT /api/bookings/{id}/status
#[utoipa::path(
    put,
    path = "/api/bookings/{id}/status",
    params(
        ("id" = String, Path, description = "Booking id")
    ),
    request_body = UpdateStatusInput,
    responses(
        (status = 200, description = "Updated booking", body = Booking),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is neither the owner nor allowed to issue this status"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Slot already accepted or booking changed concurrently"),
        (status = 422, description = "Transition not allowed from the current status")
    ),
    tag = "bookings"
)]
pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(booking_id): Path<String>,
    Json(input): Json<UpdateStatusInput>,
) -> AppResult<Json<Booking>> {
    let updated = lifecycle::change_status(
        state.bookings.as_ref(),
        &booking_id,
        &auth.user_id,
        input.status,
        input.response_message.as_deref(),
    )
    .await?;

    counter!("booking_status_changes_total", "status" => updated.status.as_str()).increment(1);

    Ok(Json(updated))
}

/// GET /api/me/bookings?status=
#[utoipa::path(
    get,
    path = "/api/me/bookings",
    params(MyBookingsQuery),
    responses(
        (status = 200, description = "The caller's bookings, newest first", body = Vec<Booking>),
        (status = 400, description = "Unknown status"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "bookings"
)]
pub async fn get_my_bookings(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Query(query): Query<MyBookingsQuery>,
) -> AppResult<Json<Vec<Booking>>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<BookingStatus>)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let bookings = state
        .bookings
        .fetch_bookings_for_customer(&auth.user_id, status)
        .await?;

    Ok(Json(bookings))
}
