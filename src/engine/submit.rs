use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::availability::compute_slots;
use super::calendar::is_range_blocked;
use super::error::BookingError;
use super::selection::Selection;
use super::status::BookingStatus;
use super::time::{format_clock_24h, format_date, parse_clock, OpeningWindow};
use crate::clock::Clock;
use crate::models::{Booking, NewBooking, ServiceProfile, Service, Shop, ShopHours};
use crate::store::BookingStore;

pub const SLOT_TAKEN: &str = "This slot was just booked, please choose another";
pub const RANGE_TAKEN: &str = "Some of these dates were just booked, please choose others";
pub const DAY_TAKEN: &str = "This day was just booked, please choose another";

/// A selection that passed validation against a bookings snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedSelection {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// `HH:mm`; the shop's opening time for multi-day spans
    pub requested_time: String,
}

impl ValidatedSelection {
    pub fn is_multi_day(&self) -> bool {
        self.end_date > self.start_date
    }
}

/// Check that `selection` is complete and bookable against `bookings`.
///
/// Single-day selections need a time slot that the shop offers that day, on a
/// day no accepted booking holds. Multi-day selections need a service that
/// allows them and a span free of accepted bookings.
pub fn validate_selection(
    selection: &Selection,
    hours: &ShopHours,
    service: &ServiceProfile,
    bookings: &[Booking],
    today: NaiveDate,
) -> Result<ValidatedSelection, BookingError> {
    let (start, end) = selection
        .span()
        .ok_or_else(|| BookingError::Validation("Select a date to book".to_string()))?;

    if start < today {
        return Err(BookingError::Validation(
            "Bookings cannot start in the past".to_string(),
        ));
    }
    if end < start {
        return Err(BookingError::Validation(
            "The end date cannot be before the start date".to_string(),
        ));
    }

    if start == end {
        let slot = selection
            .time_slot
            .as_ref()
            .ok_or_else(|| BookingError::Validation("Select a time slot".to_string()))?;
        let minutes = parse_clock(&slot.time24)
            .map_err(|_| BookingError::Validation("Select a valid time slot".to_string()))?;

        let offered = compute_slots(start, hours, service.duration_minutes, bookings)
            .into_iter()
            .find(|candidate| candidate.start_minutes() == Some(minutes))
            .ok_or_else(|| {
                BookingError::Validation("The selected time is not offered on this day".to_string())
            })?;

        if !offered.is_available {
            return Err(BookingError::Conflict(SLOT_TAKEN.to_string()));
        }
        // An accepted booking at any time holds the whole day
        if is_range_blocked(start, start, bookings) {
            return Err(BookingError::Conflict(DAY_TAKEN.to_string()));
        }

        return Ok(ValidatedSelection {
            start_date: start,
            end_date: start,
            requested_time: offered.time24,
        });
    }

    if !service.allows_multi_day_booking {
        return Err(BookingError::Validation(
            "This service can only be booked for a single day".to_string(),
        ));
    }
    if is_range_blocked(start, end, bookings) {
        return Err(BookingError::Conflict(RANGE_TAKEN.to_string()));
    }

    Ok(ValidatedSelection {
        start_date: start,
        end_date: end,
        requested_time: format_clock_24h(OpeningWindow::from_hours(hours).open),
    })
}

/// Identity of the customer placing a booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
}

pub struct BookingRequest<'a> {
    pub shop: &'a Shop,
    pub service: &'a Service,
    pub selection: &'a Selection,
    pub customer: Option<&'a Customer>,
    pub notes: &'a str,
}

#[derive(Debug, Clone)]
pub struct SubmittedBooking {
    pub id: String,
    pub booking: NewBooking,
}

/// Build the pending record for a validated selection
pub fn build_booking(
    shop: &Shop,
    service: &Service,
    customer: &Customer,
    validated: &ValidatedSelection,
    notes: &str,
) -> NewBooking {
    NewBooking {
        shop_id: shop.id.clone(),
        service_id: service.id.clone(),
        customer_id: customer.id.clone(),
        shop_owner_id: shop.owner_id.clone(),
        service_name: service.name.clone(),
        shop_name: shop.name.clone(),
        customer_name: customer.name.clone(),
        customer_email: customer.email.clone(),
        requested_date: format_date(validated.start_date),
        requested_time: validated.requested_time.clone(),
        requested_end_date: validated
            .is_multi_day()
            .then(|| format_date(validated.end_date)),
        status: BookingStatus::Pending,
        notes: notes.trim().to_string(),
    }
}

/// Validates a selection against a fresh snapshot and writes one PENDING
/// booking through the store.
#[derive(Clone)]
pub struct BookingSubmitter {
    store: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
}

impl BookingSubmitter {
    pub fn new(store: Arc<dyn BookingStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn submit(&self, request: BookingRequest<'_>) -> Result<SubmittedBooking, BookingError> {
        let customer = request
            .customer
            .filter(|customer| !customer.id.trim().is_empty())
            .ok_or(BookingError::Unauthenticated)?;

        if request.service.shop_id != request.shop.id {
            return Err(BookingError::Validation(
                "This service is not offered by this shop".to_string(),
            ));
        }

        // Re-read so a slot booked since the caller's snapshot is caught here
        let snapshot = self.store.fetch_bookings_for_shop(&request.shop.id).await?;

        let validated = validate_selection(
            request.selection,
            &request.shop.hours,
            &request.service.profile,
            &snapshot,
            self.clock.today(),
        )?;

        let booking = build_booking(
            request.shop,
            request.service,
            customer,
            &validated,
            request.notes,
        );

        let id = self.store.create_booking(booking.clone()).await?;

        tracing::info!(
            booking_id = %id,
            shop_id = %booking.shop_id,
            customer_id = %booking.customer_id,
            requested_date = %booking.requested_date,
            requested_time = %booking.requested_time,
            "Booking request created"
        );

        Ok(SubmittedBooking { id, booking })
    }
}
