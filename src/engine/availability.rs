use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::time::{format_clock_12h, format_clock_24h, parse_clock, OpeningWindow};
use crate::models::{Booking, ServiceProfile, ShopHours};

/// Shortest slot the calculator will step by
pub const MIN_SLOT_MINUTES: u32 = 5;

/// One bookable start time. Derived on every calculation, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    #[schema(example = "12:00 PM")]
    pub time: String,
    #[schema(example = "12:00")]
    pub time24: String,
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

impl TimeSlot {
    pub fn start_minutes(&self) -> Option<u32> {
        parse_clock(&self.time24).ok()
    }
}

/// Step length for a service duration, clamped to [`MIN_SLOT_MINUTES`]
pub fn slot_length(duration_minutes: i32) -> u32 {
    duration_minutes.max(MIN_SLOT_MINUTES as i32) as u32
}

/// Start times on `date` held by accepted bookings, in minutes since midnight
pub fn accepted_start_times(date: NaiveDate, bookings: &[Booking]) -> HashSet<u32> {
    bookings
        .iter()
        .filter(|booking| booking.holds_date(date))
        .filter_map(|booking| match booking.start_minutes() {
            Some(minutes) => Some(minutes),
            None => {
                tracing::warn!(
                    booking_id = %booking.id,
                    requested_time = %booking.requested_time,
                    "Ignoring accepted booking with unparsable time"
                );
                None
            }
        })
        .collect()
}

/// Generate the ordered slots for `date`.
///
/// Slots start at `open` and step by the (clamped) duration while the whole
/// slot fits before `close`. A slot is unavailable only when an `ACCEPTED`
/// booking sits on the same date and start time. An empty window yields no
/// slots.
pub fn compute_slots(
    date: NaiveDate,
    hours: &ShopHours,
    duration_minutes: i32,
    bookings: &[Booking],
) -> Vec<TimeSlot> {
    let window = OpeningWindow::from_hours(hours);
    let step = slot_length(duration_minutes);
    let taken = accepted_start_times(date, bookings);

    let mut slots = Vec::with_capacity((window.len_minutes() / step) as usize);
    let mut start = window.open;
    while start + step <= window.close {
        slots.push(TimeSlot {
            time: format_clock_12h(start),
            time24: format_clock_24h(start),
            is_available: !taken.contains(&start),
            price: None,
        });
        start += step;
    }

    slots
}

/// [`compute_slots`] with the service's display price attached to each slot
pub fn compute_slots_for_service(
    date: NaiveDate,
    hours: &ShopHours,
    service: &ServiceProfile,
    bookings: &[Booking],
) -> Vec<TimeSlot> {
    let mut slots = compute_slots(date, hours, service.duration_minutes, bookings);
    if let Some(price) = &service.price {
        for slot in &mut slots {
            slot.price = Some(price.clone());
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::booking;
    use crate::engine::{parse_date, BookingStatus};

    fn day() -> NaiveDate {
        parse_date("2024-06-10").unwrap()
    }

    fn times(slots: &[TimeSlot]) -> Vec<&str> {
        slots.iter().map(|s| s.time24.as_str()).collect()
    }

    #[test]
    fn hourly_slots_fit_inside_business_hours() {
        let slots = compute_slots(day(), &ShopHours::new("09:00", "18:00"), 60, &[]);

        assert_eq!(slots.len(), 9);
        assert_eq!(slots.first().unwrap().time24, "09:00");
        assert_eq!(slots.last().unwrap().time24, "17:00");
        assert_eq!(slots.last().unwrap().time, "5:00 PM");
        assert!(slots.iter().all(|s| s.is_available));
    }

    #[test]
    fn only_accepted_bookings_take_a_slot() {
        let hours = ShopHours::new("09:00", "18:00");
        let accepted = booking("2024-06-10", "10:00", BookingStatus::Accepted);
        let pending = booking("2024-06-10", "11:00", BookingStatus::Pending);
        let cancelled = booking("2024-06-10", "12:00", BookingStatus::Cancelled);
        let other_day = booking("2024-06-11", "13:00", BookingStatus::Accepted);

        let slots = compute_slots(day(), &hours, 60, &[accepted, pending, cancelled, other_day]);

        let unavailable: Vec<_> = slots
            .iter()
            .filter(|s| !s.is_available)
            .map(|s| s.time24.as_str())
            .collect();
        assert_eq!(unavailable, vec!["10:00"]);
    }

    #[test]
    fn pending_booking_leaves_slot_open() {
        let hours = ShopHours::new("09:00", "18:00");
        let pending = booking("2024-06-10", "10:00", BookingStatus::Pending);

        let slots = compute_slots(day(), &hours, 60, &[pending]);
        let ten = slots.iter().find(|s| s.time24 == "10:00").unwrap();

        assert!(ten.is_available);
    }

    #[test]
    fn degenerate_durations_are_clamped() {
        let hours = ShopHours::new("09:00", "10:00");

        assert_eq!(compute_slots(day(), &hours, 0, &[]).len(), 12);
        assert_eq!(compute_slots(day(), &hours, -30, &[]).len(), 12);
        assert_eq!(compute_slots(day(), &hours, 3, &[]).len(), 12);
    }

    #[test]
    fn empty_or_inverted_windows_yield_no_slots() {
        assert!(compute_slots(day(), &ShopHours::new("18:00", "09:00"), 60, &[]).is_empty());
        assert!(compute_slots(day(), &ShopHours::new("09:00", "09:00"), 60, &[]).is_empty());
        assert!(compute_slots(day(), &ShopHours::new("09:00", "09:30"), 60, &[]).is_empty());
    }

    #[test]
    fn end_of_day_close_allows_late_slots() {
        let slots = compute_slots(day(), &ShopHours::new("20:00", "24:00"), 90, &[]);
        assert_eq!(times(&slots), vec!["20:00", "21:30"]);
        assert_eq!(slots[1].time, "9:30 PM");
    }

    #[test]
    fn malformed_hours_fall_back_to_default_window() {
        let slots = compute_slots(day(), &ShopHours::new("", "closing"), 60, &[]);
        assert_eq!(slots.len(), 9);
        assert_eq!(slots[0].time24, "09:00");
    }

    #[test]
    fn accepted_booking_with_unpadded_time_still_blocks() {
        let hours = ShopHours::new("08:00", "12:00");
        let accepted = booking("2024-06-10", "9:00", BookingStatus::Accepted);
        let garbage = booking("2024-06-10", "soon", BookingStatus::Accepted);

        let slots = compute_slots(day(), &hours, 60, &[accepted, garbage]);

        assert_eq!(times(&slots), vec!["08:00", "09:00", "10:00", "11:00"]);
        assert!(!slots[1].is_available);
        assert_eq!(slots.iter().filter(|s| !s.is_available).count(), 1);
    }

    #[test]
    fn service_price_is_attached_to_every_slot() {
        let service = ServiceProfile {
            duration_minutes: 120,
            allows_multi_day_booking: false,
            price: Some("$40".to_string()),
        };

        let slots = compute_slots_for_service(day(), &ShopHours::new("08:00", "18:00"), &service, &[]);

        assert_eq!(times(&slots), vec!["08:00", "10:00", "12:00", "14:00", "16:00"]);
        assert!(slots.iter().all(|s| s.price.as_deref() == Some("$40")));
    }
}
