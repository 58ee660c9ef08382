use std::collections::BTreeMap;

use chrono::{Datelike, Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::status::BookingStatus;
use super::time::YearMonth;
use crate::models::Booking;

/// Per-status counts for an owner dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingAnalytics {
    pub total_bookings: usize,
    pub pending_bookings: usize,
    pub confirmed_bookings: usize,
    pub denied_bookings: usize,
    pub modified_bookings: usize,
    pub completed_bookings: usize,
    pub cancelled_bookings: usize,
    /// Requests created today, shop-local
    pub today_bookings: usize,
}

pub fn calculate_analytics(bookings: &[Booking], today: NaiveDate) -> BookingAnalytics {
    let mut analytics = BookingAnalytics {
        total_bookings: bookings.len(),
        ..Default::default()
    };

    for booking in bookings {
        let counter = match booking.status {
            BookingStatus::Pending => &mut analytics.pending_bookings,
            BookingStatus::Accepted => &mut analytics.confirmed_bookings,
            BookingStatus::Denied => &mut analytics.denied_bookings,
            BookingStatus::Modified => &mut analytics.modified_bookings,
            BookingStatus::Completed => &mut analytics.completed_bookings,
            BookingStatus::Cancelled => &mut analytics.cancelled_bookings,
        };
        *counter += 1;

        if booking.created_at.with_timezone(&Local).date_naive() == today {
            analytics.today_bookings += 1;
        }
    }

    analytics
}

/// Accepted bookings for `today` ordered by start time; unparsable times last
pub fn todays_accepted_bookings(bookings: &[Booking], today: NaiveDate) -> Vec<Booking> {
    let mut todays: Vec<Booking> = bookings
        .iter()
        .filter(|booking| booking.holds_date(today))
        .cloned()
        .collect();
    todays.sort_by_key(|booking| booking.start_minutes().unwrap_or(u32::MAX));
    todays
}

/// Accepted + pending requests per weekday of the current Monday-Sunday week
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct WeeklyBookingCounts {
    pub mon: usize,
    pub tue: usize,
    pub wed: usize,
    pub thu: usize,
    pub fri: usize,
    pub sat: usize,
    pub sun: usize,
}

pub fn weekly_booking_counts(bookings: &[Booking], today: NaiveDate) -> WeeklyBookingCounts {
    let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
    let mut counts = WeeklyBookingCounts::default();

    for booking in bookings {
        if !matches!(booking.status, BookingStatus::Accepted | BookingStatus::Pending) {
            continue;
        }
        let Some(date) = booking.date() else { continue };
        let offset = date.signed_duration_since(monday).num_days();
        let slot = match offset {
            0 => &mut counts.mon,
            1 => &mut counts.tue,
            2 => &mut counts.wed,
            3 => &mut counts.thu,
            4 => &mut counts.fri,
            5 => &mut counts.sat,
            6 => &mut counts.sun,
            _ => continue,
        };
        *slot += 1;
    }

    counts
}

/// Status dots for one day of the owner calendar
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DayIndicators {
    pub accepted: usize,
    pub pending: usize,
    pub denied: usize,
}

/// Indicators keyed by date for every day of `month` that has one
pub fn day_indicators(bookings: &[Booking], month: YearMonth) -> BTreeMap<NaiveDate, DayIndicators> {
    let mut indicators: BTreeMap<NaiveDate, DayIndicators> = BTreeMap::new();

    for booking in bookings {
        let Some(date) = booking.date().filter(|date| month.contains(*date)) else {
            continue;
        };
        let entry = indicators.entry(date).or_default();
        match booking.status {
            BookingStatus::Accepted => entry.accepted += 1,
            BookingStatus::Pending => entry.pending += 1,
            BookingStatus::Denied => entry.denied += 1,
            _ => {}
        }
    }

    indicators.retain(|_, day| day.accepted + day.pending + day.denied > 0);
    indicators
}
