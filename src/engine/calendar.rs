use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::selection::Selection;
use super::time::{YearMonth, DAYS_PER_WEEK};
use crate::models::Booking;

/// Six full weeks, so the grid height never depends on the month
pub const GRID_CELLS: usize = 6 * DAYS_PER_WEEK as usize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub is_today: bool,
    pub is_selectable: bool,
    pub is_start_of_range: bool,
    pub is_end_of_range: bool,
    pub is_in_range: bool,
    pub is_blocked: bool,
}

/// Dates held by an accepted booking
fn accepted_dates(bookings: &[Booking]) -> HashSet<NaiveDate> {
    bookings
        .iter()
        .filter(|booking| booking.is_accepted())
        .filter_map(|booking| booking.date())
        .collect()
}

/// Past dates, and dates with an accepted booking, cannot be booked
pub fn is_date_blocked(date: NaiveDate, today: NaiveDate, bookings: &[Booking]) -> bool {
    date < today || bookings.iter().any(|booking| booking.holds_date(date))
}

/// Whether any day of the inclusive `[start, end]` span has an accepted
/// booking. An inverted span covers no days.
pub fn is_range_blocked(start: NaiveDate, end: NaiveDate, bookings: &[Booking]) -> bool {
    let held = accepted_dates(bookings);
    let mut day = start;
    while day <= end {
        if held.contains(&day) {
            return true;
        }
        day = match day.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    false
}

/// Build the 42-cell month grid for `month`.
///
/// Padding days from the neighbouring months are never selectable or
/// blocked. Range flags come from `selection` alone.
pub fn build_month(
    month: YearMonth,
    today: NaiveDate,
    selection: &Selection,
    bookings: &[Booking],
) -> Vec<CalendarDay> {
    let held = accepted_dates(bookings);

    (0..GRID_CELLS)
        .map(|index| {
            let date = month.cell_date(index);
            let is_current_month = month.contains(date);
            let is_blocked = is_current_month && (date < today || held.contains(&date));

            let mut day = CalendarDay {
                date,
                is_current_month,
                is_today: date == today,
                is_selectable: is_current_month && !is_blocked,
                is_start_of_range: false,
                is_end_of_range: false,
                is_in_range: false,
                is_blocked,
            };
            annotate_range(&mut day, selection);
            day
        })
        .collect()
}

fn annotate_range(day: &mut CalendarDay, selection: &Selection) {
    day.is_start_of_range = selection.start_date == Some(day.date);
    day.is_end_of_range = selection.end_date == Some(day.date);
    day.is_in_range = match (selection.start_date, selection.end_date) {
        (Some(start), Some(end)) => day.is_current_month && start < day.date && day.date < end,
        _ => false,
    };
}
