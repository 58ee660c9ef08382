use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::availability::TimeSlot;

/// Where a [`Selection`] sits in the tap cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionState {
    Empty,
    StartSelected,
    RangeSelected,
}

/// The customer's in-progress choice of dates and time slot.
///
/// Owned by the caller and discarded to cancel a booking flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub time_slot: Option<TimeSlot>,
}

impl Selection {
    pub fn state(&self) -> SelectionState {
        match (self.start_date, self.end_date) {
            (None, _) => SelectionState::Empty,
            (Some(_), None) => SelectionState::StartSelected,
            (Some(_), Some(_)) => SelectionState::RangeSelected,
        }
    }

    /// Apply a date tap.
    ///
    /// Tapping the start again makes a single-day booking. A later date
    /// closes the range only when the service allows multi-day bookings;
    /// otherwise, like an earlier date, it becomes the new start. Any tap on
    /// a completed selection starts over.
    pub fn tap(&mut self, date: NaiveDate, allows_multi_day: bool) {
        match (self.state(), self.start_date) {
            (SelectionState::StartSelected, Some(start)) if date == start => {
                self.end_date = Some(start);
            }
            (SelectionState::StartSelected, Some(start)) if date > start && allows_multi_day => {
                self.end_date = Some(date);
                self.time_slot = None;
            }
            _ => self.restart(date),
        }
    }

    fn restart(&mut self, date: NaiveDate) {
        self.start_date = Some(date);
        self.end_date = None;
        self.time_slot = None;
    }

    /// Select `slot`, or clear it when it is already the selected one
    pub fn toggle_time_slot(&mut self, slot: TimeSlot) {
        if self.time_slot.as_ref() == Some(&slot) {
            self.time_slot = None;
        } else {
            self.time_slot = Some(slot);
        }
    }

    /// A start with no end, or an end equal to the start
    pub fn is_single_day(&self) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start == end,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    pub fn is_multi_day(&self) -> bool {
        self.start_date.is_some() && !self.is_single_day()
    }

    /// Inclusive date span covered by the selection
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.start_date?;
        Some((start, self.end_date.unwrap_or(start)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::parse_date;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn slot(time24: &str) -> TimeSlot {
        TimeSlot {
            time: time24.to_string(),
            time24: time24.to_string(),
            is_available: true,
            price: None,
        }
    }

    fn started(date: &str) -> Selection {
        let mut selection = Selection::default();
        selection.tap(d(date), true);
        selection
    }

    #[test]
    fn first_tap_sets_start() {
        let mut selection = Selection {
            time_slot: Some(slot("10:00")),
            ..Default::default()
        };
        selection.tap(d("2024-06-10"), false);

        assert_eq!(selection.state(), SelectionState::StartSelected);
        assert_eq!(selection.start_date, Some(d("2024-06-10")));
        assert_eq!(selection.end_date, None);
        assert_eq!(selection.time_slot, None);
    }

    #[test]
    fn same_date_collapses_to_single_day() {
        let mut selection = started("2024-06-10");
        selection.time_slot = Some(slot("12:00"));
        selection.tap(d("2024-06-10"), false);

        assert_eq!(selection.state(), SelectionState::RangeSelected);
        assert_eq!(selection.span(), Some((d("2024-06-10"), d("2024-06-10"))));
        assert!(selection.is_single_day());
        assert_eq!(selection.time_slot, Some(slot("12:00")));
    }

    #[test]
    fn later_date_closes_range_when_multi_day_allowed() {
        let mut selection = started("2024-06-10");
        selection.time_slot = Some(slot("12:00"));
        selection.tap(d("2024-06-14"), true);

        assert_eq!(selection.end_date, Some(d("2024-06-14")));
        assert!(selection.is_multi_day());
        assert_eq!(selection.time_slot, None);
    }

    #[test]
    fn later_date_restarts_when_multi_day_disallowed() {
        let mut selection = started("2024-06-10");
        selection.tap(d("2024-06-14"), false);

        assert_eq!(selection.start_date, Some(d("2024-06-14")));
        assert_eq!(selection.end_date, None);
    }

    #[test]
    fn earlier_date_becomes_new_start() {
        let mut selection = started("2024-06-10");
        selection.tap(d("2024-06-03"), true);

        assert_eq!(selection.start_date, Some(d("2024-06-03")));
        assert_eq!(selection.end_date, None);
    }

    #[test]
    fn tap_after_complete_selection_always_restarts() {
        for tap in ["2024-06-01", "2024-06-10", "2024-06-12", "2024-06-14", "2024-06-20"] {
            let mut selection = started("2024-06-10");
            selection.tap(d("2024-06-14"), true);
            assert_eq!(selection.state(), SelectionState::RangeSelected);

            selection.tap(d(tap), true);

            assert_eq!(selection.start_date, Some(d(tap)));
            assert_eq!(selection.end_date, None, "tap on {tap} must not extend the range");
            assert_eq!(selection.time_slot, None);
        }
    }

    #[test]
    fn toggling_the_same_slot_clears_it() {
        let mut selection = started("2024-06-10");

        selection.toggle_time_slot(slot("10:00"));
        assert_eq!(selection.time_slot, Some(slot("10:00")));

        selection.toggle_time_slot(slot("11:00"));
        assert_eq!(selection.time_slot, Some(slot("11:00")));

        selection.toggle_time_slot(slot("11:00"));
        assert_eq!(selection.time_slot, None);
    }
}
