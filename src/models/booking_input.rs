use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::engine::{
    BookingAnalytics, BookingStatus, CalendarDay, DayIndicators, Selection, SelectionState, TimeSlot,
    ValidatedSelection, WeeklyBookingCounts,
};

/// Input for submitting a booking request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingInput {
    pub selection: Selection,
    #[serde(default)]
    pub notes: String,
}

/// Input for moving a booking to a new status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusInput {
    pub status: BookingStatus,
    pub response_message: Option<String>,
}

/// Response after a booking write
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingMutationResponse {
    pub success: bool,
    pub booking_id: Option<String>,
    pub message: Option<String>,
}

/// One tap on the booking screen: either a calendar day or a time slot
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionTapInput {
    #[serde(default)]
    pub selection: Selection,
    pub date: Option<NaiveDate>,
    pub time_slot: Option<TimeSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub selection: Selection,
    pub state: SelectionState,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionValidateInput {
    pub selection: Selection,
}

/// Whether the submit button should be enabled, and why not
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionValidationResponse {
    pub can_submit: bool,
    pub reason: Option<String>,
    pub validated: Option<ValidatedSelection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarMonthResponse {
    #[schema(example = "2024-06")]
    pub month: String,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RangeCheckResponse {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub is_blocked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub analytics: BookingAnalytics,
    pub weekly: WeeklyBookingCounts,
}

/// Per-day owner calendar dots keyed by `YYYY-MM-DD`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorsResponse {
    #[schema(example = "2024-06")]
    pub month: String,
    pub days: BTreeMap<String, DayIndicators>,
}
