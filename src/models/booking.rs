use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::engine::{parse_clock, parse_date, BookingStatus};

/// A persisted booking request.
///
/// `requested_date` and `requested_time` keep their stored `YYYY-MM-DD` /
/// `HH:mm` text so one malformed record cannot poison a whole snapshot;
/// use [`Booking::date`] and [`Booking::start_minutes`] to read them.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub shop_id: String,
    pub service_id: String,
    pub customer_id: String,
    pub shop_owner_id: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub shop_name: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    #[schema(example = "2024-06-10")]
    pub requested_date: String,
    #[schema(example = "12:00")]
    pub requested_time: String,
    /// Last day of a multi-day booking; informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_end_date: Option<String>,
    pub status: BookingStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub response_message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_accepted(&self) -> bool {
        self.status.blocks_availability()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        parse_date(&self.requested_date).ok()
    }

    pub fn start_minutes(&self) -> Option<u32> {
        parse_clock(&self.requested_time).ok()
    }

    /// Whether this booking holds `date` as an accepted booking
    pub fn holds_date(&self, date: NaiveDate) -> bool {
        self.is_accepted() && self.date() == Some(date)
    }
}

/// A booking as handed to persistence; id and timestamps are assigned there
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub shop_id: String,
    pub service_id: String,
    pub customer_id: String,
    pub shop_owner_id: String,
    pub service_name: String,
    pub shop_name: String,
    pub customer_name: String,
    pub customer_email: String,
    pub requested_date: String,
    pub requested_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_end_date: Option<String>,
    pub status: BookingStatus,
    pub notes: String,
}

impl NewBooking {
    /// Materialize the stored record once persistence has assigned an id
    pub fn into_booking(self, id: String, now: DateTime<Utc>) -> Booking {
        Booking {
            id,
            shop_id: self.shop_id,
            service_id: self.service_id,
            customer_id: self.customer_id,
            shop_owner_id: self.shop_owner_id,
            service_name: self.service_name,
            shop_name: self.shop_name,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            requested_date: self.requested_date,
            requested_time: self.requested_time,
            requested_end_date: self.requested_end_date,
            status: self.status,
            notes: self.notes,
            response_message: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
