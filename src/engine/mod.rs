//! Booking availability and scheduling.
//!
//! Everything here is synchronous and free of I/O except
//! [`BookingSubmitter::submit`] and [`lifecycle::change_status`], which
//! write through a [`crate::store::BookingStore`].

pub mod analytics;
pub mod availability;
pub mod calendar;
pub mod error;
pub mod lifecycle;
pub mod selection;
pub mod status;
pub mod submit;
pub mod time;

pub use analytics::{
    calculate_analytics, day_indicators, todays_accepted_bookings, weekly_booking_counts,
    BookingAnalytics, DayIndicators, WeeklyBookingCounts,
};
pub use availability::{compute_slots, compute_slots_for_service, slot_length, TimeSlot, MIN_SLOT_MINUTES};
pub use calendar::{build_month, is_date_blocked, is_range_blocked, CalendarDay, GRID_CELLS};
pub use error::BookingError;
pub use selection::{Selection, SelectionState};
pub use status::{Actor, BookingStatus};
pub use submit::{validate_selection, BookingRequest, BookingSubmitter, Customer, SubmittedBooking, ValidatedSelection};
pub use time::{
    close_offset_minutes, format_clock_12h, format_clock_24h, format_date, parse_clock, parse_date,
    FormatError, OpeningWindow, YearMonth,
};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{TimeZone, Utc};

    use super::BookingStatus;
    use crate::models::{Booking, Service, ServiceProfile, Shop, ShopHours};

    pub fn booking(date: &str, time: &str, status: BookingStatus) -> Booking {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Booking {
            id: uuid::Uuid::new_v4().to_string(),
            shop_id: "shop-1".to_string(),
            service_id: "service-1".to_string(),
            customer_id: "customer-1".to_string(),
            shop_owner_id: "owner-1".to_string(),
            service_name: "Haircut".to_string(),
            shop_name: "Corner Barber".to_string(),
            customer_name: "Ada".to_string(),
            customer_email: "ada@example.com".to_string(),
            requested_date: date.to_string(),
            requested_time: time.to_string(),
            requested_end_date: None,
            status,
            notes: String::new(),
            response_message: String::new(),
            created_at: created,
            updated_at: created,
        }
    }

    pub fn sample_shop(open: &str, close: &str) -> Shop {
        Shop {
            id: "shop-1".to_string(),
            owner_id: "owner-1".to_string(),
            name: "Corner Barber".to_string(),
            hours: ShopHours::new(open, close),
        }
    }

    pub fn sample_service(shop: &Shop, duration_minutes: i32, allows_multi_day_booking: bool) -> Service {
        Service {
            id: "service-1".to_string(),
            shop_id: shop.id.clone(),
            name: "Haircut".to_string(),
            profile: ServiceProfile {
                duration_minutes,
                allows_multi_day_booking,
                price: None,
            },
        }
    }
}
