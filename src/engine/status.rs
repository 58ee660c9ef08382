use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle of a booking record.
///
/// ```text
/// PENDING  -> ACCEPTED | DENIED | MODIFIED | CANCELLED
/// ACCEPTED -> COMPLETED | CANCELLED
/// DENIED, MODIFIED, COMPLETED, CANCELLED are terminal
/// ```
///
/// Only `ACCEPTED` holds a slot or a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Denied,
    Modified,
    Completed,
    Cancelled,
}

/// Who is issuing a status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    ShopOwner,
    Customer,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 6] = [
        BookingStatus::Pending,
        BookingStatus::Accepted,
        BookingStatus::Denied,
        BookingStatus::Modified,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Accepted => "ACCEPTED",
            BookingStatus::Denied => "DENIED",
            BookingStatus::Modified => "MODIFIED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    /// Whether a booking in this status removes its date/time from availability
    pub fn blocks_availability(&self) -> bool {
        matches!(self, BookingStatus::Accepted)
    }

    pub fn allowed_transitions(&self) -> &'static [BookingStatus] {
        match self {
            BookingStatus::Pending => &[
                BookingStatus::Accepted,
                BookingStatus::Denied,
                BookingStatus::Modified,
                BookingStatus::Cancelled,
            ],
            BookingStatus::Accepted => &[BookingStatus::Completed, BookingStatus::Cancelled],
            BookingStatus::Denied
            | BookingStatus::Modified
            | BookingStatus::Completed
            | BookingStatus::Cancelled => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Owners may issue any legal transition; customers may only cancel.
    pub fn can_be_issued_by(next: BookingStatus, actor: Actor) -> bool {
        match actor {
            Actor::ShopOwner => true,
            Actor::Customer => next == BookingStatus::Cancelled,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown booking status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}
