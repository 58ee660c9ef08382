use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Operating hours in shop-local `HH:mm`; `close` may be `24:00`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShopHours {
    #[schema(example = "09:00")]
    pub open: String,
    #[schema(example = "18:00")]
    pub close: String,
}

impl ShopHours {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

/// Booking-relevant attributes of a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProfile {
    pub duration_minutes: i32,
    pub allows_multi_day_booking: bool,
    /// Display price attached to every generated slot, e.g. "$40"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub hours: ShopHours,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub shop_id: String,
    pub name: String,
    pub profile: ServiceProfile,
}
