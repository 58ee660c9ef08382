//! Persistence collaborators the engine reads from and writes through.

pub mod cached;
pub mod live;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::engine::BookingStatus;
use crate::models::{Booking, NewBooking, Service, ServiceProfile, Shop, ShopHours};

pub use cached::CachedDirectory;
pub use live::LiveBookings;
pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    /// A write would break a uniqueness rule or raced another write
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// A stored record could not be read back into the model
    #[error("Stored record is invalid: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Snapshot access to a shop's bookings
#[async_trait]
pub trait BookingsSource: Send + Sync {
    async fn fetch_bookings_for_shop(&self, shop_id: &str) -> StoreResult<Vec<Booking>>;

    /// Fresh snapshots for `shop_id` as they change; drop the receiver to
    /// unsubscribe. Sources without change feeds return `None`.
    fn subscribe(&self, _shop_id: &str) -> Option<broadcast::Receiver<Vec<Booking>>> {
        None
    }
}

#[async_trait]
pub trait BookingStore: BookingsSource {
    /// Persist a new booking atomically and return its assigned id
    async fn create_booking(&self, booking: NewBooking) -> StoreResult<String>;

    async fn fetch_booking(&self, id: &str) -> StoreResult<Booking>;

    /// Move `id` from `expected` to `status`; `Conflict` when the stored
    /// status is no longer `expected` or the slot is already accepted.
    async fn update_booking_status(
        &self,
        id: &str,
        expected: BookingStatus,
        status: BookingStatus,
        response_message: Option<&str>,
    ) -> StoreResult<Booking>;

    /// Newest first
    async fn fetch_bookings_for_owner(&self, owner_id: &str) -> StoreResult<Vec<Booking>>;

    /// Newest first, optionally narrowed to one status
    async fn fetch_bookings_for_customer(
        &self,
        customer_id: &str,
        status: Option<BookingStatus>,
    ) -> StoreResult<Vec<Booking>>;
}

/// Read-only shop and service metadata
#[async_trait]
pub trait ShopDirectory: Send + Sync {
    async fn fetch_shop(&self, shop_id: &str) -> StoreResult<Shop>;

    async fn fetch_service(&self, service_id: &str) -> StoreResult<Service>;

    async fn fetch_shop_hours(&self, shop_id: &str) -> StoreResult<ShopHours> {
        Ok(self.fetch_shop(shop_id).await?.hours)
    }

    async fn fetch_service_profile(&self, service_id: &str) -> StoreResult<ServiceProfile> {
        Ok(self.fetch_service(service_id).await?.profile)
    }
}

/// Newest-first ordering shared by the list queries
pub(crate) fn sort_newest_first(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
