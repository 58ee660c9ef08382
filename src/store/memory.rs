use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use super::{sort_newest_first, BookingStore, BookingsSource, ShopDirectory, StoreError, StoreResult};
use crate::engine::BookingStatus;
use crate::models::{Booking, NewBooking, Service, Shop};

const SNAPSHOT_CHANNEL_CAPACITY: usize = 16;

#[derive(Default)]
struct Records {
    bookings: Vec<Booking>,
    shops: HashMap<String, Shop>,
    services: HashMap<String, Service>,
}

/// Process-local store with a change feed per shop.
///
/// Enforces the same "one accepted booking per shop, date and time" rule
/// the database index does.
#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<Records>,
    feeds: Mutex<HashMap<String, broadcast::Sender<Vec<Booking>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_shop(&self, shop: Shop) {
        self.records.write().await.shops.insert(shop.id.clone(), shop);
    }

    pub async fn insert_service(&self, service: Service) {
        self.records
            .write()
            .await
            .services
            .insert(service.id.clone(), service);
    }

    /// Seed a complete record as-is
    pub async fn insert_booking(&self, booking: Booking) -> Booking {
        let shop_id = booking.shop_id.clone();
        self.records.write().await.bookings.push(booking.clone());
        self.publish(&shop_id).await;
        booking
    }

    async fn publish(&self, shop_id: &str) {
        let sender = {
            let mut feeds = self.feeds.lock().unwrap_or_else(PoisonError::into_inner);
            if feeds.get(shop_id).is_some_and(|sender| sender.receiver_count() == 0) {
                feeds.remove(shop_id);
            }
            feeds.get(shop_id).cloned()
        };

        let Some(sender) = sender else { return };
        let snapshot = shop_snapshot(&self.records.read().await.bookings, shop_id);
        // No live receivers is not an error
        let _ = sender.send(snapshot);
    }
}

fn shop_snapshot(bookings: &[Booking], shop_id: &str) -> Vec<Booking> {
    let mut snapshot: Vec<Booking> = bookings
        .iter()
        .filter(|booking| booking.shop_id == shop_id)
        .cloned()
        .collect();
    sort_newest_first(&mut snapshot);
    snapshot
}

fn slot_held_by_other(bookings: &[Booking], candidate: &Booking) -> bool {
    bookings.iter().any(|other| {
        other.id != candidate.id
            && other.status == BookingStatus::Accepted
            && other.shop_id == candidate.shop_id
            && other.requested_date == candidate.requested_date
            && other.requested_time == candidate.requested_time
    })
}

#[async_trait]
impl BookingsSource for InMemoryStore {
    async fn fetch_bookings_for_shop(&self, shop_id: &str) -> StoreResult<Vec<Booking>> {
        Ok(shop_snapshot(&self.records.read().await.bookings, shop_id))
    }

    fn subscribe(&self, shop_id: &str) -> Option<broadcast::Receiver<Vec<Booking>>> {
        let mut feeds = self.feeds.lock().unwrap_or_else(PoisonError::into_inner);
        let sender = feeds
            .entry(shop_id.to_string())
            .or_insert_with(|| broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY).0);
        Some(sender.subscribe())
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn create_booking(&self, booking: NewBooking) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        let record = booking.into_booking(id.clone(), Utc::now());
        let shop_id = record.shop_id.clone();

        {
            let mut records = self.records.write().await;
            if record.status == BookingStatus::Accepted && slot_held_by_other(&records.bookings, &record) {
                return Err(StoreError::Conflict(
                    "An accepted booking already holds this slot".to_string(),
                ));
            }
            records.bookings.push(record);
        }

        self.publish(&shop_id).await;
        Ok(id)
    }

    async fn fetch_booking(&self, id: &str) -> StoreResult<Booking> {
        self.records
            .read()
            .await
            .bookings
            .iter()
            .find(|booking| booking.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Booking {}", id)))
    }

    async fn update_booking_status(
        &self,
        id: &str,
        expected: BookingStatus,
        status: BookingStatus,
        response_message: Option<&str>,
    ) -> StoreResult<Booking> {
        let updated = {
            let mut records = self.records.write().await;
            let index = records
                .bookings
                .iter()
                .position(|booking| booking.id == id)
                .ok_or_else(|| StoreError::NotFound(format!("Booking {}", id)))?;

            if records.bookings[index].status != expected {
                return Err(StoreError::Conflict(
                    "Booking was changed by someone else, reload and try again".to_string(),
                ));
            }

            let mut candidate = records.bookings[index].clone();
            candidate.status = status;
            if status == BookingStatus::Accepted && slot_held_by_other(&records.bookings, &candidate) {
                return Err(StoreError::Conflict(
                    "An accepted booking already holds this slot".to_string(),
                ));
            }

            if let Some(message) = response_message {
                candidate.response_message = message.to_string();
            }
            candidate.updated_at = Utc::now();
            records.bookings[index] = candidate.clone();
            candidate
        };

        self.publish(&updated.shop_id).await;
        Ok(updated)
    }

    async fn fetch_bookings_for_owner(&self, owner_id: &str) -> StoreResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .records
            .read()
            .await
            .bookings
            .iter()
            .filter(|booking| booking.shop_owner_id == owner_id)
            .cloned()
            .collect();
        sort_newest_first(&mut bookings);
        Ok(bookings)
    }

    async fn fetch_bookings_for_customer(
        &self,
        customer_id: &str,
        status: Option<BookingStatus>,
    ) -> StoreResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .records
            .read()
            .await
            .bookings
            .iter()
            .filter(|booking| booking.customer_id == customer_id)
            .filter(|booking| status.map_or(true, |status| booking.status == status))
            .cloned()
            .collect();
        sort_newest_first(&mut bookings);
        Ok(bookings)
    }
}

#[async_trait]
impl ShopDirectory for InMemoryStore {
    async fn fetch_shop(&self, shop_id: &str) -> StoreResult<Shop> {
        self.records
            .read()
            .await
            .shops
            .get(shop_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Shop {}", shop_id)))
    }

    async fn fetch_service(&self, service_id: &str) -> StoreResult<Service> {
        self.records
            .read()
            .await
            .services
            .get(service_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Service {}", service_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{booking, sample_service, sample_shop};

    #[tokio::test]
    async fn lists_are_scoped_and_newest_first() {
        let store = InMemoryStore::new();
        let mut older = booking("2024-06-10", "10:00", BookingStatus::Pending);
        older.created_at -= chrono::Duration::hours(1);
        let newer = booking("2024-06-11", "10:00", BookingStatus::Accepted);
        let mut elsewhere = booking("2024-06-11", "10:00", BookingStatus::Pending);
        elsewhere.shop_id = "shop-2".to_string();
        elsewhere.customer_id = "customer-2".to_string();

        store.insert_booking(older.clone()).await;
        store.insert_booking(newer.clone()).await;
        store.insert_booking(elsewhere).await;

        let shop: Vec<_> = store
            .fetch_bookings_for_shop("shop-1")
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(shop, vec![newer.id.clone(), older.id.clone()]);

        let pending = store
            .fetch_bookings_for_customer("customer-1", Some(BookingStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, older.id);

        assert_eq!(store.fetch_bookings_for_owner("owner-1").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn stale_status_update_conflicts() {
        let store = InMemoryStore::new();
        let seeded = store
            .insert_booking(booking("2024-06-10", "10:00", BookingStatus::Pending))
            .await;

        store
            .update_booking_status(&seeded.id, BookingStatus::Pending, BookingStatus::Denied, None)
            .await
            .unwrap();
        let result = store
            .update_booking_status(&seeded.id, BookingStatus::Pending, BookingStatus::Accepted, None)
            .await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn subscribers_receive_fresh_snapshots() {
        let store = InMemoryStore::new();
        let mut feed = store.subscribe("shop-1").unwrap();

        store
            .insert_booking(booking("2024-06-10", "10:00", BookingStatus::Pending))
            .await;

        let snapshot = feed.recv().await.unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn abandoned_feeds_are_dropped_on_publish() {
        let store = InMemoryStore::new();
        let feed = store.subscribe("shop-1").unwrap();
        assert!(store.feeds.lock().unwrap().contains_key("shop-1"));

        drop(feed);
        store
            .insert_booking(booking("2024-06-10", "10:00", BookingStatus::Pending))
            .await;
        assert!(!store.feeds.lock().unwrap().contains_key("shop-1"));

        // A later subscriber gets a fresh channel
        let mut feed = store.subscribe("shop-1").unwrap();
        store
            .insert_booking(booking("2024-06-11", "10:00", BookingStatus::Pending))
            .await;
        assert_eq!(feed.recv().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn directory_lookups() {
        let store = InMemoryStore::new();
        let shop = sample_shop("08:00", "24:00");
        store.insert_shop(shop.clone()).await;
        store.insert_service(sample_service(&shop, 45, true)).await;

        assert_eq!(store.fetch_shop_hours("shop-1").await.unwrap().close, "24:00");
        assert_eq!(store.fetch_service_profile("service-1").await.unwrap().duration_minutes, 45);
        assert!(matches!(store.fetch_shop("missing").await, Err(StoreError::NotFound(_))));
    }
}
