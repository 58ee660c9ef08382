use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use super::{ShopDirectory, StoreResult};
use crate::models::{Service, Shop};

/// Read-through TTL cache over a [`ShopDirectory`].
///
/// Only metadata is cached; bookings snapshots always go to the source.
pub struct CachedDirectory {
    inner: Arc<dyn ShopDirectory>,
    shops: Cache<String, Shop>,
    services: Cache<String, Service>,
}

impl CachedDirectory {
    pub fn new(inner: Arc<dyn ShopDirectory>, ttl: Duration) -> Self {
        Self {
            inner,
            shops: Cache::builder().time_to_live(ttl).max_capacity(10_000).build(),
            services: Cache::builder().time_to_live(ttl).max_capacity(10_000).build(),
        }
    }
}

#[async_trait]
impl ShopDirectory for CachedDirectory {
    async fn fetch_shop(&self, shop_id: &str) -> StoreResult<Shop> {
        if let Some(shop) = self.shops.get(shop_id).await {
            tracing::debug!(shop_id, "Shop resolved from cache");
            return Ok(shop);
        }

        let shop = self.inner.fetch_shop(shop_id).await?;
        self.shops.insert(shop_id.to_string(), shop.clone()).await;
        Ok(shop)
    }

    async fn fetch_service(&self, service_id: &str) -> StoreResult<Service> {
        if let Some(service) = self.services.get(service_id).await {
            tracing::debug!(service_id, "Service resolved from cache");
            return Ok(service);
        }

        let service = self.inner.fetch_service(service_id).await?;
        self.services
            .insert(service_id.to_string(), service.clone())
            .await;
        Ok(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::sample_shop;
    use crate::models::ShopHours;
    use crate::store::memory::InMemoryStore;

    #[tokio::test]
    async fn serves_repeat_lookups_from_cache() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_shop(sample_shop("09:00", "17:00")).await;
        let cached = CachedDirectory::new(store.clone(), Duration::from_secs(60));

        assert_eq!(cached.fetch_shop_hours("shop-1").await.unwrap().close, "17:00");

        // A later change is not visible until the entry expires
        let mut changed = sample_shop("09:00", "17:00");
        changed.hours = ShopHours::new("10:00", "20:00");
        store.insert_shop(changed).await;

        assert_eq!(cached.fetch_shop_hours("shop-1").await.unwrap().close, "17:00");
        assert!(cached.fetch_service("missing").await.is_err());
    }
}
