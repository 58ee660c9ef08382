use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{BookingsSource, StoreResult};
use crate::models::Booking;

/// A bookings snapshot for one shop, kept fresh from the source's change feed
/// when it has one.
pub struct LiveBookings {
    snapshot: watch::Receiver<Vec<Booking>>,
    task: Option<JoinHandle<()>>,
}

impl LiveBookings {
    pub async fn attach(source: &dyn BookingsSource, shop_id: &str) -> StoreResult<Self> {
        // Subscribe first so a write between the two calls is not lost
        let feed = source.subscribe(shop_id);
        let initial = source.fetch_bookings_for_shop(shop_id).await?;
        let (sender, snapshot) = watch::channel(initial);

        let task = feed.map(|mut feed| {
            let shop_id = shop_id.to_string();
            tokio::spawn(async move {
                loop {
                    match feed.recv().await {
                        Ok(fresh) => {
                            if sender.send(fresh).is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::debug!(shop_id = %shop_id, skipped, "Live bookings feed lagged");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            })
        });

        if task.is_none() {
            tracing::debug!(shop_id, "Bookings source has no change feed, using a one-shot snapshot");
        }

        Ok(Self { snapshot, task })
    }

    pub fn snapshot(&self) -> Vec<Booking> {
        self.snapshot.borrow().clone()
    }

    pub fn is_live(&self) -> bool {
        self.task.is_some()
    }

    /// Wait for the next snapshot; `false` once the feed has ended
    pub async fn changed(&mut self) -> bool {
        self.snapshot.changed().await.is_ok()
    }
}

impl Drop for LiveBookings {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
