use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};

use super::{BookingStore, BookingsSource, ShopDirectory, StoreError, StoreResult};
use crate::engine::BookingStatus;
use crate::models::{Booking, NewBooking, Service, ServiceProfile, Shop, ShopHours};

const BOOKING_COLUMNS: &str = r#"
    id,
    shop_id,
    service_id,
    customer_id,
    shop_owner_id,
    service_name,
    shop_name,
    customer_name,
    customer_email,
    requested_date,
    requested_time,
    requested_end_date,
    status,
    notes,
    response_message,
    created_at,
    updated_at
"#;

const SLOT_TAKEN: &str = "An accepted booking already holds this slot";

#[derive(Debug, FromRow)]
struct BookingRow {
    id: String,
    shop_id: String,
    service_id: String,
    customer_id: String,
    shop_owner_id: String,
    service_name: String,
    shop_name: String,
    customer_name: String,
    customer_email: String,
    requested_date: String,
    requested_time: String,
    requested_end_date: Option<String>,
    status: String,
    notes: String,
    response_message: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status: BookingStatus = row
            .status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("booking {}: {}", row.id, e)))?;

        Ok(Booking {
            id: row.id,
            shop_id: row.shop_id,
            service_id: row.service_id,
            customer_id: row.customer_id,
            shop_owner_id: row.shop_owner_id,
            service_name: row.service_name,
            shop_name: row.shop_name,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            requested_date: row.requested_date,
            requested_time: row.requested_time,
            requested_end_date: row.requested_end_date,
            status,
            notes: row.notes,
            response_message: row.response_message,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Skip rows that cannot be read so one bad record doesn't hide a shop's
/// whole calendar
fn rows_to_bookings(rows: Vec<BookingRow>) -> Vec<Booking> {
    rows.into_iter()
        .filter_map(|row| match Booking::try_from(row) {
            Ok(booking) => Some(booking),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable booking row");
                None
            }
        })
        .collect()
}

#[derive(Debug, FromRow)]
struct ShopRow {
    id: String,
    owner_id: String,
    name: String,
    open_time24: String,
    close_time24: String,
}

#[derive(Debug, FromRow)]
struct ServiceRow {
    id: String,
    shop_id: String,
    name: String,
    duration_minutes: i32,
    allows_multi_day_booking: bool,
    price: Option<String>,
}

fn map_write_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(SLOT_TAKEN.to_string())
        }
        _ => StoreError::Database(e),
    }
}

/// PostgreSQL-backed store; the schema lives in `migrations/`
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(25)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_bookings_where(&self, filter: &str, key: &str) -> StoreResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE {} = $1 ORDER BY created_at DESC",
            BOOKING_COLUMNS, filter
        );

        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(key)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, filter, key, "Failed to fetch bookings");
                e
            })?;

        Ok(rows_to_bookings(rows))
    }
}

#[async_trait]
impl BookingsSource for PgStore {
    async fn fetch_bookings_for_shop(&self, shop_id: &str) -> StoreResult<Vec<Booking>> {
        let bookings = self.fetch_bookings_where("shop_id", shop_id).await?;
        tracing::debug!(shop_id, count = bookings.len(), "Fetched bookings snapshot");
        Ok(bookings)
    }
}

#[async_trait]
impl BookingStore for PgStore {
    async fn create_booking(&self, booking: NewBooking) -> StoreResult<String> {
        let id: String = sqlx::query_scalar(
            r#"
            INSERT INTO bookings (
                shop_id, service_id, customer_id, shop_owner_id,
                service_name, shop_name, customer_name, customer_email,
                requested_date, requested_time, requested_end_date,
                status, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(&booking.shop_id)
        .bind(&booking.service_id)
        .bind(&booking.customer_id)
        .bind(&booking.shop_owner_id)
        .bind(&booking.service_name)
        .bind(&booking.shop_name)
        .bind(&booking.customer_name)
        .bind(&booking.customer_email)
        .bind(&booking.requested_date)
        .bind(&booking.requested_time)
        .bind(&booking.requested_end_date)
        .bind(booking.status.as_str())
        .bind(&booking.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(id)
    }

    async fn fetch_booking(&self, id: &str) -> StoreResult<Booking> {
        let sql = format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS);

        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Booking {}", id)))?;

        Booking::try_from(row)
    }

    async fn update_booking_status(
        &self,
        id: &str,
        expected: BookingStatus,
        status: BookingStatus,
        response_message: Option<&str>,
    ) -> StoreResult<Booking> {
        let sql = format!(
            r#"
            UPDATE bookings
            SET status = $1,
                response_message = COALESCE($2, response_message),
                updated_at = NOW()
            WHERE id = $3 AND status = $4
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        );

        let updated = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(status.as_str())
            .bind(response_message)
            .bind(id)
            .bind(expected.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;

        match updated {
            Some(row) => Booking::try_from(row),
            None => {
                let exists: Option<String> =
                    sqlx::query_scalar(r#"SELECT status FROM bookings WHERE id = $1"#)
                        .bind(id)
                        .fetch_optional(&self.pool)
                        .await?;

                match exists {
                    Some(current) => {
                        tracing::warn!(id, expected = %expected, current = %current, "Stale booking status update");
                        Err(StoreError::Conflict(
                            "Booking was changed by someone else, reload and try again".to_string(),
                        ))
                    }
                    None => Err(StoreError::NotFound(format!("Booking {}", id))),
                }
            }
        }
    }

    async fn fetch_bookings_for_owner(&self, owner_id: &str) -> StoreResult<Vec<Booking>> {
        self.fetch_bookings_where("shop_owner_id", owner_id).await
    }

    async fn fetch_bookings_for_customer(
        &self,
        customer_id: &str,
        status: Option<BookingStatus>,
    ) -> StoreResult<Vec<Booking>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE customer_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
            BOOKING_COLUMNS
        );

        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(customer_id)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows_to_bookings(rows))
    }
}

#[async_trait]
impl ShopDirectory for PgStore {
    async fn fetch_shop(&self, shop_id: &str) -> StoreResult<Shop> {
        let row = sqlx::query_as::<_, ShopRow>(
            r#"SELECT id, owner_id, name, open_time24, close_time24 FROM shops WHERE id = $1"#,
        )
        .bind(shop_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Shop {}", shop_id)))?;

        Ok(Shop {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            hours: ShopHours::new(row.open_time24, row.close_time24),
        })
    }

    async fn fetch_service(&self, service_id: &str) -> StoreResult<Service> {
        let row = sqlx::query_as::<_, ServiceRow>(
            r#"
            SELECT id, shop_id, name, duration_minutes, allows_multi_day_booking, price
            FROM services
            WHERE id = $1
            "#,
        )
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Service {}", service_id)))?;

        Ok(Service {
            id: row.id,
            shop_id: row.shop_id,
            name: row.name,
            profile: ServiceProfile {
                duration_minutes: row.duration_minutes,
                allows_multi_day_booking: row.allows_multi_day_booking,
                price: row.price,
            },
        })
    }
}
