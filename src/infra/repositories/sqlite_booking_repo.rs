use crate::domain::{models::{booking::{Booking, BookingStatus, DateRange}, job::Job}, ports::BookingRepository};
use crate::domain::services::booking_validator::MSG_NOT_AVAILABLE;
use crate::error::AppError;
use crate::infra::repositories::active_status_list;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::warn;

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn insert_jobs(tx: &mut Transaction<'_, Sqlite>, jobs: &[Job]) -> Result<(), AppError> {
    for job in jobs {
        sqlx::query("INSERT INTO jobs (id, job_type, payload, execute_at, status, error_message, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)")
            .bind(&job.id).bind(&job.job_type).bind(&job.payload).bind(job.execute_at)
            .bind(&job.status).bind(&job.error_message).bind(job.created_at)
            .execute(&mut **tx).await.map_err(AppError::Database)?;
    }
    Ok(())
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create_if_available(&self, booking: &Booking, jobs: Vec<Job>) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Overlap check and insert are one statement.
        let sql = format!(
            "INSERT INTO bookings (id, guest_id, property_id, check_in_date, check_out_date, guest_count, total_price_cents, status, special_requests, admin_notes, created_at, updated_at)
             SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
             WHERE NOT EXISTS (
                 SELECT 1 FROM bookings
                 WHERE property_id = ? AND status IN ({}) AND check_in_date < ? AND check_out_date > ?
             )
             RETURNING *",
            active_status_list()
        );

        let created = sqlx::query_as::<_, Booking>(&sql)
            .bind(&booking.id).bind(&booking.guest_id).bind(&booking.property_id)
            .bind(booking.check_in_date).bind(booking.check_out_date).bind(booking.guest_count)
            .bind(booking.total_price.cents()).bind(booking.status.as_str())
            .bind(&booking.special_requests).bind(&booking.admin_notes)
            .bind(booking.created_at).bind(booking.updated_at)
            .bind(&booking.property_id).bind(booking.check_out_date).bind(booking.check_in_date)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        let Some(created) = created else {
            warn!(property_id = %booking.property_id, "Booking lost availability race");
            return Err(AppError::Conflict(MSG_NOT_AVAILABLE.to_string()));
        };

        insert_jobs(&mut tx, &jobs).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_active_overlapping(&self, property_id: &str, stay: &DateRange) -> Result<Vec<Booking>, AppError> {
        let sql = format!(
            "SELECT * FROM bookings WHERE property_id = ? AND status IN ({}) AND check_in_date < ? AND check_out_date > ?",
            active_status_list()
        );
        sqlx::query_as::<_, Booking>(&sql)
            .bind(property_id).bind(stay.check_out()).bind(stay.check_in())
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_guest(&self, guest_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE guest_id = ? ORDER BY created_at DESC")
            .bind(guest_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_host(&self, owner_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT b.* FROM bookings b JOIN properties p ON p.id = b.property_id WHERE p.owner_id = ? ORDER BY b.created_at DESC"
        )
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update_status(&self, booking: &Booking, from: BookingStatus, jobs: Vec<Job>) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let updated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = ?, updated_at = ? WHERE id = ? AND status = ? RETURNING *"
        )
            .bind(booking.status.as_str()).bind(Utc::now()).bind(&booking.id).bind(from.as_str())
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::Conflict("Booking status was changed by another request".into()))?;

        insert_jobs(&mut tx, &jobs).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn update_notes(&self, id: &str, admin_notes: &str) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET admin_notes = ?, updated_at = ? WHERE id = ? RETURNING *")
            .bind(admin_notes).bind(Utc::now()).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Booking not found".into()))
    }
}
