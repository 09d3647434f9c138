use crate::domain::models::{
    booking::{Booking, BookingStatus, DateRange}, job::Job, notification::OutgoingEmail, property::{Property, PropertySearch},
    user::User,
};
use crate::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn create(&self, property: &Property) -> Result<Property, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Property>, AppError>;
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Property>, AppError>;
    /// Active properties matching `filter`; a requested stay excludes properties with an overlapping active booking.
    async fn search(&self, filter: &PropertySearch) -> Result<Vec<Property>, AppError>;
    async fn update(&self, property: &Property) -> Result<Property, AppError>;
    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Re-checks availability and inserts the booking with its jobs atomically.
    /// Fails with `AppError::Conflict` when an active booking now overlaps.
    async fn create_if_available(&self, booking: &Booking, jobs: Vec<Job>) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn list_active_overlapping(&self, property_id: &str, stay: &DateRange) -> Result<Vec<Booking>, AppError>;
    async fn list_by_guest(&self, guest_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn list_by_host(&self, owner_id: &str) -> Result<Vec<Booking>, AppError>;
    /// Compare-and-set on status so concurrent host actions cannot both apply.
    async fn update_status(&self, booking: &Booking, from: BookingStatus, jobs: Vec<Job>) -> Result<Booking, AppError>;
    async fn update_notes(&self, id: &str, admin_notes: &str) -> Result<Booking, AppError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn find_pending(&self, limit: i32) -> Result<Vec<Job>, AppError>;
    async fn list_for_booking(&self, booking_id: &str) -> Result<Vec<Job>, AppError>;
    async fn update_status(&self, id: &str, status: &str, error_message: Option<String>) -> Result<(), AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), AppError>;
}
