use crate::domain::models::booking::ACTIVE_STATUSES;

pub mod sqlite_booking_repo;
pub mod sqlite_job_repo;
pub mod sqlite_property_repo;
pub mod sqlite_user_repo;

pub mod postgres_booking_repo;
pub mod postgres_job_repo;
pub mod postgres_property_repo;
pub mod postgres_user_repo;

/// `'pending', 'confirmed', 'checked_in'` for use inside an SQL `IN (...)`.
pub(crate) fn active_status_list() -> String {
    ACTIVE_STATUSES
        .iter()
        .map(|s| format!("'{}'", s.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}
