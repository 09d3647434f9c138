use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::fmt;
use thiserror::Error;
use crate::domain::models::money::Money;
use crate::domain::models::notification::NotificationEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    CheckedIn,
    CheckedOut,
}

/// Statuses that occupy the calendar. Cancelled and finished stays never block a request.
pub const ACTIVE_STATUSES: [BookingStatus; 3] = [
    BookingStatus::Pending,
    BookingStatus::Confirmed,
    BookingStatus::CheckedIn,
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("Unknown booking status: {0}")]
    Unknown(String),
    #[error("Cannot change booking status from {from} to {to}")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::CheckedOut => "checked_out",
        }
    }

    pub fn is_active(&self) -> bool {
        ACTIVE_STATUSES.contains(self)
    }

    /// Host-driven lifecycle. Cancelled and completed are terminal.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, CheckedIn)
                | (Confirmed, Cancelled)
                | (CheckedIn, CheckedOut)
                | (CheckedOut, Completed)
        )
    }

    pub fn transition_to(&self, next: BookingStatus) -> Result<BookingStatus, StatusError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(StatusError::InvalidTransition { from: *self, to: next })
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            "checked_in" => Ok(BookingStatus::CheckedIn),
            "checked_out" => Ok(BookingStatus::CheckedOut),
            other => Err(StatusError::Unknown(other.to_string())),
        }
    }
}

impl TryFrom<String> for BookingStatus {
    type Error = StatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Check-out date must be after check-in date")]
pub struct DateRangeError;

/// Half-open stay `[check_in, check_out)`: the check-out day itself is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl DateRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, DateRangeError> {
        if check_out <= check_in {
            return Err(DateRangeError);
        }
        Ok(Self { check_in, check_out })
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    pub fn overlaps(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        self.check_in < check_out && self.check_out > check_in
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Booking {
    pub id: String,
    pub guest_id: String,
    pub property_id: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guest_count: i32,
    #[sqlx(try_from = "i64", rename = "total_price_cents")]
    pub total_price: Money,
    #[sqlx(try_from = "String")]
    pub status: BookingStatus,
    pub special_requests: String,
    pub admin_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub guest_id: String,
    pub property_id: String,
    pub stay: DateRange,
    pub guest_count: i32,
    pub total_price: Money,
    pub special_requests: String,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            guest_id: params.guest_id,
            property_id: params.property_id,
            check_in_date: params.stay.check_in(),
            check_out_date: params.stay.check_out(),
            guest_count: params.guest_count,
            total_price: params.total_price,
            status: BookingStatus::Pending,
            special_requests: params.special_requests,
            admin_notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn nights(&self) -> i64 {
        (self.check_out_date - self.check_in_date).num_days()
    }

    pub fn overlaps(&self, stay: &DateRange) -> bool {
        stay.overlaps(self.check_in_date, self.check_out_date)
    }

    /// Moves to `next` if the lifecycle allows it; the guest is told about every change.
    /// Returns the status the booking had before, for a compare-and-set write.
    pub fn change_status(&mut self, next: BookingStatus) -> Result<(BookingStatus, Vec<NotificationEvent>), StatusError> {
        let previous = self.status;
        self.status = previous.transition_to(next)?;
        self.updated_at = Utc::now();
        Ok((previous, vec![NotificationEvent::StatusUpdateForGuest]))
    }
}
