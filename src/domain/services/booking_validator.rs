use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use crate::domain::models::booking::{Booking, DateRange, NewBookingParams};
use crate::domain::models::money::{Money, MoneyError};
use crate::domain::models::notification::NotificationEvent;
use crate::domain::models::property::Property;
use crate::domain::services::availability::is_available;

pub const FIELD_CHECK_IN: &str = "check_in_date";
pub const FIELD_CHECK_OUT: &str = "check_out_date";
pub const FIELD_GUEST_COUNT: &str = "guest_count";

pub const MSG_INVALID_RANGE: &str = "Check-out date must be after check-in date";
pub const MSG_LEAD_TIME: &str = "Check-in must be at least 1 day in advance";
pub const MSG_NOT_AVAILABLE: &str = "These dates are not available";
pub const MSG_INVALID_DATE: &str = "Enter a valid date.";

/// Calendar years a stored date may use. Text columns only order correctly inside it.
const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

fn is_storable(date: NaiveDate) -> bool {
    STORABLE_YEARS.contains(&date.year())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// `None` for errors about the request as a whole.
    pub field: Option<&'static str>,
    pub message: String,
}

/// Ordered, accumulated validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError { field: Some(field), message: message.into() });
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self.0.iter().any(|e| e.field.is_none() && e.message == message) {
            self.0.push(FieldError { field: None, message });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == Some(field))
    }

    pub fn non_field(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter().filter(|e| e.field.is_none())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Booking request rejected: {0}")]
    Rejected(ValidationErrors),
    /// The caller handed over inconsistent data. Not a user mistake.
    #[error("Invalid booking input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guest_count: i32,
    pub special_requests: String,
}

/// A validated, priced stay that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingCandidate {
    pub guest_id: String,
    pub property_id: String,
    pub stay: DateRange,
    pub guest_count: i32,
    pub total_price: Money,
    pub special_requests: String,
    pub notifications: Vec<NotificationEvent>,
}

impl BookingCandidate {
    /// Assigns identity and timestamps. Status starts as pending with empty admin notes.
    pub fn into_booking(self) -> (Booking, Vec<NotificationEvent>) {
        let booking = Booking::new(NewBookingParams {
            guest_id: self.guest_id,
            property_id: self.property_id,
            stay: self.stay,
            guest_count: self.guest_count,
            total_price: self.total_price,
            special_requests: self.special_requests,
        });
        (booking, self.notifications)
    }
}

pub fn price_stay(property: &Property, stay: &DateRange) -> Result<Money, MoneyError> {
    property.nightly_rate.times(stay.nights())
}

/// Runs every booking rule against `request` and prices the stay when all pass.
///
/// `active_bookings` must belong to `property`; anything else is a caller bug.
pub fn validate_and_price(
    property: &Property,
    request: &BookingRequest,
    requester_id: &str,
    today: NaiveDate,
    active_bookings: &[Booking],
) -> Result<BookingCandidate, BookingError> {
    if requester_id.trim().is_empty() {
        return Err(BookingError::InvalidInput("requester id is empty".into()));
    }
    ensure_same_property(property, active_bookings)?;

    let (stay, total_price) = check_stay(property, request, today, active_bookings)
        .map_err(BookingError::Rejected)?;

    Ok(BookingCandidate {
        guest_id: requester_id.to_string(),
        property_id: property.id.clone(),
        stay,
        guest_count: request.guest_count,
        total_price,
        special_requests: request.special_requests.clone(),
        notifications: vec![
            NotificationEvent::NewBookingForHost,
            NotificationEvent::NewBookingForGuest,
        ],
    })
}

/// Outcome of a dry run of the booking rules, for showing a price before login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub nights: i64,
    pub total_price: Option<Money>,
    pub errors: ValidationErrors,
}

impl Quote {
    pub fn is_bookable(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn quote_stay(
    property: &Property,
    request: &BookingRequest,
    today: NaiveDate,
    active_bookings: &[Booking],
) -> Result<Quote, BookingError> {
    ensure_same_property(property, active_bookings)?;

    Ok(match check_stay(property, request, today, active_bookings) {
        Ok((stay, total_price)) => Quote {
            nights: stay.nights(),
            total_price: Some(total_price),
            errors: ValidationErrors::default(),
        },
        Err(errors) => Quote {
            nights: (request.check_out - request.check_in).num_days().max(0),
            total_price: None,
            errors,
        },
    })
}

fn ensure_same_property(property: &Property, active_bookings: &[Booking]) -> Result<(), BookingError> {
    match active_bookings.iter().find(|b| b.property_id != property.id) {
        Some(stray) => Err(BookingError::InvalidInput(format!(
            "booking {} belongs to property {}, not {}",
            stray.id, stray.property_id, property.id
        ))),
        None => Ok(()),
    }
}

fn check_stay(
    property: &Property,
    request: &BookingRequest,
    today: NaiveDate,
    active_bookings: &[Booking],
) -> Result<(DateRange, Money), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let stay = match DateRange::new(request.check_in, request.check_out) {
        Ok(stay) => Some(stay),
        Err(e) => {
            errors.add_non_field(e.to_string());
            None
        }
    };

    if !is_storable(request.check_in) {
        errors.add(FIELD_CHECK_IN, MSG_INVALID_DATE);
    }
    if !is_storable(request.check_out) {
        errors.add(FIELD_CHECK_OUT, MSG_INVALID_DATE);
    }

    if request.check_in <= today {
        errors.add(FIELD_CHECK_IN, MSG_LEAD_TIME);
    }

    if request.guest_count < 1 {
        errors.add(FIELD_GUEST_COUNT, "At least one guest is required");
    } else if request.guest_count > property.max_guests {
        errors.add(
            FIELD_GUEST_COUNT,
            format!("This property accommodates maximum {} guests", property.max_guests),
        );
    }

    if let Some(ref stay) = stay
        && !is_available(property, stay, active_bookings)
    {
        errors.add_non_field(MSG_NOT_AVAILABLE);
    }

    if !property.is_active {
        errors.add_non_field(MSG_NOT_AVAILABLE);
    }

    let stay = match stay {
        Some(stay) if errors.is_empty() => stay,
        _ => return Err(errors),
    };

    match price_stay(property, &stay) {
        Ok(total) => Ok((stay, total)),
        Err(e) => {
            errors.add_non_field(e.to_string());
            Err(errors)
        }
    }
}
