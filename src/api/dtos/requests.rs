use crate::domain::models::{money::Money, property::PROPERTY_TYPES, user::Role};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use validator::{Validate, ValidationError};

fn validate_property_type(kind: &str) -> Result<(), ValidationError> {
    if PROPERTY_TYPES.contains(&kind) {
        Ok(())
    } else {
        Err(ValidationError::new("property_type"))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePropertyRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(custom(function = "validate_property_type"))]
    pub property_type: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    pub nightly_rate: Money,
    #[validate(range(min = 1, max = 50))]
    pub max_guests: i32,
    #[validate(range(min = 0, max = 50))]
    #[serde(default = "default_bedrooms")]
    pub bedrooms: i32,
    #[serde(default)]
    pub amenities: String,
    pub check_in_time: Option<NaiveTime>,
    pub check_out_time: Option<NaiveTime>,
}

fn default_bedrooms() -> i32 {
    1
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePropertyRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_property_type"))]
    pub property_type: Option<String>,
    #[validate(length(min = 1))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub country: Option<String>,
    pub nightly_rate: Option<Money>,
    #[validate(range(min = 1, max = 50))]
    pub max_guests: Option<i32>,
    #[validate(range(min = 0, max = 50))]
    pub bedrooms: Option<i32>,
    pub amenities: Option<String>,
    pub check_in_time: Option<NaiveTime>,
    pub check_out_time: Option<NaiveTime>,
    pub is_active: Option<bool>,
}

/// Guest count and dates are checked by the booking rules so their errors land in the 422 body.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guest_count: i32,
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub special_requests: String,
}

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateNotesRequest {
    #[validate(length(max = 2000))]
    pub admin_notes: String,
}
