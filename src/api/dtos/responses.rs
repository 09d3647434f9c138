use crate::domain::models::{booking::Booking, money::Money, property::Property};
use crate::domain::services::booking_validator::ValidationErrors;
use crate::domain::services::dashboard::BookingStats;
use serde::Serialize;

#[derive(Serialize)]
pub struct PropertyPage {
    pub items: Vec<Property>,
    pub page: u32,
    pub per_page: i64,
}

#[derive(Serialize)]
pub struct QuoteResponse {
    pub available: bool,
    pub nights: i64,
    pub total_price: Option<Money>,
    pub errors: ValidationErrors,
}

#[derive(Serialize)]
pub struct HostBookingsResponse {
    pub bookings: Vec<Booking>,
    pub stats: BookingStats,
}
