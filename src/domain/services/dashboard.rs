use serde::Serialize;
use crate::domain::models::booking::{Booking, BookingStatus};
use crate::domain::models::money::Money;
use crate::domain::models::property::Property;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct BookingStats {
    pub total_bookings: usize,
    pub pending_bookings: usize,
    pub confirmed_bookings: usize,
    pub cancelled_bookings: usize,
    pub completed_bookings: usize,
    pub revenue: Money,
}

impl BookingStats {
    /// Revenue counts confirmed and completed stays only.
    pub fn from_bookings(bookings: &[Booking]) -> Self {
        let count = |status: BookingStatus| bookings.iter().filter(|b| b.status == status).count();

        Self {
            total_bookings: bookings.len(),
            pending_bookings: count(BookingStatus::Pending),
            confirmed_bookings: count(BookingStatus::Confirmed),
            cancelled_bookings: count(BookingStatus::Cancelled),
            completed_bookings: count(BookingStatus::Completed),
            revenue: bookings.iter()
                .filter(|b| matches!(b.status, BookingStatus::Confirmed | BookingStatus::Completed))
                .map(|b| b.total_price)
                .sum(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HostDashboard {
    pub total_properties: usize,
    pub active_properties: usize,
    #[serde(flatten)]
    pub bookings: BookingStats,
}

impl HostDashboard {
    pub fn new(properties: &[Property], bookings: &[Booking]) -> Self {
        Self {
            total_properties: properties.len(),
            active_properties: properties.iter().filter(|p| p.is_active).count(),
            bookings: BookingStats::from_bookings(bookings),
        }
    }
}
