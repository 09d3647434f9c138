use crate::domain::models::booking::{Booking, DateRange};
use crate::domain::models::property::Property;

/// True when no active booking of `property` overlaps `stay`.
///
/// Bookings belonging to other properties or in an inactive status are ignored,
/// so callers may pass a superset of what storage returned.
pub fn is_available(property: &Property, stay: &DateRange, existing_bookings: &[Booking]) -> bool {
    !existing_bookings.iter().any(|b| {
        b.property_id == property.id && b.status.is_active() && b.overlaps(stay)
    })
}
