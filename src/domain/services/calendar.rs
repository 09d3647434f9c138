use crate::domain::models::{booking::Booking, property::Property};
use icalendar::{Calendar, Component, Event as IcalEvent, EventLike};

/// Generates an iCalendar (.ics) string for a stay. All-day event; the
/// check-out date is the exclusive end, matching how stays are booked.
pub fn generate_ics(property: &Property, booking: &Booking) -> String {
    let mut calendar = Calendar::new();

    let ical_event = IcalEvent::new()
        .summary(&format!("Stay at {}", property.name))
        .description(&format!(
            "Check-in from {}, check-out by {}. Guests: {}.",
            property.check_in_time.format("%H:%M"),
            property.check_out_time.format("%H:%M"),
            booking.guest_count
        ))
        .location(&format!("{}, {}, {}", property.address, property.city, property.country))
        .starts(booking.check_in_date)
        .ends(booking.check_out_date)
        .uid(&booking.id)
        .done();

    calendar.push(ical_event);
    calendar.to_string()
}
