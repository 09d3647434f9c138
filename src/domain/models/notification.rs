use serde::Serialize;

/// Emails owed to a booking's parties. Produced by the booking rules and
/// turned into queued jobs by whoever persists the booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    NewBookingForHost,
    NewBookingForGuest,
    StatusUpdateForGuest,
}

/// A fully rendered email, ready for the mail gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachment: Option<EmailAttachment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Host,
    Guest,
}

impl NotificationEvent {
    pub fn job_type(&self) -> &'static str {
        match self {
            NotificationEvent::NewBookingForHost => "NEW_BOOKING_HOST",
            NotificationEvent::NewBookingForGuest => "NEW_BOOKING_GUEST",
            NotificationEvent::StatusUpdateForGuest => "BOOKING_STATUS_UPDATE",
        }
    }

    pub fn from_job_type(job_type: &str) -> Option<Self> {
        match job_type {
            "NEW_BOOKING_HOST" => Some(NotificationEvent::NewBookingForHost),
            "NEW_BOOKING_GUEST" => Some(NotificationEvent::NewBookingForGuest),
            "BOOKING_STATUS_UPDATE" => Some(NotificationEvent::StatusUpdateForGuest),
            _ => None,
        }
    }

    pub fn recipient(&self) -> Recipient {
        match self {
            NotificationEvent::NewBookingForHost => Recipient::Host,
            NotificationEvent::NewBookingForGuest | NotificationEvent::StatusUpdateForGuest => Recipient::Guest,
        }
    }

    pub fn template_name(&self) -> &'static str {
        match self {
            NotificationEvent::NewBookingForHost => "new_booking_host.html",
            NotificationEvent::NewBookingForGuest => "new_booking_guest.html",
            NotificationEvent::StatusUpdateForGuest => "booking_status_update.html",
        }
    }

    pub fn subject(&self, property_name: &str) -> String {
        match self {
            NotificationEvent::NewBookingForHost => format!("New Booking Request for {}", property_name),
            NotificationEvent::NewBookingForGuest => format!("Booking Request Submitted: {}", property_name),
            NotificationEvent::StatusUpdateForGuest => format!("Booking Update: {}", property_name),
        }
    }
}
