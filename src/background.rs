use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, info_span, Instrument};
use tera::{Context, Tera};
use crate::state::AppState;
use crate::error::AppError;
use crate::domain::models::booking::{Booking, BookingStatus};
use crate::domain::models::job::Job;
use crate::domain::models::notification::{EmailAttachment, NotificationEvent, OutgoingEmail, Recipient};
use crate::domain::models::property::Property;
use crate::domain::models::user::User;
use crate::domain::services::calendar::generate_ics;

const BATCH_SIZE: i32 = 10;
const POLL_INTERVAL: Duration = Duration::from_secs(5);

pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting notification worker...");

    loop {
        if let Err(e) = run_pending_jobs(&state).await {
            error!("Failed to fetch pending jobs: {:?}", e);
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Claims one batch of due jobs and processes each. Returns how many were claimed.
pub async fn run_pending_jobs(state: &Arc<AppState>) -> Result<usize, AppError> {
    let jobs = state.job_repo.find_pending(BATCH_SIZE).await?;
    let claimed = jobs.len();

    for job in jobs {
        let span = info_span!(
            "background_job",
            job_id = %job.id,
            job_type = %job.job_type,
            booking_id = %job.payload.booking_id
        );

        async {
            info!("Processing job");
            match process_job(state, &job).await {
                Ok(_) => {
                    info!("Job completed successfully");
                    if let Err(e) = state.job_repo.update_status(&job.id, "COMPLETED", None).await {
                        error!("Failed to mark job as completed: {:?}", e);
                    }
                }
                Err(e) => {
                    let err_msg = format!("{}", e);
                    error!("Job failed with error: {}", err_msg);
                    if let Err(up_err) = state.job_repo.update_status(&job.id, "FAILED", Some(err_msg)).await {
                        error!("Failed to mark job as failed: {:?}", up_err);
                    }
                }
            }
        }
            .instrument(span)
            .await;
    }

    Ok(claimed)
}

async fn process_job(state: &AppState, job: &Job) -> Result<(), AppError> {
    let event = NotificationEvent::from_job_type(&job.job_type)
        .ok_or_else(|| AppError::InternalWithMsg(format!("Unknown job type {}", job.job_type)))?;

    let booking_id = &job.payload.booking_id;
    let booking = state.booking_repo.find_by_id(booking_id).await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;
    let property = state.property_repo.find_by_id(&booking.property_id).await?
        .ok_or_else(|| AppError::NotFound(format!("Property {} not found", booking.property_id)))?;
    let guest = state.user_repo.find_by_id(&booking.guest_id).await?
        .ok_or_else(|| AppError::NotFound(format!("Guest {} not found", booking.guest_id)))?;
    let host = state.user_repo.find_by_id(&property.owner_id).await?
        .ok_or_else(|| AppError::NotFound(format!("Host {} not found", property.owner_id)))?;

    let email = compose_email(
        &state.templates,
        &state.config.frontend_url,
        event,
        &Parties { booking: &booking, property: &property, guest: &guest, host: &host },
    )?;

    info!(to = %email.to, subject = %email.subject, "Sending notification");
    state.email_service.send(&email).await
}

struct Parties<'a> {
    booking: &'a Booking,
    property: &'a Property,
    guest: &'a User,
    host: &'a User,
}

fn compose_email(templates: &Tera, frontend_url: &str, event: NotificationEvent, parties: &Parties<'_>) -> Result<OutgoingEmail, AppError> {
    let Parties { booking, property, guest, host } = *parties;

    let mut context = Context::new();
    context.insert("guest_name", &guest.username);
    context.insert("host_name", &host.username);
    context.insert("property_name", &property.name);
    context.insert("check_in", &booking.check_in_date.format("%Y-%m-%d").to_string());
    context.insert("check_out", &booking.check_out_date.format("%Y-%m-%d").to_string());
    context.insert("check_in_time", &property.check_in_time.format("%H:%M").to_string());
    context.insert("check_out_time", &property.check_out_time.format("%H:%M").to_string());
    context.insert("nights", &booking.nights());
    context.insert("guest_count", &booking.guest_count);
    context.insert("total_price", &booking.total_price.to_string());
    context.insert("special_requests", &booking.special_requests);
    context.insert("status", booking.status.as_str());
    context.insert("booking_link", &format!("{}/bookings/{}", frontend_url, booking.id));
    context.insert("dashboard_link", &format!("{}/host/bookings", frontend_url));

    let html_body = templates.render(event.template_name(), &context).map_err(|e| {
        error!("Tera render error: {:?}", e);
        AppError::InternalWithMsg(format!("Tera render error: {:?}", e))
    })?;

    let to = match event.recipient() {
        Recipient::Host => host.email.clone(),
        Recipient::Guest => guest.email.clone(),
    };

    let attachment = (event == NotificationEvent::StatusUpdateForGuest && booking.status == BookingStatus::Confirmed)
        .then(|| EmailAttachment {
            filename: "stay.ics".to_string(),
            content_type: "text/calendar".to_string(),
            data: generate_ics(property, booking).into_bytes(),
        });

    Ok(OutgoingEmail {
        to,
        subject: event.subject(&property.name),
        html_body,
        attachment,
    })
}
