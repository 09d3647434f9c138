use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::api::dtos::requests::CreateBookingRequest;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::booking::DateRange;
use crate::domain::models::job::Job;
use crate::domain::services::booking_validator::{validate_and_price, BookingRequest};
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(property_id): Path<String>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_guest()?;
    payload.validate()?;

    let property = state.property_repo.find_by_id(&property_id).await?
        .ok_or(AppError::NotFound("Property not found".into()))?;

    // Bad ranges are reported by the rules below; there is nothing to look up for them.
    let active = match DateRange::new(payload.check_in_date, payload.check_out_date) {
        Ok(stay) => state.booking_repo.list_active_overlapping(&property.id, &stay).await?,
        Err(_) => Vec::new(),
    };

    let request = BookingRequest {
        check_in: payload.check_in_date,
        check_out: payload.check_out_date,
        guest_count: payload.guest_count,
        special_requests: payload.special_requests,
    };
    let candidate = validate_and_price(&property, &request, &auth.user_id, Utc::now().date_naive(), &active)?;

    let (booking, events) = candidate.into_booking();
    let jobs = Job::for_events(&events, &booking.id);
    let created = state.booking_repo.create_if_available(&booking, jobs).await?;

    info!(
        booking_id = %created.id,
        property_id = %created.property_id,
        nights = created.nights(),
        total_price = %created.total_price,
        "Booking requested"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_my_bookings(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    auth.require_guest()?;
    let bookings = state.booking_repo.list_by_guest(&auth.user_id).await?;
    Ok(Json(bookings))
}
