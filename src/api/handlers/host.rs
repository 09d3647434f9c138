use axum::{extract::{Path, State}, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::api::dtos::requests::{UpdateNotesRequest, UpdateStatusRequest};
use crate::api::dtos::responses::HostBookingsResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::booking::{Booking, BookingStatus};
use crate::domain::models::job::Job;
use crate::domain::services::dashboard::{BookingStats, HostDashboard};
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_properties(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    auth.require_host()?;
    let properties = state.property_repo.list_by_owner(&auth.user_id).await?;
    Ok(Json(properties))
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    auth.require_host()?;
    let bookings = state.booking_repo.list_by_host(&auth.user_id).await?;
    let stats = BookingStats::from_bookings(&bookings);
    Ok(Json(HostBookingsResponse { bookings, stats }))
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    auth.require_host()?;
    let properties = state.property_repo.list_by_owner(&auth.user_id).await?;
    let bookings = state.booking_repo.list_by_host(&auth.user_id).await?;
    Ok(Json(HostDashboard::new(&properties, &bookings)))
}

/// A booking on one of the caller's properties.
async fn hosted_booking(state: &AppState, auth: &AuthUser, booking_id: &str) -> Result<Booking, AppError> {
    auth.require_host()?;

    let booking = state.booking_repo.find_by_id(booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;
    let property = state.property_repo.find_by_id(&booking.property_id).await?
        .ok_or(AppError::NotFound("Property not found".into()))?;

    if !property.is_owned_by(&auth.user_id) {
        return Err(AppError::Forbidden("You do not host this booking".into()));
    }
    Ok(booking)
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(booking_id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let next: BookingStatus = payload.status.parse()?;
    let mut booking = hosted_booking(&state, &auth, &booking_id).await?;

    let (previous, events) = booking.change_status(next)?;
    let jobs = Job::for_events(&events, &booking.id);
    let updated = state.booking_repo.update_status(&booking, previous, jobs).await?;

    info!(booking_id = %updated.id, from = %previous, to = %updated.status, "Booking status changed");
    Ok(Json(updated))
}

pub async fn update_notes(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(booking_id): Path<String>,
    Json(payload): Json<UpdateNotesRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let booking = hosted_booking(&state, &auth, &booking_id).await?;

    let updated = state.booking_repo.update_notes(&booking.id, &payload.admin_notes).await?;
    Ok(Json(updated))
}
