use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use chrono::{NaiveTime, Utc};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::api::dtos::requests::{CreatePropertyRequest, QuoteQuery, UpdatePropertyRequest};
use crate::api::dtos::responses::{PropertyPage, QuoteResponse};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::booking::DateRange;
use crate::domain::models::property::{NewPropertyParams, Property, PropertySearch};
use crate::domain::services::booking_validator::{quote_stay, BookingRequest};
use crate::error::AppError;
use crate::state::AppState;

fn default_check_in_time() -> NaiveTime {
    NaiveTime::from_hms_opt(15, 0, 0).unwrap_or_default()
}

fn default_check_out_time() -> NaiveTime {
    NaiveTime::from_hms_opt(11, 0, 0).unwrap_or_default()
}

pub async fn search_properties(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<PropertySearch>,
) -> Result<impl IntoResponse, AppError> {
    let items = state.property_repo.search(&filter).await?;

    Ok(Json(PropertyPage {
        items,
        page: filter.page.unwrap_or(1).max(1),
        per_page: filter.limit(),
    }))
}

pub async fn get_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let property = state.property_repo.find_by_id(&id).await?
        .filter(|p| p.is_active)
        .ok_or(AppError::NotFound("Property not found".into()))?;

    Ok(Json(property))
}

pub async fn create_property(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<CreatePropertyRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_host()?;
    payload.validate()?;

    let property = Property::new(NewPropertyParams {
        owner_id: auth.user_id.clone(),
        name: payload.name,
        description: payload.description,
        property_type: payload.property_type,
        address: payload.address,
        city: payload.city,
        country: payload.country,
        nightly_rate: payload.nightly_rate,
        max_guests: payload.max_guests,
        bedrooms: payload.bedrooms,
        amenities: payload.amenities,
        check_in_time: payload.check_in_time.unwrap_or_else(default_check_in_time),
        check_out_time: payload.check_out_time.unwrap_or_else(default_check_out_time),
    });

    let created = state.property_repo.create(&property).await?;
    info!(property_id = %created.id, owner_id = %auth.user_id, "Property listed");

    Ok((StatusCode::CREATED, Json(created)))
}

/// Loads a property the caller may edit: acting as host and owning it.
async fn owned_property(state: &AppState, auth: &AuthUser, id: &str) -> Result<Property, AppError> {
    auth.require_host()?;

    let property = state.property_repo.find_by_id(id).await?
        .ok_or(AppError::NotFound("Property not found".into()))?;

    if !property.is_owned_by(&auth.user_id) {
        return Err(AppError::Forbidden("You do not own this property".into()));
    }
    Ok(property)
}

pub async fn update_property(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePropertyRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let mut property = owned_property(&state, &auth, &id).await?;

    if let Some(v) = payload.name {
        property.name = v;
    }
    if let Some(v) = payload.description {
        property.description = v;
    }
    if let Some(v) = payload.property_type {
        property.property_type = v;
    }
    if let Some(v) = payload.address {
        property.address = v;
    }
    if let Some(v) = payload.city {
        property.city = v;
    }
    if let Some(v) = payload.country {
        property.country = v;
    }
    if let Some(v) = payload.nightly_rate {
        property.nightly_rate = v;
    }
    if let Some(v) = payload.max_guests {
        property.max_guests = v;
    }
    if let Some(v) = payload.bedrooms {
        property.bedrooms = v;
    }
    if let Some(v) = payload.amenities {
        property.amenities = v;
    }
    if let Some(v) = payload.check_in_time {
        property.check_in_time = v;
    }
    if let Some(v) = payload.check_out_time {
        property.check_out_time = v;
    }
    if let Some(v) = payload.is_active {
        property.is_active = v;
    }

    let updated = state.property_repo.update(&property).await?;
    info!(property_id = %updated.id, is_active = updated.is_active, "Property updated");

    Ok(Json(updated))
}

pub async fn delete_property(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let property = owned_property(&state, &auth, &id).await?;
    state.property_repo.delete(&auth.user_id, &property.id).await?;

    info!(property_id = %property.id, "Property deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<QuoteQuery>,
) -> Result<impl IntoResponse, AppError> {
    let property = state.property_repo.find_by_id(&id).await?
        .filter(|p| p.is_active)
        .ok_or(AppError::NotFound("Property not found".into()))?;

    let active = match DateRange::new(query.check_in, query.check_out) {
        Ok(stay) => state.booking_repo.list_active_overlapping(&property.id, &stay).await?,
        Err(_) => Vec::new(),
    };

    let request = BookingRequest {
        check_in: query.check_in,
        check_out: query.check_out,
        guest_count: query.guests.unwrap_or(1),
        special_requests: String::new(),
    };
    let quote = quote_stay(&property, &request, Utc::now().date_naive(), &active)?;

    Ok(Json(QuoteResponse {
        available: quote.is_bookable(),
        nights: quote.nights,
        total_price: quote.total_price,
        errors: quote.errors,
    }))
}
