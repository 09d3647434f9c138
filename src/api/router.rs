use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{auth, booking, health, host, property};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))

        // Listings
        .route("/api/v1/properties", get(property::search_properties).post(property::create_property))
        .route("/api/v1/properties/{id}", get(property::get_property).put(property::update_property).delete(property::delete_property))
        .route("/api/v1/properties/{id}/quote", get(property::quote))

        // Guest
        .route("/api/v1/properties/{id}/bookings", post(booking::create_booking))
        .route("/api/v1/bookings", get(booking::list_my_bookings))

        // Host
        .route("/api/v1/host/properties", get(host::list_properties))
        .route("/api/v1/host/bookings", get(host::list_bookings))
        .route("/api/v1/host/dashboard", get(host::dashboard))
        .route("/api/v1/host/bookings/{id}/status", post(host::update_status))
        .route("/api/v1/host/bookings/{id}/notes", put(host::update_notes))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
