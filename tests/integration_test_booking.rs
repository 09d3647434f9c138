mod common;

use axum::http::StatusCode;
use chrono::NaiveDate;
use common::{day, TestApp};
use rental_backend::{
    domain::models::booking::{Booking, DateRange, NewBookingParams},
    domain::models::money::Money,
    error::AppError,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::task::JoinSet;

fn messages(body: &Value) -> Vec<String> {
    body["errors"].as_array()
        .map(|errs| errs.iter().filter_map(|e| e["message"].as_str().map(String::from)).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_successful_booking_is_pending_and_priced() {
    let app = TestApp::new().await;
    let host = app.user("hank", "host").await;
    let guest = app.user("gina", "guest").await;
    let property = app.list_property(&host, json!({ "nightly_rate": "100.00" })).await;
    let property_id = property["id"].as_str().unwrap();

    let (status, body) = app.book(&guest, property_id, &day(10), &day(13), 2).await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["total_price"], "300.00");
    assert_eq!(body["guest_id"], guest.user_id.as_str());
    assert_eq!(body["admin_notes"], "");
    assert_eq!(body["special_requests"], "Late arrival");

    let jobs = app.state.job_repo.list_for_booking(body["id"].as_str().unwrap()).await.unwrap();
    let mut types: Vec<&str> = jobs.iter().map(|j| j.job_type.as_str()).collect();
    types.sort();
    assert_eq!(types, vec!["NEW_BOOKING_GUEST", "NEW_BOOKING_HOST"]);
}

#[tokio::test]
async fn test_capacity_violation_is_a_field_error() {
    let app = TestApp::new().await;
    let host = app.user("hank", "host").await;
    let guest = app.user("gina", "guest").await;
    let property = app.list_property(&host, json!({ "max_guests": 4 })).await;

    let (status, body) = app.book(&guest, property["id"].as_str().unwrap(), &day(10), &day(12), 5).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["field"], "guest_count");
    assert_eq!(body["errors"][0]["message"], "This property accommodates maximum 4 guests");
}

#[tokio::test]
async fn test_check_in_today_violates_lead_time() {
    let app = TestApp::new().await;
    let host = app.user("hank", "host").await;
    let guest = app.user("gina", "guest").await;
    let property = app.list_property(&host, json!({})).await;
    let property_id = property["id"].as_str().unwrap();

    let (status, body) = app.book(&guest, property_id, &day(0), &day(2), 1).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["field"], "check_in_date");
    assert_eq!(body["errors"][0]["message"], "Check-in must be at least 1 day in advance");

    let (status, _) = app.book(&guest, property_id, &day(1), &day(2), 1).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_zero_night_stay_is_rejected() {
    let app = TestApp::new().await;
    let host = app.user("hank", "host").await;
    let guest = app.user("gina", "guest").await;
    let property = app.list_property(&host, json!({})).await;

    let (status, body) = app.book(&guest, property["id"].as_str().unwrap(), &day(5), &day(5), 1).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(messages(&body), vec!["Check-out date must be after check-in date"]);
    assert!(body["errors"][0]["field"].is_null());
}

#[tokio::test]
async fn test_overlap_is_unavailable_but_back_to_back_is_fine() {
    let app = TestApp::new().await;
    let host = app.user("hank", "host").await;
    let first = app.user("gina", "guest").await;
    let second = app.user("gus", "guest").await;
    let property = app.list_property(&host, json!({})).await;
    let property_id = property["id"].as_str().unwrap();

    let (status, _) = app.book(&first, property_id, &day(10), &day(15), 2).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.book(&second, property_id, &day(14), &day(16), 2).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(messages(&body), vec!["These dates are not available"]);

    let (status, body) = app.book(&second, property_id, &day(15), &day(18), 2).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let (status, body) = app.book(&second, property_id, &day(7), &day(10), 2).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
}

#[tokio::test]
async fn test_cancelled_booking_frees_the_dates() {
    let app = TestApp::new().await;
    let host = app.user("hank", "host").await;
    let guest = app.user("gina", "guest").await;
    let property = app.list_property(&host, json!({})).await;
    let property_id = property["id"].as_str().unwrap();

    let (_, booking) = app.book(&guest, property_id, &day(20), &day(23), 2).await;
    let (status, _) = app.set_status(&host, booking["id"].as_str().unwrap(), "cancelled").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.book(&guest, property_id, &day(21), &day(22), 1).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
}

#[tokio::test]
async fn test_errors_accumulate() {
    let app = TestApp::new().await;
    let host = app.user("hank", "host").await;
    let guest = app.user("gina", "guest").await;
    let property = app.list_property(&host, json!({ "max_guests": 2 })).await;

    let (status, body) = app.book(&guest, property["id"].as_str().unwrap(), &day(-3), &day(-5), 9).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(messages(&body), vec![
        "Check-out date must be after check-in date".to_string(),
        "Check-in must be at least 1 day in advance".to_string(),
        "This property accommodates maximum 2 guests".to_string(),
    ]);
}

#[tokio::test]
async fn test_inactive_property_cannot_be_booked() {
    let app = TestApp::new().await;
    let host = app.user("hank", "host").await;
    let guest = app.user("gina", "guest").await;
    let property = app.list_property(&host, json!({})).await;
    let property_id = property["id"].as_str().unwrap();

    let (status, _) = app.request("PUT", &format!("/api/v1/properties/{}", property_id), Some(&host), Some("host"),
        Some(json!({ "is_active": false }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.book(&guest, property_id, &day(10), &day(12), 1).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(messages(&body), vec!["These dates are not available"]);
}

#[tokio::test]
async fn test_hosts_cannot_book_and_guests_see_own_bookings() {
    let app = TestApp::new().await;
    let host = app.user("hank", "host").await;
    let guest = app.user("gina", "guest").await;
    let other = app.user("gus", "guest").await;
    let property = app.list_property(&host, json!({})).await;
    let property_id = property["id"].as_str().unwrap();

    let (status, _) = app.request("POST", &format!("/api/v1/properties/{}/bookings", property_id), Some(&host), None,
        Some(json!({ "check_in_date": day(10), "check_out_date": day(12), "guest_count": 1 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.book(&guest, property_id, &day(10), &day(12), 1).await;
    app.book(&guest, property_id, &day(20), &day(22), 1).await;

    let (status, mine) = app.request("GET", "/api/v1/bookings", Some(&guest), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 2);

    let (_, theirs) = app.request("GET", "/api/v1/bookings", Some(&other), None, None).await;
    assert!(theirs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_booking_requires_login_and_csrf() {
    let app = TestApp::new().await;
    let host = app.user("hank", "host").await;
    let mut guest = app.user("gina", "guest").await;
    let property = app.list_property(&host, json!({})).await;
    let property_id = property["id"].as_str().unwrap();

    let body = json!({ "check_in_date": day(10), "check_out_date": day(12), "guest_count": 1 });
    let (status, _) = app.request("POST", &format!("/api/v1/properties/{}/bookings", property_id), None, None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    guest.csrf_token = "forged".into();
    let (status, _) = app.request("POST", &format!("/api/v1/properties/{}/bookings", property_id), Some(&guest), None, Some(body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_property_is_not_found() {
    let app = TestApp::new().await;
    let guest = app.user("gina", "guest").await;

    let (status, _) = app.book(&guest, "no-such-property", &day(10), &day(12), 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_quote_matches_booking_rules() {
    let app = TestApp::new().await;
    let host = app.user("hank", "host").await;
    let guest = app.user("gina", "guest").await;
    let property = app.list_property(&host, json!({ "nightly_rate": "85.50" })).await;
    let property_id = property["id"].as_str().unwrap();

    let uri = format!("/api/v1/properties/{}/quote?check_in={}&check_out={}&guests=2", property_id, day(30), day(34));
    let (status, quote) = app.request("GET", &uri, None, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["available"], true);
    assert_eq!(quote["nights"], 4);
    assert_eq!(quote["total_price"], "342.00");

    app.book(&guest, property_id, &day(31), &day(33), 1).await;

    let (_, quote) = app.request("GET", &uri, None, None, None).await;
    assert_eq!(quote["available"], false);
    assert!(quote["total_price"].is_null());
    assert_eq!(quote["errors"][0]["message"], "These dates are not available");
}

#[tokio::test]
async fn test_dates_beyond_year_9999_are_rejected_not_stored() {
    let app = TestApp::new().await;
    let host = app.user("hank", "host").await;
    let guest = app.user("gina", "guest").await;
    let property = app.list_property(&host, json!({})).await;
    let property_id = property["id"].as_str().unwrap();

    let (status, body) = app.book(&guest, property_id, &day(10), "+10000-01-01", 1).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);
    assert_eq!(body["errors"][0]["field"], "check_out_date");
    assert_eq!(body["errors"][0]["message"], "Enter a valid date.");

    let uri = format!("/api/v1/properties/{}/quote?check_in={}&check_out=%2B10000-01-01", property_id, day(10));
    let (status, quote) = app.request("GET", &uri, None, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["available"], false);
    assert!(quote["total_price"].is_null());

    let (_, mine) = app.request("GET", "/api/v1/bookings", Some(&guest), None, None).await;
    assert!(mine.as_array().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_overlapping_requests_create_one_booking() {
    let app = Arc::new(TestApp::new().await);
    let host = app.user("hank", "host").await;
    let guest = Arc::new(app.user("gina", "guest").await);
    let property = app.list_property(&host, json!({})).await;
    let property_id = property["id"].as_str().unwrap().to_string();

    let attempts = 8;
    let mut set = JoinSet::new();
    for _ in 0..attempts {
        let (app, guest, property_id) = (app.clone(), guest.clone(), property_id.clone());
        set.spawn(async move { app.book(&guest, &property_id, &day(10), &day(13), 2).await });
    }

    let mut created = 0;
    while let Some(res) = set.join_next().await {
        let (status, body) = res.unwrap();
        match status {
            StatusCode::CREATED => created += 1,
            // Losers either see the winner during validation or lose the insert itself.
            StatusCode::CONFLICT => assert_eq!(body["error"], "These dates are not available"),
            StatusCode::UNPROCESSABLE_ENTITY => assert_eq!(messages(&body), vec!["These dates are not available"]),
            other => panic!("unexpected status {}: {}", other, body),
        }
    }
    assert_eq!(created, 1);

    let (_, mine) = app.request("GET", "/api/v1/bookings", Some(&*guest), None, None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_storage_refuses_overlap_that_validation_missed() {
    let app = TestApp::new().await;
    let host = app.user("hank", "host").await;
    let guest = app.user("gina", "guest").await;
    let property = app.list_property(&host, json!({})).await;
    let property_id = property["id"].as_str().unwrap();

    let (status, _) = app.book(&guest, property_id, &day(10), &day(13), 2).await;
    assert_eq!(status, StatusCode::CREATED);

    // A candidate validated against a stale view of the calendar.
    let check_in = NaiveDate::parse_from_str(&day(12), "%Y-%m-%d").unwrap();
    let check_out = NaiveDate::parse_from_str(&day(14), "%Y-%m-%d").unwrap();
    let stale = Booking::new(NewBookingParams {
        guest_id: guest.user_id.clone(),
        property_id: property_id.to_string(),
        stay: DateRange::new(check_in, check_out).unwrap(),
        guest_count: 2,
        total_price: Money::from_cents(20_000).unwrap(),
        special_requests: String::new(),
    });

    let result = app.state.booking_repo.create_if_available(&stale, Vec::new()).await;
    match result {
        Err(AppError::Conflict(msg)) => assert_eq!(msg, "These dates are not available"),
        other => panic!("expected conflict, got {:?}", other),
    }
    assert!(app.state.booking_repo.find_by_id(&stale.id).await.unwrap().is_none());

    let (_, mine) = app.request("GET", "/api/v1/bookings", Some(&guest), None, None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
}
