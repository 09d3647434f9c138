#![allow(dead_code)]

use rental_backend::{
    api::router::create_router,
    background::run_pending_jobs,
    config::Config,
    domain::models::notification::OutgoingEmail,
    domain::ports::EmailService,
    error::AppError,
    infra::factory::build_sqlite_state,
    state::AppState,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use tower::ServiceExt;
use serde_json::{json, Value};

pub const PASSWORD: &str = "correct-horse-battery";

/// Records every message instead of calling the mail gateway.
#[derive(Default)]
pub struct MockEmailService {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub struct AuthHeaders {
    pub user_id: String,
    pub access_token: String,
    pub csrf_token: String,
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub mailer: Arc<MockEmailService>,
}

/// `YYYY-MM-DD` for today plus `days` (UTC).
pub fn day(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days)).format("%Y-%m-%d").to_string()
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            jwt_secret_key: priv_key_pem.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            frontend_url: "http://frontend.test".to_string(),
        };

        let mailer = Arc::new(MockEmailService::default());
        let state = Arc::new(
            build_sqlite_state(&config, pool.clone(), mailer.clone()).expect("Failed to build state"),
        );
        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            mailer,
        }
    }

    /// Drains the job queue the way the background worker would.
    pub async fn run_worker(&self) -> usize {
        let mut total = 0;
        loop {
            let claimed = run_pending_jobs(&self.state).await.expect("worker pass failed");
            if claimed == 0 {
                return total;
            }
            total += claimed;
        }
    }

    pub fn sent_emails(&self) -> Vec<OutgoingEmail> {
        self.mailer.sent.lock().unwrap().clone()
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        auth: Option<&AuthHeaders>,
        active_role: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(auth) = auth {
            builder = builder
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .header("X-CSRF-Token", &auth.csrf_token);
        }
        if let Some(role) = active_role {
            builder = builder.header("X-Active-Role", role);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn register(&self, username: &str, role: &str) -> (StatusCode, Value) {
        self.request("POST", "/api/v1/auth/register", None, None, Some(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": PASSWORD,
            "role": role,
        }))).await
    }

    pub async fn login(&self, username: &str, password: &str) -> AuthHeaders {
        let payload = json!({
            "username": username,
            "password": password
        });

        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap()
        ).await.unwrap();

        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }

        let cookies: Vec<String> = response.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|h| h.to_str().unwrap().to_string())
            .collect();

        let access_token_cookie = cookies.iter()
            .find(|c| c.contains("access_token="))
            .expect("No access_token cookie returned");

        let start = access_token_cookie.find("access_token=").unwrap() + 13;
        let end = access_token_cookie[start..].find(';').unwrap_or(access_token_cookie.len() - start);
        let access_token = access_token_cookie[start..start + end].to_string();

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body_json: Value = serde_json::from_slice(&body_bytes).unwrap();
        let csrf_token = body_json["csrf_token"].as_str().expect("No csrf_token in body").to_string();
        let user_id = body_json["user"]["id"].as_str().expect("No user id in body").to_string();

        AuthHeaders {
            user_id,
            access_token,
            csrf_token,
        }
    }

    /// Registers `username` with `role` and logs them in.
    pub async fn user(&self, username: &str, role: &str) -> AuthHeaders {
        let (status, body) = self.register(username, role).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        self.login(username, PASSWORD).await
    }

    /// Lists a property for `host` and returns its JSON. `overrides` replace default fields.
    pub async fn list_property(&self, host: &AuthHeaders, overrides: Value) -> Value {
        let mut payload = json!({
            "name": "Harbour Loft",
            "description": "Bright flat over the marina",
            "property_type": "apartment",
            "address": "1 Quay St",
            "city": "Lisbon",
            "country": "Portugal",
            "nightly_rate": "100.00",
            "max_guests": 4,
            "bedrooms": 2,
            "amenities": "wifi, kitchen",
        });
        if let (Some(base), Some(extra)) = (payload.as_object_mut(), overrides.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }

        let (status, body) = self.request("POST", "/api/v1/properties", Some(host), Some("host"), Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED, "create property failed: {}", body);
        body
    }

    pub async fn book(&self, guest: &AuthHeaders, property_id: &str, check_in: &str, check_out: &str, guests: i32) -> (StatusCode, Value) {
        self.request(
            "POST",
            &format!("/api/v1/properties/{}/bookings", property_id),
            Some(guest),
            Some("guest"),
            Some(json!({
                "check_in_date": check_in,
                "check_out_date": check_out,
                "guest_count": guests,
                "special_requests": "Late arrival",
            })),
        ).await
    }

    pub async fn set_status(&self, host: &AuthHeaders, booking_id: &str, status: &str) -> (StatusCode, Value) {
        self.request(
            "POST",
            &format!("/api/v1/host/bookings/{}/status", booking_id),
            Some(host),
            Some("host"),
            Some(json!({ "status": status })),
        ).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
