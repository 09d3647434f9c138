use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;
use tera::Tera;

use crate::config::Config;
use crate::error::AppError;
use crate::state::AppState;
use crate::domain::models::notification::NotificationEvent;
use crate::domain::ports::EmailService;
use crate::domain::services::auth_service::AuthService;
use crate::infra::email::http_email_service::HttpEmailService;
use crate::infra::repositories::{
    postgres_booking_repo::PostgresBookingRepo, postgres_job_repo::PostgresJobRepo,
    postgres_property_repo::PostgresPropertyRepo, postgres_user_repo::PostgresUserRepo,
    sqlite_booking_repo::SqliteBookingRepo, sqlite_job_repo::SqliteJobRepo,
    sqlite_property_repo::SqlitePropertyRepo, sqlite_user_repo::SqliteUserRepo,
};

const TEMPLATES: [(NotificationEvent, &str); 3] = [
    (NotificationEvent::NewBookingForHost, include_str!("../templates/new_booking_host.html")),
    (NotificationEvent::NewBookingForGuest, include_str!("../templates/new_booking_guest.html")),
    (NotificationEvent::StatusUpdateForGuest, include_str!("../templates/booking_status_update.html")),
];

/// Compiles the notification email templates, keyed by `NotificationEvent::template_name`.
pub fn load_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    for (event, source) in TEMPLATES {
        tera.add_raw_template(event.template_name(), source)
            .map_err(|e| AppError::InternalWithMsg(format!("Failed to load template {}: {:?}", event.template_name(), e)))?;
    }
    Ok(tera)
}

pub async fn bootstrap_state(config: &Config) -> Result<AppState, AppError> {
    let database_url = &config.database_url;
    let email_service = Arc::new(HttpEmailService::new(
        config.mail_service_url.clone(),
        config.mail_service_token.clone(),
    ));

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().map_err(AppError::Database)?;
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .map_err(AppError::Database)?;

        run_postgres_migrations(&pool).await?;
        build_postgres_state(config, pool, email_service)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .map_err(AppError::Database)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .map_err(AppError::Database)?;

        run_sqlite_migrations(&pool).await?;
        build_sqlite_state(config, pool, email_service)
    }
}

pub fn build_sqlite_state(config: &Config, pool: SqlitePool, email_service: Arc<dyn EmailService>) -> Result<AppState, AppError> {
    Ok(AppState {
        config: config.clone(),
        user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
        property_repo: Arc::new(SqlitePropertyRepo::new(pool.clone())),
        booking_repo: Arc::new(SqliteBookingRepo::new(pool.clone())),
        job_repo: Arc::new(SqliteJobRepo::new(pool)),
        auth_service: Arc::new(AuthService::new(config.clone())?),
        email_service,
        templates: Arc::new(load_templates()?),
    })
}

pub fn build_postgres_state(config: &Config, pool: PgPool, email_service: Arc<dyn EmailService>) -> Result<AppState, AppError> {
    Ok(AppState {
        config: config.clone(),
        user_repo: Arc::new(PostgresUserRepo::new(pool.clone())),
        property_repo: Arc::new(PostgresPropertyRepo::new(pool.clone())),
        booking_repo: Arc::new(PostgresBookingRepo::new(pool.clone())),
        job_repo: Arc::new(PostgresJobRepo::new(pool)),
        auth_service: Arc::new(AuthService::new(config.clone())?),
        email_service,
        templates: Arc::new(load_templates()?),
    })
}

pub async fn run_postgres_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .map_err(|e| AppError::InternalWithMsg(format!("Failed to run Postgres migrations: {}", e)))
}

pub async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .map_err(|e| AppError::InternalWithMsg(format!("Failed to run SQLite migrations: {}", e)))
}
