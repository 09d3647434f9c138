use rental_backend::{
    domain::models::booking::{Booking, DateRange, NewBookingParams},
    domain::models::job::Job,
    domain::models::money::Money,
    domain::models::notification::NotificationEvent,
    domain::models::property::{NewPropertyParams, Property},
    domain::models::user::{Role, User},
    domain::ports::{BookingRepository, JobRepository, PropertyRepository, UserRepository},
    error::AppError,
    infra::factory::run_postgres_migrations,
    infra::repositories::{
        postgres_booking_repo::PostgresBookingRepo, postgres_job_repo::PostgresJobRepo,
        postgres_property_repo::PostgresPropertyRepo, postgres_user_repo::PostgresUserRepo,
    },
};
use chrono::{Duration, NaiveTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinSet;
use uuid::Uuid;

async fn postgres_pool() -> Option<PgPool> {
    let db_url = std::env::var("DATABASE_URL").unwrap_or_default();
    if !db_url.starts_with("postgres") {
        println!("Skipping concurrency test (not targeting Postgres)");
        return None;
    }

    let opts = PgConnectOptions::from_str(&db_url)
        .unwrap()
        .log_statements(tracing::log::LevelFilter::Debug);

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect_with(opts)
        .await
        .expect("Failed to connect to DB");

    run_postgres_migrations(&pool).await.expect("Failed to migrate");
    Some(pool)
}

async fn seed_property(pool: &PgPool) -> (User, Property) {
    let suffix = Uuid::new_v4().simple().to_string();
    let host = User::new(format!("host_{}", suffix), format!("host_{}@example.com", suffix), "x".into(), Role::Host);
    let host = PostgresUserRepo::new(pool.clone()).create(&host).await.unwrap();

    let property = Property::new(NewPropertyParams {
        owner_id: host.id.clone(),
        name: "Contested Loft".into(),
        description: String::new(),
        property_type: "apartment".into(),
        address: "1 Quay St".into(),
        city: "Lisbon".into(),
        country: "Portugal".into(),
        nightly_rate: Money::from_cents(10_000).unwrap(),
        max_guests: 4,
        bedrooms: 1,
        amenities: String::new(),
        check_in_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
        check_out_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
    });
    let property = PostgresPropertyRepo::new(pool.clone()).create(&property).await.unwrap();
    (host, property)
}

#[tokio::test]
async fn test_concurrent_overlapping_requests_book_once() {
    let Some(pool) = postgres_pool().await else { return };
    let (_, property) = seed_property(&pool).await;
    let users = PostgresUserRepo::new(pool.clone());
    let repo = Arc::new(PostgresBookingRepo::new(pool.clone()));

    let today = Utc::now().date_naive();
    let attempts = 10;
    let mut set = JoinSet::new();

    for i in 0..attempts {
        let suffix = Uuid::new_v4().simple().to_string();
        let guest = User::new(format!("guest_{}", suffix), format!("guest_{}@example.com", suffix), "x".into(), Role::Guest);
        let guest = users.create(&guest).await.unwrap();

        // Four-night stays starting on days 9, 10 or 11 all share night 11.
        let check_in = today + Duration::days(9 + (i % 3));
        let stay = DateRange::new(check_in, check_in + Duration::days(4)).unwrap();
        let booking = Booking::new(NewBookingParams {
            guest_id: guest.id,
            property_id: property.id.clone(),
            stay,
            guest_count: 1,
            total_price: Money::from_cents(40_000).unwrap(),
            special_requests: String::new(),
        });
        let jobs = Job::for_events(&[NotificationEvent::NewBookingForHost], &booking.id);

        let repo = repo.clone();
        set.spawn(async move { repo.create_if_available(&booking, jobs).await });
    }

    let mut created = Vec::new();
    let mut conflicts = 0;
    while let Some(res) = set.join_next().await {
        match res.unwrap() {
            Ok(booking) => created.push(booking),
            Err(AppError::Conflict(_)) => conflicts += 1,
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }

    assert_eq!(created.len(), 1, "Exactly one overlapping request may win");
    assert_eq!(conflicts, attempts as usize - 1);

    let winner = &created[0];
    let jobs = PostgresJobRepo::new(pool.clone()).list_for_booking(&winner.id).await.unwrap();
    assert_eq!(jobs.len(), 1);

    let stay = DateRange::new(today + Duration::days(8), today + Duration::days(16)).unwrap();
    let stored = repo.list_active_overlapping(&property.id, &stay).await.unwrap();
    assert_eq!(stored.len(), 1);
}
