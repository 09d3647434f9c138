use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveTime, Utc};
use sqlx::FromRow;
use crate::domain::models::money::Money;

pub const PROPERTY_TYPES: [&str; 4] = ["apartment", "house", "villa", "condo"];

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Property {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub property_type: String,
    pub address: String,
    pub city: String,
    pub country: String,
    #[sqlx(try_from = "i64", rename = "nightly_rate_cents")]
    pub nightly_rate: Money,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub amenities: String,
    pub check_in_time: NaiveTime,
    pub check_out_time: NaiveTime,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewPropertyParams {
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub property_type: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub nightly_rate: Money,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub amenities: String,
    pub check_in_time: NaiveTime,
    pub check_out_time: NaiveTime,
}

impl Property {
    pub fn new(params: NewPropertyParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: params.owner_id,
            name: params.name,
            description: params.description,
            property_type: params.property_type,
            address: params.address,
            city: params.city,
            country: params.country,
            nightly_rate: params.nightly_rate,
            max_guests: params.max_guests,
            bedrooms: params.bedrooms,
            amenities: params.amenities,
            check_in_time: params.check_in_time,
            check_out_time: params.check_out_time,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

/// Filters for the public property search. Every field is optional.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PropertySearch {
    pub q: Option<String>,
    pub property_type: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub guests: Option<i32>,
    pub check_in: Option<chrono::NaiveDate>,
    pub check_out: Option<chrono::NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PropertySearch {
    pub const DEFAULT_PER_PAGE: u32 = 6;
    pub const MAX_PER_PAGE: u32 = 50;

    pub fn limit(&self) -> i64 {
        self.per_page
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .clamp(1, Self::MAX_PER_PAGE) as i64
    }

    pub fn offset(&self) -> i64 {
        let page = self.page.unwrap_or(1).max(1) as i64;
        (page - 1) * self.limit()
    }
}
