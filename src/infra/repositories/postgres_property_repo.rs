use crate::domain::{models::property::{Property, PropertySearch}, ports::PropertyRepository};
use crate::error::AppError;
use crate::infra::repositories::active_status_list;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

pub struct PostgresPropertyRepo {
    pool: PgPool,
}

impl PostgresPropertyRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PropertyRepository for PostgresPropertyRepo {
    async fn create(&self, property: &Property) -> Result<Property, AppError> {
        sqlx::query_as::<_, Property>(
            "INSERT INTO properties (id, owner_id, name, description, property_type, address, city, country, nightly_rate_cents, max_guests, bedrooms, amenities, check_in_time, check_out_time, is_active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
             RETURNING *"
        )
            .bind(&property.id).bind(&property.owner_id).bind(&property.name).bind(&property.description)
            .bind(&property.property_type).bind(&property.address).bind(&property.city).bind(&property.country)
            .bind(property.nightly_rate.cents()).bind(property.max_guests).bind(property.bedrooms).bind(&property.amenities)
            .bind(property.check_in_time).bind(property.check_out_time).bind(property.is_active).bind(property.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Property>, AppError> {
        sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Property>, AppError> {
        sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE owner_id = $1 ORDER BY created_at DESC")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn search(&self, filter: &PropertySearch) -> Result<Vec<Property>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM properties WHERE is_active = TRUE");

        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!("%{}%", q);
            qb.push(" AND (name ILIKE ").push_bind(pattern.clone())
                .push(" OR description ILIKE ").push_bind(pattern.clone())
                .push(" OR city ILIKE ").push_bind(pattern.clone())
                .push(" OR country ILIKE ").push_bind(pattern)
                .push(")");
        }
        if let Some(kind) = filter.property_type.as_deref().filter(|k| !k.is_empty()) {
            qb.push(" AND property_type = ").push_bind(kind.to_string());
        }
        if let Some(min) = filter.min_price {
            qb.push(" AND nightly_rate_cents >= ").push_bind(min.cents());
        }
        if let Some(max) = filter.max_price {
            qb.push(" AND nightly_rate_cents <= ").push_bind(max.cents());
        }
        if let Some(guests) = filter.guests {
            qb.push(" AND max_guests >= ").push_bind(guests);
        }
        if let (Some(check_in), Some(check_out)) = (filter.check_in, filter.check_out)
            && check_in < check_out
        {
            qb.push(format!(
                " AND NOT EXISTS (SELECT 1 FROM bookings b WHERE b.property_id = properties.id AND b.status IN ({})",
                active_status_list()
            ));
            qb.push(" AND b.check_in_date < ").push_bind(check_out)
                .push(" AND b.check_out_date > ").push_bind(check_in)
                .push(")");
        }

        qb.push(" ORDER BY created_at DESC LIMIT ").push_bind(filter.limit())
            .push(" OFFSET ").push_bind(filter.offset());

        debug!("Property search: {}", qb.sql());
        qb.build_query_as::<Property>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, property: &Property) -> Result<Property, AppError> {
        sqlx::query_as::<_, Property>(
            "UPDATE properties SET name=$1, description=$2, property_type=$3, address=$4, city=$5, country=$6, nightly_rate_cents=$7, max_guests=$8, bedrooms=$9, amenities=$10, check_in_time=$11, check_out_time=$12, is_active=$13
             WHERE id=$14 AND owner_id=$15
             RETURNING *"
        )
            .bind(&property.name).bind(&property.description).bind(&property.property_type).bind(&property.address)
            .bind(&property.city).bind(&property.country).bind(property.nightly_rate.cents()).bind(property.max_guests)
            .bind(property.bedrooms).bind(&property.amenities).bind(property.check_in_time).bind(property.check_out_time)
            .bind(property.is_active)
            .bind(&property.id).bind(&property.owner_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Property not found".into()))
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Property not found".into()));
        }
        Ok(())
    }
}
