use async_trait::async_trait;
use sqlx::PgPool;

use super::LocationLog;
use crate::models::LocationUpdate;
use crate::utils::errors::AppError;
use crate::utils::ids::{prefixed_id, LOCATION_PREFIX};

pub struct LocationRepository {
    pool: PgPool,
}

impl LocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationLog for LocationRepository {
    async fn record_location(&self, update: &LocationUpdate) -> Result<String, AppError> {
        let id = prefixed_id(LOCATION_PREFIX);

        sqlx::query(
            r#"
            INSERT INTO locations (id, vehicle_id, latitude, longitude, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&id)
        .bind(&update.vehicle_id)
        .bind(update.latitude)
        .bind(update.longitude)
        .bind(update.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }
}
