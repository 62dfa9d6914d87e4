use async_trait::async_trait;
use sqlx::PgPool;

use super::ViolationSink;
use crate::models::{AlertEvent, Violation};
use crate::utils::errors::AppError;
use crate::utils::ids::{prefixed_id, ALERT_HISTORY_PREFIX};

pub struct ViolationRepository {
    pool: PgPool,
}

impl ViolationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ViolationSink for ViolationRepository {
    async fn insert_violation(&self, violation: &Violation) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO violations (id, vehicle_id, geofence_id, event_type, latitude, longitude, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&violation.id)
        .bind(&violation.vehicle_id)
        .bind(&violation.geofence_id)
        .bind(violation.event_type.as_str())
        .bind(violation.latitude)
        .bind(violation.longitude)
        .bind(violation.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_alert_history(&self, event: &AlertEvent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO alert_history (id, geofence_id, vehicle_id, event_type, latitude, longitude, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(prefixed_id(ALERT_HISTORY_PREFIX))
        .bind(&event.geofence.geofence_id)
        .bind(&event.vehicle.vehicle_id)
        .bind(event.event_type.as_str())
        .bind(event.location.latitude)
        .bind(event.location.longitude)
        .bind(event.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
