use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;

use super::GeofenceStateStore;
use crate::models::ContainmentStatus;
use crate::utils::errors::AppError;

/// Tabla vehicle_geofence_state: una fila por (vehículo, geocerca)
pub struct StateRepository {
    pool: PgPool,
}

impl StateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GeofenceStateStore for StateRepository {
    async fn get_status(&self, vehicle_id: &str, geofence_id: &str) -> Result<Option<ContainmentStatus>, AppError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT status FROM vehicle_geofence_state WHERE vehicle_id = $1 AND geofence_id = $2",
        )
        .bind(vehicle_id)
        .bind(geofence_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(|(status,)| {
            let parsed = ContainmentStatus::parse(&status);
            if parsed.is_none() {
                warn!("⚠️ Estado desconocido '{}' para {}/{}", status, vehicle_id, geofence_id);
            }
            parsed
        }))
    }

    async fn upsert_status(
        &self,
        vehicle_id: &str,
        geofence_id: &str,
        status: ContainmentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO vehicle_geofence_state (vehicle_id, geofence_id, status, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (vehicle_id, geofence_id)
            DO UPDATE SET status = EXCLUDED.status, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(vehicle_id)
        .bind(geofence_id)
        .bind(status.as_str())
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
