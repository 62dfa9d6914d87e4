use async_trait::async_trait;
use sqlx::PgPool;

use super::VehicleDirectory;
use crate::models::VehicleSummary;
use crate::utils::errors::AppError;

#[derive(Debug, sqlx::FromRow)]
struct VehicleRow {
    id: String,
    vehicle_number: String,
    driver_name: String,
}

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleDirectory for VehicleRepository {
    async fn vehicle_summary(&self, vehicle_id: &str) -> Result<Option<VehicleSummary>, AppError> {
        let vehicle = sqlx::query_as::<_, VehicleRow>(
            "SELECT id, vehicle_number, driver_name FROM vehicles WHERE id = $1",
        )
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle.map(|v| VehicleSummary {
            vehicle_id: v.id,
            vehicle_number: v.vehicle_number,
            driver_name: v.driver_name,
        }))
    }
}
