//! Seguimiento de estado (vehículo, geocerca)
//!
//! Mapa persistente delgado: la ausencia de registro significa "fuera".

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::ContainmentStatus;
use crate::repositories::GeofenceStateStore;
use crate::utils::errors::AppError;

#[derive(Clone)]
pub struct StateTracker {
    store: Arc<dyn GeofenceStateStore>,
}

impl StateTracker {
    pub fn new(store: Arc<dyn GeofenceStateStore>) -> Self {
        Self { store }
    }

    pub async fn get_status(&self, vehicle_id: &str, geofence_id: &str) -> Result<ContainmentStatus, AppError> {
        Ok(self
            .store
            .get_status(vehicle_id, geofence_id)
            .await?
            .unwrap_or(ContainmentStatus::Outside))
    }

    /// Upsert idempotente, gana la última escritura
    pub async fn set_status(
        &self,
        vehicle_id: &str,
        geofence_id: &str,
        status: ContainmentStatus,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.store.upsert_status(vehicle_id, geofence_id, status, at).await
    }
}
