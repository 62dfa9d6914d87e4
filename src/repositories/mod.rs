//! Repositorios
//!
//! Contratos con la capa de persistencia externa. El motor de geocercas solo
//! conoce estos traits; las implementaciones PostgreSQL viven en los
//! submódulos y `memory` ofrece una versión en memoria para tests.

pub mod alert_config_repository;
pub mod geofence_repository;
pub mod location_repository;
pub mod memory;
pub mod state_repository;
pub mod vehicle_repository;
pub mod violation_repository;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{AlertConfig, AlertEvent, ContainmentStatus, Geofence, LocationUpdate, VehicleSummary, Violation};
use crate::utils::errors::AppError;

pub use alert_config_repository::AlertConfigRepository;
pub use geofence_repository::GeofenceRepository;
pub use location_repository::LocationRepository;
pub use memory::InMemoryStore;
pub use state_repository::StateRepository;
pub use vehicle_repository::VehicleRepository;
pub use violation_repository::ViolationRepository;

/// Geocercas cargadas para una evaluación
#[derive(Debug, Clone, Default)]
pub struct GeofenceSnapshot {
    /// Geocercas con polígono válido, activas o no
    pub geofences: Vec<Geofence>,
    /// Ids descartados por polígono o estado corrupto
    pub rejected: HashSet<String>,
}

#[async_trait]
pub trait GeofenceSource: Send + Sync {
    async fn load_geofences(&self) -> Result<GeofenceSnapshot, AppError>;
}

/// Fuente de reglas de alerta
#[async_trait]
pub trait AlertConfigSource: Send + Sync {
    /// Reglas activas globales o restringidas a este vehículo
    async fn active_configs_for_vehicle(&self, vehicle_id: &str) -> Result<Vec<AlertConfig>, AppError>;
}

/// Mapa persistente (vehículo, geocerca) → estado
#[async_trait]
pub trait GeofenceStateStore: Send + Sync {
    async fn get_status(&self, vehicle_id: &str, geofence_id: &str) -> Result<Option<ContainmentStatus>, AppError>;

    async fn upsert_status(
        &self,
        vehicle_id: &str,
        geofence_id: &str,
        status: ContainmentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError>;
}

/// Destino de violaciones y de la copia de auditoría de alertas
#[async_trait]
pub trait ViolationSink: Send + Sync {
    async fn insert_violation(&self, violation: &Violation) -> Result<(), AppError>;

    async fn insert_alert_history(&self, event: &AlertEvent) -> Result<(), AppError>;
}

#[async_trait]
pub trait VehicleDirectory: Send + Sync {
    async fn vehicle_summary(&self, vehicle_id: &str) -> Result<Option<VehicleSummary>, AppError>;
}

/// Historial de posiciones
#[async_trait]
pub trait LocationLog: Send + Sync {
    async fn record_location(&self, update: &LocationUpdate) -> Result<String, AppError>;
}
