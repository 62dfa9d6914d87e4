//! Implementación en memoria de los repositorios
//!
//! Se comporta como las consultas PostgreSQL (filtro de activos, upsert por
//! par, inserciones append-only) y permite simular fallos de escritura.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::warn;

use super::{AlertConfigSource, GeofenceSnapshot, GeofenceSource, GeofenceStateStore, LocationLog, VehicleDirectory, ViolationSink};
use crate::models::{
    AlertConfig, AlertEvent, ContainmentStatus, Geofence, GeofenceStatus, LocationUpdate, VehicleSummary, Violation,
};
use crate::utils::errors::AppError;
use crate::utils::ids::{prefixed_id, LOCATION_PREFIX};

type StateKey = (String, String);

#[derive(Default)]
pub struct InMemoryStore {
    geofences: RwLock<Vec<Geofence>>,
    alert_configs: RwLock<Vec<AlertConfig>>,
    vehicles: RwLock<HashMap<String, VehicleSummary>>,
    states: RwLock<HashMap<StateKey, (ContainmentStatus, DateTime<Utc>)>>,
    violations: RwLock<Vec<Violation>>,
    alert_history: RwLock<Vec<AlertEvent>>,
    locations: RwLock<Vec<LocationUpdate>>,
    fail_geofence_reads: AtomicBool,
    fail_state_reads: AtomicBool,
    fail_state_writes: AtomicBool,
    fail_violation_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_geofence(&self, geofence: Geofence) {
        self.geofences.write().await.push(geofence);
    }

    pub async fn set_geofence_status(&self, geofence_id: &str, status: GeofenceStatus) {
        if let Some(geofence) = self.geofences.write().await.iter_mut().find(|g| g.id == geofence_id) {
            geofence.status = status;
        }
    }

    pub async fn remove_geofence(&self, geofence_id: &str) {
        self.geofences.write().await.retain(|g| g.id != geofence_id);
    }

    pub async fn add_alert_config(&self, config: AlertConfig) {
        self.alert_configs.write().await.push(config);
    }

    pub async fn add_vehicle(&self, vehicle: VehicleSummary) {
        self.vehicles.write().await.insert(vehicle.vehicle_id.clone(), vehicle);
    }

    pub async fn violations(&self) -> Vec<Violation> {
        self.violations.read().await.clone()
    }

    pub async fn alert_history(&self) -> Vec<AlertEvent> {
        self.alert_history.read().await.clone()
    }

    pub async fn locations(&self) -> Vec<LocationUpdate> {
        self.locations.read().await.clone()
    }

    pub async fn stored_status(&self, vehicle_id: &str, geofence_id: &str) -> Option<ContainmentStatus> {
        self.states
            .read()
            .await
            .get(&(vehicle_id.to_string(), geofence_id.to_string()))
            .map(|(status, _)| *status)
    }

    pub fn fail_geofence_reads(&self, fail: bool) {
        self.fail_geofence_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_state_reads(&self, fail: bool) {
        self.fail_state_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_state_writes(&self, fail: bool) {
        self.fail_state_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_violation_writes(&self, fail: bool) {
        self.fail_violation_writes.store(fail, Ordering::SeqCst);
    }

    fn injected(flag: &AtomicBool, what: &str) -> Result<(), AppError> {
        if flag.load(Ordering::SeqCst) {
            return Err(AppError::Internal(format!("simulated {} failure", what)));
        }
        Ok(())
    }
}

#[async_trait]
impl GeofenceSource for InMemoryStore {
    async fn load_geofences(&self) -> Result<GeofenceSnapshot, AppError> {
        Self::injected(&self.fail_geofence_reads, "geofence read")?;
        let mut snapshot = GeofenceSnapshot::default();
        for geofence in self.geofences.read().await.iter() {
            match Geofence::validate_ring(&geofence.coordinates) {
                Ok(()) => snapshot.geofences.push(geofence.clone()),
                Err(e) => {
                    warn!("⚠️ Polígono rechazado para geocerca {}: {}", geofence.id, e);
                    snapshot.rejected.insert(geofence.id.clone());
                }
            }
        }
        Ok(snapshot)
    }
}

#[async_trait]
impl AlertConfigSource for InMemoryStore {
    async fn active_configs_for_vehicle(&self, vehicle_id: &str) -> Result<Vec<AlertConfig>, AppError> {
        let configs = self.alert_configs.read().await;
        Ok(configs
            .iter()
            .filter(|c| c.is_active() && c.applies_to(vehicle_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GeofenceStateStore for InMemoryStore {
    async fn get_status(&self, vehicle_id: &str, geofence_id: &str) -> Result<Option<ContainmentStatus>, AppError> {
        Self::injected(&self.fail_state_reads, "state read")?;
        Ok(self.stored_status(vehicle_id, geofence_id).await)
    }

    async fn upsert_status(
        &self,
        vehicle_id: &str,
        geofence_id: &str,
        status: ContainmentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        Self::injected(&self.fail_state_writes, "state write")?;
        self.states
            .write()
            .await
            .insert((vehicle_id.to_string(), geofence_id.to_string()), (status, updated_at));
        Ok(())
    }
}

#[async_trait]
impl ViolationSink for InMemoryStore {
    async fn insert_violation(&self, violation: &Violation) -> Result<(), AppError> {
        Self::injected(&self.fail_violation_writes, "violation insert")?;
        self.violations.write().await.push(violation.clone());
        Ok(())
    }

    async fn insert_alert_history(&self, event: &AlertEvent) -> Result<(), AppError> {
        self.alert_history.write().await.push(event.clone());
        Ok(())
    }
}

#[async_trait]
impl VehicleDirectory for InMemoryStore {
    async fn vehicle_summary(&self, vehicle_id: &str) -> Result<Option<VehicleSummary>, AppError> {
        Ok(self.vehicles.read().await.get(vehicle_id).cloned())
    }
}

#[async_trait]
impl LocationLog for InMemoryStore {
    async fn record_location(&self, update: &LocationUpdate) -> Result<String, AppError> {
        self.locations.write().await.push(update.clone());
        Ok(prefixed_id(LOCATION_PREFIX))
    }
}
