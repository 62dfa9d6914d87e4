//! Evaluador de reglas de geocercas
//!
//! Para cada actualización de posición:
//! 1. calcula el conjunto de geocercas activas que contienen el punto;
//! 2. carga las reglas activas del vehículo (globales o propias);
//! 3. por cada geocerca con reglas compara el estado guardado con el actual;
//!    una geocerca inactiva o borrada cuenta como "fuera";
//! 4. una transición dispara si alguna regla escucha ese tipo de evento:
//!    se registra UNA violación y se publica UNA alerta, sin importar
//!    cuántas reglas coincidan;
//! 5. el estado actual se escribe siempre, haya disparo o no, para poder
//!    detectar una salida aunque solo exista una regla de entrada.
//!
//! Nada es fatal: polígonos corruptos o fallos de persistencia se registran
//! en el log y solo se salta la geocerca afectada.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, error, info, warn};

use super::alert_hub::AlertHub;
use super::containment::contains;
use super::state_tracker::StateTracker;
use super::vehicle_locks::VehicleLocks;
use crate::models::{
    AlertConfig, AlertEvent, AlertLocation, ContainmentStatus, CurrentGeofence, Geofence, GeofenceSummary,
    LatLon, LocationUpdate, TransitionKind, VehicleSummary, Violation,
};
use crate::repositories::{
    AlertConfigRepository, AlertConfigSource, GeofenceRepository, GeofenceSnapshot, GeofenceSource,
    GeofenceStateStore, StateRepository, VehicleDirectory, VehicleRepository, ViolationRepository, ViolationSink,
};
use crate::utils::ids::{prefixed_id, EVENT_PREFIX, VIOLATION_PREFIX};

/// Colaboradores de persistencia que necesita el evaluador
#[derive(Clone)]
pub struct EngineStores {
    pub geofences: Arc<dyn GeofenceSource>,
    pub alert_configs: Arc<dyn AlertConfigSource>,
    pub states: Arc<dyn GeofenceStateStore>,
    pub violations: Arc<dyn ViolationSink>,
    pub vehicles: Arc<dyn VehicleDirectory>,
}

impl EngineStores {
    /// Todos los colaboradores sobre PostgreSQL
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            geofences: Arc::new(GeofenceRepository::new(pool.clone())),
            alert_configs: Arc::new(AlertConfigRepository::new(pool.clone())),
            states: Arc::new(StateRepository::new(pool.clone())),
            violations: Arc::new(ViolationRepository::new(pool.clone())),
            vehicles: Arc::new(VehicleRepository::new(pool)),
        }
    }

    /// Todos los colaboradores respaldados por un mismo store
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: GeofenceSource + AlertConfigSource + GeofenceStateStore + ViolationSink + VehicleDirectory + 'static,
    {
        Self {
            geofences: store.clone(),
            alert_configs: store.clone(),
            states: store.clone(),
            violations: store.clone(),
            vehicles: store,
        }
    }
}

/// Transición que disparó al menos una regla
#[derive(Debug, Clone, Serialize)]
pub struct FiredTransition {
    pub vehicle_id: String,
    pub geofence_id: String,
    pub event_type: TransitionKind,
    pub matched_configs: Vec<String>,
    pub violation: Violation,
    pub alert: AlertEvent,
}

/// Resultado de procesar una actualización de posición
#[derive(Debug, Clone, Serialize)]
pub struct LocationOutcome {
    pub current_geofences: Vec<CurrentGeofence>,
    pub transitions: Vec<FiredTransition>,
}

pub struct RuleEvaluator {
    geofences: Arc<dyn GeofenceSource>,
    alert_configs: Arc<dyn AlertConfigSource>,
    tracker: StateTracker,
    violations: Arc<dyn ViolationSink>,
    vehicles: Arc<dyn VehicleDirectory>,
    hub: AlertHub,
    locks: VehicleLocks,
}

impl RuleEvaluator {
    pub fn new(stores: EngineStores, hub: AlertHub) -> Self {
        Self {
            geofences: stores.geofences,
            alert_configs: stores.alert_configs,
            tracker: StateTracker::new(stores.states),
            violations: stores.violations,
            vehicles: stores.vehicles,
            hub,
            locks: VehicleLocks::new(),
        }
    }

    pub async fn evaluate(&self, vehicle_id: &str, point: LatLon, timestamp: DateTime<Utc>) -> Vec<FiredTransition> {
        let update = LocationUpdate {
            vehicle_id: vehicle_id.to_string(),
            latitude: point.latitude,
            longitude: point.longitude,
            timestamp,
        };
        self.process_location(&update).await.transitions
    }

    /// Evalúa la actualización con el vehículo bloqueado de principio a fin
    pub async fn process_location(&self, update: &LocationUpdate) -> LocationOutcome {
        let _guard = self.locks.acquire(&update.vehicle_id).await;
        let point = update.point();

        // Si la carga falla no se toca el estado
        let snapshot = match self.geofences.load_geofences().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("❌ Error cargando geocercas: {}", e);
                return LocationOutcome {
                    current_geofences: Vec::new(),
                    transitions: Vec::new(),
                };
            }
        };

        let containing: HashSet<&str> = snapshot
            .geofences
            .iter()
            .filter(|g| g.is_active() && contains(point, &g.coordinates))
            .map(|g| g.id.as_str())
            .collect();

        let current_geofences = snapshot
            .geofences
            .iter()
            .filter(|g| containing.contains(g.id.as_str()))
            .map(|g| CurrentGeofence {
                geofence_id: g.id.clone(),
                geofence_name: g.name.clone(),
                category: g.category.clone(),
                status: ContainmentStatus::Inside,
            })
            .collect();

        let transitions = self.apply_rules(update, &snapshot, &containing).await;

        LocationOutcome {
            current_geofences,
            transitions,
        }
    }

    async fn apply_rules(
        &self,
        update: &LocationUpdate,
        snapshot: &GeofenceSnapshot,
        containing: &HashSet<&str>,
    ) -> Vec<FiredTransition> {
        let vehicle_id = update.vehicle_id.as_str();

        let configs = match self.alert_configs.active_configs_for_vehicle(vehicle_id).await {
            Ok(configs) => configs,
            Err(e) => {
                error!("❌ Error cargando reglas para {}: {}", vehicle_id, e);
                return Vec::new();
            }
        };

        let mut rules_by_geofence: BTreeMap<&str, Vec<&AlertConfig>> = BTreeMap::new();
        for config in configs.iter().filter(|c| c.is_active() && c.applies_to(vehicle_id)) {
            rules_by_geofence.entry(config.geofence_id.as_str()).or_default().push(config);
        }

        let by_id: HashMap<&str, &Geofence> = snapshot
            .geofences
            .iter()
            .map(|g| (g.id.as_str(), g))
            .collect();

        let mut fired = Vec::new();
        for (geofence_id, rules) in rules_by_geofence {
            if snapshot.rejected.contains(geofence_id) {
                warn!("⚠️ Geocerca {} con datos corruptos, se omiten sus reglas", geofence_id);
                continue;
            }

            let geofence = by_id.get(geofence_id).copied();
            if !geofence.is_some_and(Geofence::is_active) {
                debug!("Geocerca {} inactiva o borrada, cuenta como fuera", geofence_id);
            }

            let previous = match self.tracker.get_status(vehicle_id, geofence_id).await {
                Ok(status) => status,
                Err(e) => {
                    error!("❌ Error leyendo estado {}/{}: {}", vehicle_id, geofence_id, e);
                    continue;
                }
            };
            let current = ContainmentStatus::from_membership(containing.contains(geofence_id));

            if let Some(kind) = transition(previous, current) {
                let matched: Vec<String> = rules
                    .iter()
                    .filter(|rule| rule.event_type.matches(kind))
                    .map(|rule| rule.id.clone())
                    .collect();

                if matched.is_empty() {
                    debug!("{} {} en {} sin regla que escuche", vehicle_id, kind.as_str(), geofence_id);
                } else {
                    let summary = geofence
                        .map(Geofence::summary)
                        .unwrap_or_else(|| GeofenceSummary::unknown(geofence_id));
                    fired.push(self.fire(update, summary, kind, matched).await);
                }
            }

            if let Err(e) = self
                .tracker
                .set_status(vehicle_id, geofence_id, current, update.timestamp)
                .await
            {
                error!("❌ Error guardando estado {}/{}: {}", vehicle_id, geofence_id, e);
            }
        }

        fired
    }

    async fn fire(
        &self,
        update: &LocationUpdate,
        geofence: GeofenceSummary,
        kind: TransitionKind,
        matched_configs: Vec<String>,
    ) -> FiredTransition {
        let vehicle_id = update.vehicle_id.as_str();

        let violation = Violation {
            id: prefixed_id(VIOLATION_PREFIX),
            vehicle_id: vehicle_id.to_string(),
            geofence_id: geofence.geofence_id.clone(),
            event_type: kind,
            latitude: update.latitude,
            longitude: update.longitude,
            timestamp: update.timestamp,
        };
        if let Err(e) = self.violations.insert_violation(&violation).await {
            error!("❌ Error registrando violación {}: {}", violation.id, e);
        }

        let vehicle = match self.vehicles.vehicle_summary(vehicle_id).await {
            Ok(Some(vehicle)) => vehicle,
            Ok(None) => {
                warn!("⚠️ Vehículo {} no registrado, alerta sin datos del conductor", vehicle_id);
                VehicleSummary::unknown(vehicle_id)
            }
            Err(e) => {
                error!("❌ Error buscando vehículo {}: {}", vehicle_id, e);
                VehicleSummary::unknown(vehicle_id)
            }
        };

        let alert = AlertEvent {
            event_id: prefixed_id(EVENT_PREFIX),
            event_type: kind,
            timestamp: update.timestamp,
            vehicle,
            geofence,
            location: AlertLocation {
                latitude: update.latitude,
                longitude: update.longitude,
            },
        };
        if let Err(e) = self.violations.insert_alert_history(&alert).await {
            error!("❌ Error guardando historial de alerta {}: {}", alert.event_id, e);
        }
        if let Err(e) = self.hub.publish(alert.clone()) {
            error!("❌ No se pudo publicar la alerta {}: {}", alert.event_id, e);
        }

        info!(
            "🚨 {} {} geocerca '{}' ({} reglas)",
            vehicle_id,
            kind.as_str(),
            alert.geofence.geofence_name,
            matched_configs.len()
        );

        FiredTransition {
            vehicle_id: vehicle_id.to_string(),
            geofence_id: alert.geofence.geofence_id.clone(),
            event_type: kind,
            matched_configs,
            violation,
            alert,
        }
    }
}

fn transition(previous: ContainmentStatus, current: ContainmentStatus) -> Option<TransitionKind> {
    match (previous, current) {
        (ContainmentStatus::Outside, ContainmentStatus::Inside) => Some(TransitionKind::Entry),
        (ContainmentStatus::Inside, ContainmentStatus::Outside) => Some(TransitionKind::Exit),
        _ => None,
    }
}
