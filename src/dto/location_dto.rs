use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{CurrentGeofence, LocationUpdate, TransitionKind};
use crate::services::{FiredTransition, LocationOutcome};

// Request de actualización de posición
#[derive(Debug, Deserialize, Validate)]
pub struct LocationUpdateRequest {
    #[validate(length(min = 1, max = 50))]
    pub vehicle_id: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub timestamp: DateTime<Utc>,
}

impl From<LocationUpdateRequest> for LocationUpdate {
    fn from(request: LocationUpdateRequest) -> Self {
        Self {
            vehicle_id: request.vehicle_id,
            latitude: request.latitude,
            longitude: request.longitude,
            timestamp: request.timestamp,
        }
    }
}

// Transición disparada, resumida para la respuesta
#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub geofence_id: String,
    pub event_type: TransitionKind,
    pub violation_id: String,
    pub event_id: String,
}

impl From<FiredTransition> for TransitionResponse {
    fn from(fired: FiredTransition) -> Self {
        Self {
            geofence_id: fired.geofence_id,
            event_type: fired.event_type,
            violation_id: fired.violation.id,
            event_id: fired.alert.event_id,
        }
    }
}

// Response de actualización de posición
#[derive(Debug, Serialize)]
pub struct LocationUpdateResponse {
    pub vehicle_id: String,
    pub location_id: String,
    pub location_updated: bool,
    pub current_geofences: Vec<CurrentGeofence>,
    pub transitions: Vec<TransitionResponse>,
}

impl LocationUpdateResponse {
    pub fn new(vehicle_id: String, location_id: String, outcome: LocationOutcome) -> Self {
        Self {
            vehicle_id,
            location_id,
            location_updated: true,
            current_geofences: outcome.current_geofences,
            transitions: outcome.transitions.into_iter().map(TransitionResponse::from).collect(),
        }
    }
}
