use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::alert::TransitionKind;

/// Registro inmutable de una transición disparada - mapea a la tabla violations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub id: String,
    pub vehicle_id: String,
    pub geofence_id: String,
    pub event_type: TransitionKind,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}
