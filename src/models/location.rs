use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geofence::LatLon;

/// Actualización de posición de un vehículo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub vehicle_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl LocationUpdate {
    pub fn point(&self) -> LatLon {
        LatLon::new(self.latitude, self.longitude)
    }
}
