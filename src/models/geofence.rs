//! Modelo de Geofence
//!
//! Este módulo contiene la geocerca tal como la entrega la capa de persistencia:
//! un polígono cerrado de vértices (latitud, longitud) con estado activo/inactivo.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coordenada geográfica. Se serializa como `[latitude, longitude]`,
/// el mismo formato con el que se guardan los polígonos.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLon {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLon {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl From<[f64; 2]> for LatLon {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<LatLon> for [f64; 2] {
    fn from(point: LatLon) -> Self {
        [point.latitude, point.longitude]
    }
}

/// Estado de la geocerca - solo las activas participan en la detección
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeofenceStatus {
    Active,
    Inactive,
}

impl GeofenceStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// Geocerca - mapea a la tabla geofences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geofence {
    pub id: String,
    pub name: String,
    pub category: String,
    pub status: GeofenceStatus,
    pub coordinates: Vec<LatLon>,
}

/// Motivos por los que un polígono no es un anillo válido
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RingError {
    #[error("Minimum 4 points required (3 unique + 1 closing point), got {0}")]
    TooFewPoints(usize),

    #[error("First and last coordinates must be identical")]
    NotClosed,
}

impl Geofence {
    pub fn is_active(&self) -> bool {
        self.status == GeofenceStatus::Active
    }

    /// Verifica que el polígono sea un anillo cerrado de al menos 4 puntos.
    ///
    /// El test de contención nunca cierra un anillo abierto, así que esta
    /// validación debe hacerse antes de que la geocerca entre en la detección.
    pub fn validate_ring(coordinates: &[LatLon]) -> Result<(), RingError> {
        if coordinates.len() < 4 {
            return Err(RingError::TooFewPoints(coordinates.len()));
        }
        if coordinates.first() != coordinates.last() {
            return Err(RingError::NotClosed);
        }
        Ok(())
    }

    pub fn summary(&self) -> GeofenceSummary {
        GeofenceSummary {
            geofence_id: self.id.clone(),
            geofence_name: self.name.clone(),
            category: self.category.clone(),
        }
    }
}

/// Resumen de geocerca incluido en cada alerta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeofenceSummary {
    pub geofence_id: String,
    pub geofence_name: String,
    pub category: String,
}

impl GeofenceSummary {
    /// Resumen mínimo cuando la geocerca ya no existe
    pub fn unknown(geofence_id: &str) -> Self {
        Self {
            geofence_id: geofence_id.to_string(),
            geofence_name: String::new(),
            category: String::new(),
        }
    }
}

/// Geocerca que contiene la posición actual de un vehículo
#[derive(Debug, Clone, Serialize)]
pub struct CurrentGeofence {
    pub geofence_id: String,
    pub geofence_name: String,
    pub category: String,
    pub status: ContainmentStatus,
}

/// Estado de un vehículo respecto a una geocerca
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainmentStatus {
    Inside,
    Outside,
}

impl ContainmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inside => "inside",
            Self::Outside => "outside",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "inside" => Some(Self::Inside),
            "outside" => Some(Self::Outside),
            _ => None,
        }
    }

    pub fn from_membership(inside: bool) -> Self {
        if inside {
            Self::Inside
        } else {
            Self::Outside
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(points: &[[f64; 2]]) -> Vec<LatLon> {
        points.iter().copied().map(LatLon::from).collect()
    }

    #[test]
    fn test_validate_ring_accepts_closed_square() {
        let square = ring(&[[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0], [0.0, 0.0]]);
        assert_eq!(Geofence::validate_ring(&square), Ok(()));
    }

    #[test]
    fn test_validate_ring_rejects_open_ring() {
        let open = ring(&[[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0]]);
        assert_eq!(Geofence::validate_ring(&open), Err(RingError::NotClosed));
    }

    #[test]
    fn test_validate_ring_rejects_short_ring() {
        let short = ring(&[[0.0, 0.0], [0.0, 10.0], [0.0, 0.0]]);
        assert_eq!(Geofence::validate_ring(&short), Err(RingError::TooFewPoints(3)));
    }

    #[test]
    fn test_latlon_serializes_as_pair() {
        let point = LatLon::new(12.5, -3.25);
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, "[12.5,-3.25]");

        let parsed: Vec<LatLon> = serde_json::from_str("[[1.0,2.0],[3.0,4.0]]").unwrap();
        assert_eq!(parsed[1], LatLon::new(3.0, 4.0));
    }
}
