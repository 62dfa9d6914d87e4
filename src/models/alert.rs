//! Modelos de alertas
//!
//! Configuración de reglas de alerta y el evento que se difunde a los
//! suscriptores en vivo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geofence::GeofenceSummary;

/// Tipo de evento que escucha una regla - mapea a alert_configs.event_type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertEventType {
    Entry,
    Exit,
    Both,
}

impl AlertEventType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "entry" => Some(Self::Entry),
            "exit" => Some(Self::Exit),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    /// ¿Esta regla se dispara con la transición dada?
    pub fn matches(&self, transition: TransitionKind) -> bool {
        matches!(
            (self, transition),
            (Self::Both, _)
                | (Self::Entry, TransitionKind::Entry)
                | (Self::Exit, TransitionKind::Exit)
        )
    }
}

/// Cambio de contención: fuera→dentro es entrada, dentro→fuera es salida
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    Entry,
    Exit,
}

impl TransitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Exit => "exit",
        }
    }
}

/// Estado de una regla de alerta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertConfigStatus {
    Active,
    Inactive,
}

/// Regla de alerta - mapea a la tabla alert_configs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    pub id: String,
    pub geofence_id: String,
    /// `None` aplica a todos los vehículos
    pub vehicle_id: Option<String>,
    pub event_type: AlertEventType,
    pub status: AlertConfigStatus,
}

impl AlertConfig {
    pub fn is_active(&self) -> bool {
        self.status == AlertConfigStatus::Active
    }

    pub fn applies_to(&self, vehicle_id: &str) -> bool {
        self.vehicle_id.as_deref().map_or(true, |v| v == vehicle_id)
    }
}

/// Resumen del vehículo incluido en cada alerta
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub vehicle_id: String,
    pub vehicle_number: String,
    pub driver_name: String,
}

impl VehicleSummary {
    /// Resumen mínimo cuando el vehículo no está registrado
    pub fn unknown(vehicle_id: &str) -> Self {
        Self {
            vehicle_id: vehicle_id.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Evento de alerta que se envía por el hub a los suscriptores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub event_id: String,
    pub event_type: TransitionKind,
    pub timestamp: DateTime<Utc>,
    pub vehicle: VehicleSummary,
    pub geofence: GeofenceSummary,
    pub location: AlertLocation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_matching() {
        assert!(AlertEventType::Entry.matches(TransitionKind::Entry));
        assert!(!AlertEventType::Entry.matches(TransitionKind::Exit));
        assert!(AlertEventType::Exit.matches(TransitionKind::Exit));
        assert!(!AlertEventType::Exit.matches(TransitionKind::Entry));
        assert!(AlertEventType::Both.matches(TransitionKind::Entry));
        assert!(AlertEventType::Both.matches(TransitionKind::Exit));
    }

    #[test]
    fn test_config_scope() {
        let mut config = AlertConfig {
            id: "alert_1".to_string(),
            geofence_id: "geo_1".to_string(),
            vehicle_id: None,
            event_type: AlertEventType::Both,
            status: AlertConfigStatus::Active,
        };
        assert!(config.applies_to("veh_a"));

        config.vehicle_id = Some("veh_b".to_string());
        assert!(!config.applies_to("veh_a"));
        assert!(config.applies_to("veh_b"));
    }

    #[test]
    fn test_alert_event_wire_format() {
        let event = AlertEvent {
            event_id: "evt_1".to_string(),
            event_type: TransitionKind::Entry,
            timestamp: "2024-05-01T10:00:00Z".parse().unwrap(),
            vehicle: VehicleSummary {
                vehicle_id: "veh_1".to_string(),
                vehicle_number: "KA-01-1234".to_string(),
                driver_name: "Asha".to_string(),
            },
            geofence: GeofenceSummary {
                geofence_id: "geo_1".to_string(),
                geofence_name: "Depot".to_string(),
                category: "restricted_zone".to_string(),
            },
            location: AlertLocation { latitude: 5.0, longitude: 5.0 },
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "entry");
        assert_eq!(json["vehicle"]["vehicle_number"], "KA-01-1234");
        assert_eq!(json["geofence"]["geofence_name"], "Depot");
        assert_eq!(json["location"]["latitude"], 5.0);
    }
}
