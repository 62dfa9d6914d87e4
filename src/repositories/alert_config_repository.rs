use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

use super::AlertConfigSource;
use crate::models::{AlertConfig, AlertConfigStatus, AlertEventType};
use crate::utils::errors::AppError;

#[derive(Debug, sqlx::FromRow)]
struct AlertConfigRow {
    id: String,
    geofence_id: String,
    vehicle_id: Option<String>,
    event_type: String,
}

pub struct AlertConfigRepository {
    pool: PgPool,
}

impl AlertConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Convierte una fila en regla; `None` si el event_type no se reconoce
fn parse_row(row: AlertConfigRow) -> Option<AlertConfig> {
    let Some(event_type) = AlertEventType::parse(&row.event_type) else {
        warn!("⚠️ Regla {} con event_type desconocido '{}', se ignora", row.id, row.event_type);
        return None;
    };

    Some(AlertConfig {
        id: row.id,
        geofence_id: row.geofence_id,
        vehicle_id: row.vehicle_id,
        event_type,
        status: AlertConfigStatus::Active,
    })
}

#[async_trait]
impl AlertConfigSource for AlertConfigRepository {
    async fn active_configs_for_vehicle(&self, vehicle_id: &str) -> Result<Vec<AlertConfig>, AppError> {
        let rows = sqlx::query_as::<_, AlertConfigRow>(
            r#"
            SELECT id, geofence_id, vehicle_id, event_type
            FROM alert_configs
            WHERE status = 'active' AND (vehicle_id = $1 OR vehicle_id IS NULL)
            "#,
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(parse_row).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(event_type: &str, vehicle_id: Option<&str>) -> AlertConfigRow {
        AlertConfigRow {
            id: "alert_1".to_string(),
            geofence_id: "geo_1".to_string(),
            vehicle_id: vehicle_id.map(str::to_string),
            event_type: event_type.to_string(),
        }
    }

    #[test]
    fn test_parse_entry_rule() {
        let config = parse_row(row("entry", Some("veh_1"))).unwrap();
        assert_eq!(config.event_type, AlertEventType::Entry);
        assert_eq!(config.vehicle_id.as_deref(), Some("veh_1"));
        assert!(config.is_active());
    }

    #[test]
    fn test_parse_global_both_rule() {
        let config = parse_row(row("both", None)).unwrap();
        assert_eq!(config.event_type, AlertEventType::Both);
        assert!(config.applies_to("veh_1"));
        assert!(config.applies_to("veh_2"));
    }

    #[test]
    fn test_parse_skips_unknown_event_type() {
        assert!(parse_row(row("arrive", None)).is_none());
        assert!(parse_row(row("", Some("veh_1"))).is_none());
    }
}
