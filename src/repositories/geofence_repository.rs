use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, warn};

use super::{GeofenceSnapshot, GeofenceSource};
use crate::models::{Geofence, GeofenceStatus, LatLon};
use crate::utils::errors::AppError;

#[derive(Debug, sqlx::FromRow)]
struct GeofenceRow {
    id: String,
    name: String,
    category: String,
    status: String,
    coordinates: String,
}

pub struct GeofenceRepository {
    pool: PgPool,
}

impl GeofenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Convierte una fila en geocerca; `None` si el polígono no es utilizable
fn parse_row(row: GeofenceRow) -> Option<Geofence> {
    let coordinates: Vec<LatLon> = match serde_json::from_str(&row.coordinates) {
        Ok(coordinates) => coordinates,
        Err(e) => {
            warn!("⚠️ Coordenadas inválidas en geocerca {}: {}", row.id, e);
            return None;
        }
    };

    if let Err(e) = Geofence::validate_ring(&coordinates) {
        warn!("⚠️ Polígono rechazado para geocerca {}: {}", row.id, e);
        return None;
    }

    let Some(status) = GeofenceStatus::parse(&row.status) else {
        warn!("⚠️ Estado desconocido '{}' en geocerca {}", row.status, row.id);
        return None;
    };

    Some(Geofence {
        id: row.id,
        name: row.name,
        category: row.category,
        status,
        coordinates,
    })
}

#[async_trait]
impl GeofenceSource for GeofenceRepository {
    async fn load_geofences(&self) -> Result<GeofenceSnapshot, AppError> {
        let rows = sqlx::query_as::<_, GeofenceRow>(
            "SELECT id, name, category, status, coordinates FROM geofences",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut snapshot = GeofenceSnapshot::default();
        for row in rows {
            let id = row.id.clone();
            match parse_row(row) {
                Some(geofence) => snapshot.geofences.push(geofence),
                None => {
                    snapshot.rejected.insert(id);
                }
            }
        }
        debug!(
            "📍 {} geocercas cargadas ({} descartadas)",
            snapshot.geofences.len(),
            snapshot.rejected.len()
        );

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(coordinates: &str) -> GeofenceRow {
        GeofenceRow {
            id: "geo_1".to_string(),
            name: "Depot".to_string(),
            category: "delivery_zone".to_string(),
            status: "active".to_string(),
            coordinates: coordinates.to_string(),
        }
    }

    #[test]
    fn test_parse_valid_row() {
        let geofence = parse_row(row("[[0,0],[0,10],[10,10],[10,0],[0,0]]")).unwrap();
        assert_eq!(geofence.coordinates.len(), 5);
        assert!(geofence.is_active());
    }

    #[test]
    fn test_parse_skips_malformed_json() {
        assert!(parse_row(row("not json")).is_none());
    }

    #[test]
    fn test_parse_skips_open_ring() {
        assert!(parse_row(row("[[0,0],[0,10],[10,10],[10,0]]")).is_none());
    }

    #[test]
    fn test_parse_keeps_inactive_geofence() {
        let mut inactive = row("[[0,0],[0,10],[10,10],[10,0],[0,0]]");
        inactive.status = "inactive".to_string();
        let geofence = parse_row(inactive).unwrap();
        assert!(!geofence.is_active());
    }

    #[test]
    fn test_parse_skips_unknown_status() {
        let mut archived = row("[[0,0],[0,10],[10,10],[10,0],[0,0]]");
        archived.status = "archived".to_string();
        assert!(parse_row(archived).is_none());
    }
}
