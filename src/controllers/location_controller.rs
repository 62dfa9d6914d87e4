use std::sync::Arc;

use tracing::debug;
use validator::Validate;

use crate::dto::location_dto::{LocationUpdateRequest, LocationUpdateResponse};
use crate::models::LocationUpdate;
use crate::repositories::LocationLog;
use crate::services::RuleEvaluator;
use crate::utils::errors::AppError;

pub struct LocationController {
    locations: Arc<dyn LocationLog>,
    evaluator: Arc<RuleEvaluator>,
}

impl LocationController {
    pub fn new(locations: Arc<dyn LocationLog>, evaluator: Arc<RuleEvaluator>) -> Self {
        Self { locations, evaluator }
    }

    /// Guarda la posición y la pasa por el motor de geocercas
    pub async fn ingest(&self, request: LocationUpdateRequest) -> Result<LocationUpdateResponse, AppError> {
        request.validate()?;
        let update = LocationUpdate::from(request);

        // Sin historial guardado la actualización se rechaza entera
        let location_id = self.locations.record_location(&update).await?;
        debug!("📍 Posición {} guardada para {}", location_id, update.vehicle_id);

        let outcome = self.evaluator.process_location(&update).await;

        Ok(LocationUpdateResponse::new(update.vehicle_id, location_id, outcome))
    }
}
