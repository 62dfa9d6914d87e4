use axum::{extract::State, routing::post, Json, Router};

use crate::controllers::location_controller::LocationController;
use crate::dto::location_dto::{LocationUpdateRequest, LocationUpdateResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_location_router() -> Router<AppState> {
    Router::new().route("/location", post(update_location))
}

async fn update_location(
    State(state): State<AppState>,
    Json(request): Json<LocationUpdateRequest>,
) -> Result<Json<LocationUpdateResponse>, AppError> {
    let controller = LocationController::new(state.locations.clone(), state.evaluator.clone());
    let response = controller.ingest(request).await?;
    Ok(Json(response))
}
