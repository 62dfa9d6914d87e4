use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use geofence_monitoring::config::EnvironmentConfig;
use geofence_monitoring::models::{
    AlertConfig, AlertConfigStatus, AlertEventType, ContainmentStatus, Geofence, GeofenceStatus,
    LatLon, TransitionKind, VehicleSummary,
};
use geofence_monitoring::repositories::InMemoryStore;
use geofence_monitoring::services::{AlertHub, EngineStores, Subscription};
use geofence_monitoring::state::AppState;

const VEHICLE: &str = "veh_001";
const DEPOT: &str = "geo_depot";

async fn create_test_app() -> (Router, Arc<InMemoryStore>, Subscription) {
    let store = Arc::new(InMemoryStore::new());
    store
        .add_geofence(Geofence {
            id: DEPOT.to_string(),
            name: "Central Depot".to_string(),
            category: "depot".to_string(),
            status: GeofenceStatus::Active,
            coordinates: [[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0], [0.0, 0.0]]
                .into_iter()
                .map(LatLon::from)
                .collect(),
        })
        .await;
    store
        .add_alert_config(AlertConfig {
            id: "alert_depot".to_string(),
            geofence_id: DEPOT.to_string(),
            vehicle_id: None,
            event_type: AlertEventType::Both,
            status: AlertConfigStatus::Active,
        })
        .await;
    store
        .add_vehicle(VehicleSummary {
            vehicle_id: VEHICLE.to_string(),
            vehicle_number: "KA-01-1234".to_string(),
            driver_name: "Asha".to_string(),
        })
        .await;

    let (hub, _handle) = AlertHub::spawn(16);
    let subscription = hub.subscribe().unwrap();
    let state = AppState::new(
        EnvironmentConfig::default(),
        hub,
        EngineStores::from_store(store.clone()),
        store.clone(),
    );

    (geofence_monitoring::routes::create_router(state), store, subscription)
}

async fn post_location(app: &Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/vehicles/location")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn location(latitude: f64, longitude: f64) -> Value {
    json!({
        "vehicle_id": VEHICLE,
        "latitude": latitude,
        "longitude": longitude,
        "timestamp": "2026-03-01T08:00:00Z"
    })
}

#[tokio::test]
async fn test_health_check() {
    let (app, _store, _alerts) = create_test_app().await;
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["subscribers"], 1);
}

#[tokio::test]
async fn test_entry_returns_transition_and_broadcasts() {
    let (app, store, mut alerts) = create_test_app().await;

    let (status, body) = post_location(&app, location(5.0, 5.0)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vehicle_id"], VEHICLE);
    assert_eq!(body["location_updated"], true);
    assert_eq!(body["current_geofences"][0]["geofence_id"], DEPOT);
    assert_eq!(body["current_geofences"][0]["status"], "inside");
    assert_eq!(body["transitions"].as_array().unwrap().len(), 1);
    assert_eq!(body["transitions"][0]["event_type"], "entry");

    let event = alerts.recv().await.unwrap();
    assert_eq!(event.event_type, TransitionKind::Entry);
    assert_eq!(event.vehicle.driver_name, "Asha");
    assert_eq!(body["transitions"][0]["event_id"], event.event_id);

    assert_eq!(store.locations().await.len(), 1);
    assert_eq!(store.violations().await.len(), 1);
    assert_eq!(
        store.stored_status(VEHICLE, DEPOT).await,
        Some(ContainmentStatus::Inside)
    );
}

#[tokio::test]
async fn test_repeated_position_is_quiet() {
    let (app, store, _alerts) = create_test_app().await;

    post_location(&app, location(5.0, 5.0)).await;
    let (status, body) = post_location(&app, location(6.0, 6.0)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["transitions"].as_array().unwrap().is_empty());
    assert_eq!(store.violations().await.len(), 1);
    assert_eq!(store.locations().await.len(), 2);
}

#[tokio::test]
async fn test_exit_after_entry() {
    let (app, store, _alerts) = create_test_app().await;

    post_location(&app, location(5.0, 5.0)).await;
    let (status, body) = post_location(&app, location(15.0, 15.0)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["current_geofences"].as_array().unwrap().is_empty());
    assert_eq!(body["transitions"][0]["event_type"], "exit");
    assert_eq!(
        store.stored_status(VEHICLE, DEPOT).await,
        Some(ContainmentStatus::Outside)
    );
}

#[tokio::test]
async fn test_invalid_latitude_is_rejected() {
    let (app, store, _alerts) = create_test_app().await;

    let (status, body) = post_location(&app, location(95.0, 5.0)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(store.locations().await.is_empty());
    assert!(store.violations().await.is_empty());
}

#[tokio::test]
async fn test_empty_vehicle_id_is_rejected() {
    let (app, _store, _alerts) = create_test_app().await;

    let mut body = location(5.0, 5.0);
    body["vehicle_id"] = json!("");
    let (status, _) = post_location(&app, body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_timestamp_is_not_accepted() {
    let (app, store, _alerts) = create_test_app().await;

    let (status, _) = post_location(
        &app,
        json!({ "vehicle_id": VEHICLE, "latitude": 5.0, "longitude": 5.0 }),
    )
    .await;

    assert!(status.is_client_error());
    assert!(store.locations().await.is_empty());
}
