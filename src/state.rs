//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. El hub y el evaluador se construyen una vez
//! en el arranque y se reparten desde aquí.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::{LocationLog, LocationRepository};
use crate::services::{AlertHub, EngineStores, RuleEvaluator};

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub hub: AlertHub,
    pub evaluator: Arc<RuleEvaluator>,
    pub locations: Arc<dyn LocationLog>,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        hub: AlertHub,
        stores: EngineStores,
        locations: Arc<dyn LocationLog>,
    ) -> Self {
        let evaluator = Arc::new(RuleEvaluator::new(stores, hub.clone()));
        Self {
            config,
            hub,
            evaluator,
            locations,
        }
    }

    /// Estado completo sobre PostgreSQL
    pub fn postgres(pool: PgPool, config: EnvironmentConfig, hub: AlertHub) -> Self {
        let locations = Arc::new(LocationRepository::new(pool.clone()));
        Self::new(config, hub, EngineStores::postgres(pool), locations)
    }
}
