//! Services module
//!
//! Este módulo contiene el motor de geocercas: test de contención, seguimiento
//! de estado, evaluación de reglas y el hub que difunde las alertas.

pub mod alert_hub;
pub mod containment;
pub mod rule_evaluator;
pub mod state_tracker;
pub mod vehicle_locks;

pub use alert_hub::{AlertHub, SubscriberId, Subscription};
pub use containment::contains;
pub use rule_evaluator::{EngineStores, FiredTransition, LocationOutcome, RuleEvaluator};
pub use state_tracker::StateTracker;
