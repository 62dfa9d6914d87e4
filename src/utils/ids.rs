//! Generación de identificadores
//!
//! Todos los registros usan `<prefijo>_<uuid v4>`, igual que los ids que
//! crea la capa CRUD (`geo_`, `veh_`, `alert_`).

use uuid::Uuid;

pub const VIOLATION_PREFIX: &str = "viol";
pub const EVENT_PREFIX: &str = "evt";
pub const ALERT_HISTORY_PREFIX: &str = "ah";
pub const LOCATION_PREFIX: &str = "loc";

pub fn prefixed_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4())
}
