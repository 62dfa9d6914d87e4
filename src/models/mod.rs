//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que comparten el evaluador de
//! reglas, el hub de alertas y la capa de persistencia.

pub mod alert;
pub mod geofence;
pub mod location;
pub mod violation;

pub use alert::*;
pub use geofence::*;
pub use location::*;
pub use violation::*;
