//! Utilidades del sistema
//!
//! Manejo de errores y generación de identificadores.

pub mod errors;
pub mod ids;

pub use errors::*;
