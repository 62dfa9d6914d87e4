//! Controladores
//!
//! Coordinan validación, persistencia y servicios para cada endpoint.

pub mod location_controller;
