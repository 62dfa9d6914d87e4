//! Motor de monitoreo de geocercas y despacho de alertas
//!
//! Recibe posiciones de vehículos, detecta entradas y salidas de geocercas,
//! registra violaciones y difunde alertas en vivo por WebSocket.

pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
