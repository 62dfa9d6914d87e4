//! DTOs de la API

pub mod location_dto;
