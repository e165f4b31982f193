//! DTOs de la API
//!
//! Requests y responses tal como los intercambian los paneles.

pub mod auth_dto;
pub mod common;
pub mod mission_dto;
pub mod personnel_dto;
pub mod vehicle_dto;

pub use common::*;
