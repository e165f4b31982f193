//! Gestión de misiones y ordres de déplacement
//!
//! Backend REST de los paneles empleado, manager, finanzas y back-office:
//! ciclo de vida de las misiones acoplado a la disponibilidad de los
//! vehículos de servicio, autenticación JWT y consultas por rol.

pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
