//! Services module
//!
//! Lógica de negocio: autenticación, ciclo de vida de las misiones,
//! consultas por rol y back-office. Los handlers sólo traducen HTTP.

pub mod auth_service;
pub mod backoffice_service;
pub mod mission_lifecycle;
pub mod mission_queries;

pub use auth_service::AuthService;
pub use backoffice_service::BackofficeService;
pub use mission_lifecycle::MissionLifecycleService;
pub use mission_queries::MissionQueryService;
