pub mod dtos;
pub mod handlers;
pub mod repository;
pub mod routes;
pub mod services;

pub use repository::{PgPropertyRepository, PropertyRepository};
pub use services::SettingsService;
