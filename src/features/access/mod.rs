pub mod catalogue;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

pub use repository::{AccessRepository, PgAccessRepository};
pub use services::AccessService;
