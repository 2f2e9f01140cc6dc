pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod workers;

pub use repository::{PgReportRepository, ReportRepository};
pub use services::ReportService;
pub use workers::ReportMaterializer;
