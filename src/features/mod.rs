pub mod access;
pub mod auth;
pub mod project_reports;
pub mod settings;
