mod access_service;

pub use access_service::AccessService;
