mod settings_dto;

pub use settings_dto::*;
