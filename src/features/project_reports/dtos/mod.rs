mod report_request_dto;
mod report_response_dto;

pub use report_request_dto::*;
pub use report_response_dto::*;
