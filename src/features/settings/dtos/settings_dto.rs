use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::shared::timezone::parse_timezone;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CompanySettingsDto {
    /// IANA zone name or fixed UTC offset (`+03:00`) used for report bucketing
    #[schema(example = "Europe/Berlin")]
    pub timezone: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCompanySettingsDto {
    #[validate(
        required(message = "The timezone field is required."),
        custom(function = "validate_timezone")
    )]
    #[schema(example = "Europe/Berlin")]
    pub timezone: Option<String>,
}

fn validate_timezone(value: &str) -> Result<(), ValidationError> {
    match parse_timezone(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("timezone").with_message(Cow::Borrowed(
            "The timezone must be a valid zone or UTC offset.",
        ))),
    }
}
