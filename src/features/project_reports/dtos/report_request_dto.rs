use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::shared::validation::{validate_date_input, validate_ids};

/// Filter shared by `report` and `days`
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ReportFilterDto {
    /// Users to include; empty or absent means every visible user
    #[serde(default)]
    #[validate(custom(function = "validate_ids"))]
    pub uids: Option<Vec<i64>>,
    /// Projects to include; empty or absent means every visible project
    #[serde(default)]
    #[validate(custom(function = "validate_ids"))]
    pub pids: Option<Vec<i64>>,
    #[validate(
        required(message = "The start at field is required."),
        custom(function = "validate_date_input")
    )]
    #[schema(example = "2019-07-01")]
    pub start_at: Option<String>,
    #[validate(
        required(message = "The end at field is required."),
        custom(function = "validate_date_input")
    )]
    #[schema(example = "2019-07-31")]
    pub end_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ProjectsRequestDto {
    #[serde(default)]
    #[validate(custom(function = "validate_ids"))]
    pub uids: Option<Vec<i64>>,
}

/// Body (POST) or query string (GET) of `task/{id}`
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskReportQueryDto {
    #[validate(
        required(message = "The uid field is required."),
        range(min = 1, message = "The selected uid is invalid.")
    )]
    pub uid: Option<i64>,
    #[validate(
        required(message = "The start at field is required."),
        custom(function = "validate_date_input")
    )]
    pub start_at: Option<String>,
    #[validate(
        required(message = "The end at field is required."),
        custom(function = "validate_date_input")
    )]
    pub end_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ScreenshotsRequestDto {
    #[validate(
        required(message = "The task id field is required."),
        range(min = 1, message = "The selected task id is invalid.")
    )]
    pub task_id: Option<i64>,
    /// UTC calendar day
    #[validate(
        required(message = "The date field is required."),
        custom(function = "validate_date_input")
    )]
    #[schema(example = "2019-07-01")]
    pub date: Option<String>,
}
