use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::access::{dtos as access_dtos, handlers as access_handlers};
use crate::features::project_reports::{dtos as report_dtos, handlers as report_handlers};
use crate::features::settings::{dtos as settings_dtos, handlers as settings_handlers};
use crate::shared::types::{ApiResponse, ErrorResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Project report
        report_handlers::report,
        report_handlers::days,
        report_handlers::projects,
        report_handlers::task_get,
        report_handlers::task_post,
        report_handlers::screenshots,
        // Roles
        access_handlers::list_roles,
        access_handlers::allowed_rules,
        // Company settings
        settings_handlers::get_settings,
        settings_handlers::update_settings,
    ),
    components(
        schemas(
            Meta,
            ErrorResponse,
            // Project report
            report_dtos::ReportFilterDto,
            report_dtos::ProjectsRequestDto,
            report_dtos::TaskReportQueryDto,
            report_dtos::ScreenshotsRequestDto,
            report_dtos::ScreenshotDto,
            report_dtos::ReportTaskDto,
            report_dtos::ReportUserDto,
            report_dtos::ReportProjectDto,
            report_dtos::UserDayDurationDto,
            report_dtos::DayDurationDto,
            report_dtos::ProjectDto,
            report_dtos::IntervalScreenshotsDto,
            ApiResponse<Vec<report_dtos::ReportProjectDto>>,
            ApiResponse<Vec<report_dtos::UserDayDurationDto>>,
            ApiResponse<Vec<report_dtos::DayDurationDto>>,
            ApiResponse<Vec<report_dtos::ProjectDto>>,
            ApiResponse<Vec<report_dtos::IntervalScreenshotsDto>>,
            // Roles
            access_dtos::RoleResponseDto,
            access_dtos::AllowedRulesRequestDto,
            access_dtos::AllowedRuleDto,
            ApiResponse<Vec<access_dtos::RoleResponseDto>>,
            ApiResponse<Vec<access_dtos::AllowedRuleDto>>,
            // Company settings
            settings_dtos::CompanySettingsDto,
            settings_dtos::UpdateCompanySettingsDto,
            ApiResponse<settings_dtos::CompanySettingsDto>,
        )
    ),
    tags(
        (name = "project-report", description = "Tracked time aggregated by project, user and task"),
        (name = "roles", description = "Roles and their allowed rules"),
        (name = "company-settings", description = "Company wide settings"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Tracktime API",
        version = "0.1.0",
        description = "API documentation for Tracktime",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
