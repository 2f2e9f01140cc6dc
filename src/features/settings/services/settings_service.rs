use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::settings::dtos::{CompanySettingsDto, UpdateCompanySettingsDto};
use crate::features::settings::repository::PropertyRepository;
use crate::shared::constants::{COMPANY_ENTITY, DEFAULT_TIMEZONE, TIMEZONE_PROPERTY};
use crate::shared::timezone::{parse_timezone, CompanyTz};

/// Company-wide settings
pub struct SettingsService {
    repo: Arc<dyn PropertyRepository>,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn PropertyRepository>) -> Self {
        Self { repo }
    }

    /// Company timezone; missing or unparseable values fall back to UTC
    pub async fn company_timezone(&self) -> Result<CompanyTz> {
        let stored = self.repo.get(COMPANY_ENTITY, TIMEZONE_PROPERTY).await?;

        match stored {
            None => Ok(CompanyTz::UTC),
            Some(name) => Ok(parse_timezone(&name).unwrap_or_else(|| {
                tracing::warn!("Stored company timezone {:?} is invalid, using UTC", name);
                CompanyTz::UTC
            })),
        }
    }

    pub async fn get(&self) -> Result<CompanySettingsDto> {
        let timezone = self
            .repo
            .get(COMPANY_ENTITY, TIMEZONE_PROPERTY)
            .await?
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

        Ok(CompanySettingsDto { timezone })
    }

    pub async fn update(&self, dto: UpdateCompanySettingsDto) -> Result<CompanySettingsDto> {
        let tz = dto
            .timezone
            .as_deref()
            .and_then(parse_timezone)
            .ok_or_else(|| AppError::field("timezone", "The timezone must be a valid zone or UTC offset."))?;

        let name = tz.name();
        self.repo.set(COMPANY_ENTITY, TIMEZONE_PROPERTY, &name).await?;
        tracing::info!("Company timezone set to {}", name);

        Ok(CompanySettingsDto { timezone: name })
    }
}
