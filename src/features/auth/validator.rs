use super::model::AuthenticatedUser;
use crate::core::error::AppError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::time::Duration;

pub struct JwtValidator {
    decoding_key: DecodingKey,
    issuer: Option<String>,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,
    #[serde(rename = "exp")]
    _exp: u64,
    #[serde(rename = "iat", default)]
    _iat: Option<u64>,
}

impl JwtValidator {
    pub fn new(secret: &str, issuer: Option<String>, leeway: Duration) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            leeway: leeway.as_secs(),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(e.to_string()))?;

        let user_id = token_data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("Token subject is not a user id".to_string()))?;

        Ok(AuthenticatedUser { user_id })
    }
}
