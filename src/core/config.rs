use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub materializer: MaterializerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// HMAC secret used to verify HS256 bearer tokens
    pub jwt_secret: String,
    /// Expected `iss` claim, unchecked when absent
    pub issuer: Option<String>,
    pub jwt_leeway: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Settings for the background job that rebuilds `project_reports` slots
///
/// A pass only sees intervals that start inside the lookback window. An
/// interval closed more than `lookback` after it started is never counted,
/// so `lookback` must exceed the longest interval the tracker can record.
#[derive(Debug, Clone)]
pub struct MaterializerConfig {
    pub enabled: bool,
    /// Delay between two rebuild passes
    pub interval: Duration,
    /// How far back each pass rebuilds, counted from interval starts
    pub lookback: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // A missing .env is normal in deployments
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                eprintln!("Warning: could not read .env: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            materializer: MaterializerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    /// Report filters carry at most a few id lists
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 64 * 1024;
    const DEFAULT_PORT: u16 = 8080;

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| Self::DEFAULT_PORT.to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Origins of the report dashboard, comma separated
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    // Report reads are short; the materializer holds one connection per pass
    const DEFAULT_MAX_CONNECTIONS: u32 = 8;
    const DEFAULT_MIN_CONNECTIONS: u32 = 2;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 3600;

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl AuthConfig {
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 30;

    pub fn from_env() -> Result<Self, String> {
        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "JWT_SECRET environment variable is required".to_string())?;

        let issuer = env::var("JWT_ISSUER").ok().filter(|s| !s.is_empty());

        let jwt_leeway_secs = env::var("JWT_LEEWAY")
            .unwrap_or_else(|_| Self::DEFAULT_JWT_LEEWAY_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWT_LEEWAY must be a valid number".to_string())?;

        Ok(Self {
            jwt_secret,
            issuer,
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Basic auth is on only when both are set
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Tracktime API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Time tracking reports API".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// `user:pass` for the Swagger basic auth check
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl MaterializerConfig {
    const DEFAULT_INTERVAL_SECS: u64 = 300; // 5 minutes
    const DEFAULT_LOOKBACK_HOURS: u64 = 48;

    pub fn from_env() -> Result<Self, String> {
        let enabled = env::var("REPORT_MATERIALIZER_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .map_err(|_| "REPORT_MATERIALIZER_ENABLED must be true or false".to_string())?;

        let interval_secs = env::var("REPORT_MATERIALIZER_INTERVAL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_INTERVAL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "REPORT_MATERIALIZER_INTERVAL_SECS must be a valid number".to_string())?;

        let lookback_hours = env::var("REPORT_MATERIALIZER_LOOKBACK_HOURS")
            .unwrap_or_else(|_| Self::DEFAULT_LOOKBACK_HOURS.to_string())
            .parse::<u64>()
            .map_err(|_| "REPORT_MATERIALIZER_LOOKBACK_HOURS must be a valid number".to_string())?;

        if interval_secs == 0 {
            return Err("REPORT_MATERIALIZER_INTERVAL_SECS must be greater than zero".to_string());
        }

        Ok(Self {
            enabled,
            interval: Duration::from_secs(interval_secs),
            lookback: Duration::from_secs(lookback_hours * 3600),
        })
    }
}
