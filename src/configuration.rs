use std::time::Duration;

use crate::error::ConfigError;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// Mark the refresh-token cookie `Secure` (HTTPS only)
    pub cookie_secure: bool,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    /// Deadline applied to every single store call
    pub timeout_seconds: u64,
}

impl DatabaseSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// JWT authentication settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub access_token_expiry: i64,  // seconds (3600 = 1 hour)
    pub refresh_token_expiry: i64, // seconds (604800 = 7 days)
}

// Keeps the signing key out of `{:?}` output and therefore out of logs.
impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"[redacted]")
            .field("issuer", &self.issuer)
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish()
    }
}

impl Settings {
    /// Both the signing secret and the store connection string are mandatory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::MissingRequired("DATABASE_URL".to_string()));
        }
        if self.jwt.access_token_expiry <= 0 || self.jwt.refresh_token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(
                "token expiry must be positive".to_string(),
            ));
        }
        if self.database.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "database.timeout_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load settings from (in order) defaults, an optional `configuration` file,
/// `APP_*` environment variables, then `JWT_SECRET` / `DATABASE_URL`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    // A missing .env is normal outside local development
    let _ = dotenvy::dotenv();

    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8080)?
        .set_default("application.cookie_secure", true)?
        .set_default("database.url", "")?
        .set_default("database.max_connections", 5)?
        .set_default("database.timeout_seconds", 10)?
        .set_default("jwt.secret", "")?
        .set_default("jwt.issuer", "restaurant-api")?
        .set_default("jwt.access_token_expiry", 3600)?
        .set_default("jwt.refresh_token_expiry", 604_800)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
        .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}
