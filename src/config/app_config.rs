use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

use crate::utils::signer::SigningScheme;

/// Settings for the external QR image service.
#[derive(Debug, Clone)]
pub struct ImageServiceConfig {
    pub base_url: String,
    pub size: u32,
    pub probe: bool,
    pub probe_timeout_ms: u64,
}

impl Default for ImageServiceConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://api.qrserver.com/v1/create-qr-code/"),
            size: 300,
            probe: false,
            probe_timeout_ms: 2000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub bind_addr: String,
    pub mongodb_uri: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub qr_secret: String,
    pub signing_scheme: SigningScheme,
    pub signature_max_age_hours: i64,
    pub card_validity_days: i64,
    pub image: ImageServiceConfig,
    pub cors_origins: Vec<String>,
    pub cache_capacity: usize,
    pub cache_ttl_secs: u64,
}

impl AppConfig {
    /// Read the configuration from the process environment.
    ///
    /// `PORT`, `MONGODB_URI`, `JWT_SECRET` and `QR_SECRET_KEY` are required,
    /// everything else falls back to a default.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .context("PORT not set")?
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let signing_scheme = match env::var("QR_SIGNING_SCHEME") {
            Ok(raw) => SigningScheme::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("Invalid QR_SIGNING_SCHEME: {}", e))?,
            Err(_) => SigningScheme::default(),
        };

        let defaults = ImageServiceConfig::default();
        let image = ImageServiceConfig {
            base_url: env::var("QR_IMAGE_BASE_URL").unwrap_or(defaults.base_url),
            size: parse_or("QR_IMAGE_SIZE", defaults.size)?,
            probe: parse_or("QR_IMAGE_PROBE", defaults.probe)?,
            probe_timeout_ms: parse_or("QR_IMAGE_PROBE_TIMEOUT_MS", defaults.probe_timeout_ms)?,
        };

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| String::from("http://localhost:5173,http://localhost:4173"))
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            port,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| String::from("127.0.0.1")),
            mongodb_uri: env::var("MONGODB_URI").context("MONGODB_URI not set")?,
            database_name: env::var("DATABASE_NAME").unwrap_or_else(|_| String::from("loyalty")),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET not set")?,
            qr_secret: env::var("QR_SECRET_KEY").context("QR_SECRET_KEY not set")?,
            signing_scheme,
            signature_max_age_hours: parse_or("QR_SIGNATURE_MAX_AGE_HOURS", 24 * 365)?,
            card_validity_days: parse_or("QR_CARD_VALIDITY_DAYS", 365)?,
            image,
            cors_origins,
            cache_capacity: parse_or("VALIDATION_CACHE_CAPACITY", 1000)?,
            cache_ttl_secs: parse_or("VALIDATION_CACHE_TTL_SECS", 300)?,
        })
    }

    /// Maximum accepted signature age in milliseconds.
    pub fn signature_max_age_ms(&self) -> i64 {
        self.signature_max_age_hours.saturating_mul(60 * 60 * 1000)
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl AppConfig {
    pub fn for_tests() -> Self {
        Self {
            port: 8080,
            bind_addr: String::from("127.0.0.1"),
            mongodb_uri: String::from("mongodb://127.0.0.1:27017"),
            database_name: String::from("loyalty_test"),
            jwt_secret: String::from("test-jwt-secret"),
            qr_secret: String::from("test-qr-secret"),
            signing_scheme: SigningScheme::HmacSha256,
            signature_max_age_hours: 24,
            card_validity_days: 365,
            image: ImageServiceConfig::default(),
            cors_origins: vec![String::from("http://localhost:5173")],
            cache_capacity: 16,
            cache_ttl_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_max_age_is_converted_to_millis() {
        let config = AppConfig::for_tests();
        assert_eq!(config.signature_max_age_ms(), 24 * 60 * 60 * 1000);
    }

    #[test]
    fn huge_signature_max_age_saturates() {
        let config = AppConfig {
            signature_max_age_hours: i64::MAX,
            ..AppConfig::for_tests()
        };
        assert_eq!(config.signature_max_age_ms(), i64::MAX);
    }

    #[test]
    fn image_defaults_point_at_public_service() {
        let image = ImageServiceConfig::default();
        assert!(image.base_url.starts_with("https://"));
        assert_eq!(image.size, 300);
        assert!(!image.probe);
    }
}
