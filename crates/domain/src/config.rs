//! Environment-driven configuration shared by the SDK binaries.

use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::model::ImageFormat;

/// Default resolution endpoint used when `SPECIFY_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "https://app.specify.sh/api";

/// SDK configuration derived from `.env`/process variables so binaries can
/// share a deterministic environment contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkConfig {
    publisher_key: String,
    base_url: String,
    cache_db_url: Option<String>,
    cache_file: Option<String>,
    image_format: Option<ImageFormat>,
    ad_unit_id: Option<String>,
}

impl SdkConfig {
    /// Loads configuration by hydrating `.env` (if present) and reading the
    /// process variables. Missing or malformed entries surface as
    /// `ConfigError` so binaries can respond gracefully.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        let image_format = match get_optional_var("SPECIFY_IMAGE_FORMAT") {
            Some(raw) => Some(ImageFormat::from_str(&raw).map_err(|_| {
                ConfigError::InvalidImageFormat {
                    key: "SPECIFY_IMAGE_FORMAT",
                    value: raw,
                }
            })?),
            None => None,
        };

        Ok(Self {
            publisher_key: get_required_var("SPECIFY_PUBLISHER_KEY")?,
            base_url: get_optional_var("SPECIFY_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            cache_db_url: get_optional_var("SPECIFY_CACHE_DB"),
            cache_file: get_optional_var("SPECIFY_CACHE_FILE"),
            image_format,
            ad_unit_id: get_optional_var("SPECIFY_AD_UNIT_ID"),
        })
    }

    pub fn publisher_key(&self) -> &str {
        &self.publisher_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache_db_url(&self) -> Option<&str> {
        self.cache_db_url.as_deref()
    }

    pub fn cache_file(&self) -> Option<&str> {
        self.cache_file.as_deref()
    }

    pub fn image_format(&self) -> Option<ImageFormat> {
        self.image_format
    }

    pub fn ad_unit_id(&self) -> Option<&str> {
        self.ad_unit_id.as_deref()
    }

    pub fn has_persistent_cache(&self) -> bool {
        self.cache_db_url.is_some() || self.cache_file.is_some()
    }
}

fn get_required_var(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(ConfigError::MissingVar { key })
            } else {
                Ok(trimmed.to_string())
            }
        }
        Err(_) => Err(ConfigError::MissingVar { key }),
    }
}

fn get_optional_var(key: &'static str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn hydrate_env_file() -> Result<(), ConfigError> {
    if env::var_os("SPECIFY_SKIP_DOTENV").is_some() {
        return Ok(());
    }
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(ConfigError::Dotenv { source: err }),
    }

    Ok(())
}

/// Errors emitted when `.env` hydration or environment parsing fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable `{key}`")]
    MissingVar { key: &'static str },
    #[error("invalid image format in `{key}`: `{value}`")]
    InvalidImageFormat { key: &'static str, value: String },
    #[error("failed to load .env file: {source}")]
    Dotenv {
        #[from]
        source: dotenvy::Error,
    },
}
