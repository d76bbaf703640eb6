use std::path::PathBuf;

use bilimcert_core::context::Language;
use bilimcert_gateway::{GatewaySettings, DEFAULT_API_URL};
use thiserror::Error;
use url::Url;

pub const ENV_API_URL: &str = "BILIMCERT_API_URL";
pub const ENV_APP_URL: &str = "BILIMCERT_APP_URL";
pub const ENV_RECAPTCHA_SITE_KEY: &str = "BILIMCERT_RECAPTCHA_SITE_KEY";
pub const ENV_GOOGLE_VERIFICATION: &str = "BILIMCERT_GOOGLE_VERIFICATION";
pub const ENV_YANDEX_VERIFICATION: &str = "BILIMCERT_YANDEX_VERIFICATION";
pub const ENV_STATE_DIR: &str = "BILIMCERT_STATE_DIR";

const DEFAULT_APP_URL: &str = "http://localhost:3000";
const DEFAULT_STATE_DIR: &str = "./.bilimcert";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} is not an absolute http(s) url: {value}")]
    InvalidUrl { key: &'static str, value: String },
}

/// Deployment settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub api_url: Url,
    pub app_url: Url,
    pub recaptcha_site_key: Option<String>,
    pub google_verification: Option<String>,
    pub yandex_verification: Option<String>,
    pub state_dir: PathBuf,
}

impl SiteConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_url = parse_http_url(
            ENV_API_URL,
            get(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        )?;
        let app_url = parse_http_url(
            ENV_APP_URL,
            get(ENV_APP_URL).unwrap_or_else(|| DEFAULT_APP_URL.to_string()),
        )?;

        Ok(Self {
            api_url,
            app_url,
            recaptcha_site_key: get(ENV_RECAPTCHA_SITE_KEY),
            google_verification: get(ENV_GOOGLE_VERIFICATION),
            yandex_verification: get(ENV_YANDEX_VERIFICATION),
            state_dir: PathBuf::from(
                get(ENV_STATE_DIR).unwrap_or_else(|| DEFAULT_STATE_DIR.to_string()),
            ),
        })
    }

    pub fn gateway_settings(&self, language: Language) -> GatewaySettings {
        GatewaySettings::default()
            .with_base_url(self.api_url.as_str())
            .with_language(language.code())
    }
}

fn parse_http_url(key: &'static str, value: String) -> Result<Url, ConfigError> {
    match Url::parse(&value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(url),
        _ => Err(ConfigError::InvalidUrl { key, value }),
    }
}
