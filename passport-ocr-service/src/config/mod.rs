use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default cap on the multipart request body (20MB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    /// `None` when `GEMINI_API_KEY` is unset or empty.
    pub api_key: Option<Secret<String>>,
    pub model: String,
    pub api_base: String,
    /// Outbound request timeout. `None` leaves the call unbounded.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

impl OcrConfig {
    /// Read configuration once at startup. The result is treated as immutable
    /// for the lifetime of the process.
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(OcrConfig {
            common,
            gemini: GeminiSettings {
                api_key: optional_env("GEMINI_API_KEY").map(Secret::new),
                model: optional_env("GEMINI_MODEL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                api_base: optional_env("GEMINI_API_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
                timeout_secs: parse_env("GEMINI_TIMEOUT_SECS")?,
            },
            upload: UploadConfig {
                max_bytes: parse_env("MAX_UPLOAD_BYTES")?.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            },
        })
    }

    pub fn gemini_configured(&self) -> bool {
        self.gemini.api_key.is_some()
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            common: core_config::Config::default(),
            gemini: GeminiSettings {
                api_key: None,
                model: DEFAULT_GEMINI_MODEL.to_string(),
                api_base: DEFAULT_GEMINI_API_BASE.to_string(),
                timeout_secs: None,
            },
            upload: UploadConfig {
                max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    non_empty(env::var(key).ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, optional_env(key))
}

fn parse_value<T>(key: &str, value: Option<String>) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
            })
        })
        .transpose()
}
