use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

/// Server settings shared by every service.
///
/// Sources, lowest precedence first: an optional `configuration.{toml,yaml,json}`
/// file in the working directory, then plain `HOST` / `PORT` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::default().try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
