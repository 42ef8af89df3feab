use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::satisfaction::SatisfactionEncoding;

pub const DEFAULT_CONFIG_FILE: &str = "flightdash.toml";
pub const CONFIG_PATH_ENV: &str = "FLIGHTDASH_CONFIG";
pub const ENV_PREFIX: &str = "FLIGHTDASH_";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub price: PriceConfig,
    #[serde(default)]
    pub satisfaction: SatisfactionConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives; `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "flightdash=info,tower_http=info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PriceConfig {
    pub model: PathBuf,
    pub dataset: PathBuf,
    /// Half-width of the displayed price range, as a fraction of the price.
    pub band: f64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        PriceConfig {
            model: PathBuf::from("models/flight_price.json"),
            dataset: PathBuf::from("data/flight_price.csv"),
            band: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SatisfactionConfig {
    pub encoding: SatisfactionEncoding,
    pub model: PathBuf,
    pub dataset: PathBuf,
    pub histogram_bins: usize,
}

impl Default for SatisfactionConfig {
    fn default() -> Self {
        SatisfactionConfig {
            encoding: SatisfactionEncoding::TravelCombo,
            model: PathBuf::from("models/passenger_satisfaction.json"),
            dataset: PathBuf::from("data/passenger_satisfaction.csv"),
            histogram_bins: 30,
        }
    }
}

impl AppConfig {
    fn validate(&self) -> Result<(), figment::Error> {
        if self.server.port == 0 {
            return Err(figment::Error::from("server.port must be non-zero"));
        }
        if !(self.price.band > 0.0 && self.price.band < 1.0) {
            return Err(figment::Error::from(format!(
                "price.band must be between 0 and 1, got {}",
                self.price.band
            )));
        }
        if self.satisfaction.histogram_bins == 0 {
            return Err(figment::Error::from(
                "satisfaction.histogram_bins must be positive",
            ));
        }
        Ok(())
    }
}

/// Layered configuration: built-in defaults, then the TOML file, then
/// `FLIGHTDASH_*` environment variables (`__` separates nested keys).
///
/// The file is `path` when given, else `$FLIGHTDASH_CONFIG`, else
/// `flightdash.toml` in the working directory. Only the implicit default file
/// may be missing; a named one that does not exist is an error.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, figment::Error> {
    let named = match path {
        Some(p) => Some(p.to_path_buf()),
        None => std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from),
    };
    let file = match named {
        Some(file) if !file.exists() => {
            return Err(figment::Error::from(format!(
                "config file {} not found",
                file.display()
            )));
        }
        Some(file) => file,
        None => PathBuf::from(DEFAULT_CONFIG_FILE),
    };

    let figment = Figment::from(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file(&file))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"));

    let config: AppConfig = figment.extract()?;
    config.validate()?;

    Ok(config)
}
