//! Service configuration: defaults, then `dados.toml`, then `DADOS_*` env vars, then CLI flags.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "dados.toml";
pub const ENV_PREFIX: &str = "DADOS_";

/// How `GET /dados` presents a store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingErrors {
    /// Plain-text 500 carrying the error message.
    #[default]
    Passthrough,
    /// 500 with the same `{"status":"erro","detalhe":..}` body the ingestion route uses.
    Envelope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub store_path: PathBuf,
    #[serde(default)]
    pub listing_errors: ListingErrors,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            store_path: PathBuf::from("dados.json"),
            listing_errors: ListingErrors::default(),
        }
    }
}

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

impl ServiceConfig {
    pub fn figment(config_file: &Path, overrides: &ConfigOverrides) -> Figment {
        Figment::from(Serialized::defaults(ServiceConfig::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides))
    }

    pub fn load(config_file: &Path, overrides: &ConfigOverrides) -> Result<Self, figment::Error> {
        let config: ServiceConfig = Self::figment(config_file, overrides).extract()?;

        if config.store_path.as_os_str().is_empty() {
            return Err(figment::Error::from("store_path must not be empty"));
        }
        config
            .host
            .parse::<IpAddr>()
            .map_err(|e| figment::Error::from(format!("invalid host {:?}: {e}", config.host)))?;

        Ok(config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        let ip: IpAddr = self.host.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
