use clap::Parser;
use std::path::PathBuf;

use crate::config::{ConfigOverrides, DEFAULT_CONFIG_FILE};

/// Command-line interface for the ingestion server
#[derive(Parser, Debug)]
#[command(
    name = "dados-server",
    version,
    about = "Accepts JSON records over HTTP and appends them to a JSON file"
)]
pub struct Cli {
    /// TOML config file (optional; missing file means defaults)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Host/IP to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind
    #[arg(long)]
    pub port: Option<u16>,

    /// Path of the JSON file holding the collection
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            store_path: self.store.clone(),
        }
    }
}
