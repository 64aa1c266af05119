//! Command-line arguments for the CRI binary.

use std::path::PathBuf;

use clap::Parser;

use podgate_core::{GateConfig, LogFormat, Result};

/// Podgate CRI Runtime
#[derive(Parser, Debug)]
#[command(name = "podgate-cri", about = "Podgate CRI adapter", version)]
pub struct Args {
    /// YAML configuration file. Flags below override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the Unix domain socket for CRI communication.
    #[arg(long)]
    pub socket: Option<PathBuf>,

    /// Default log filter when RUST_LOG is unset (e.g. "info", "podgate_cri=debug").
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log output format: text or json.
    #[arg(long)]
    pub log_format: Option<LogFormat>,
}

impl Args {
    /// Build the effective configuration: defaults, then the config file,
    /// then command-line flags.
    pub fn into_config(self) -> Result<GateConfig> {
        let mut config = match self.config {
            Some(ref path) => GateConfig::from_file(path)?,
            None => GateConfig::default(),
        };

        if let Some(socket) = self.socket {
            config.socket_path = socket;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }

        config.validate()?;
        Ok(config)
    }
}
