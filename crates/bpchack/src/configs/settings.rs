use std::path::PathBuf;

use config::{Environment, File, FileFormat};
use serde::Deserialize;

use crate::errors::{ApplicationError, ApplicationResult};

/// Environment variable naming the configuration file.
pub const CONFIG_FILE_ENV: &str = "BPCHACK_CONFIG_FILE";

/// Fallback configuration file path.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(clap::Parser, Default, Debug)]
#[command(version, about = "BPC hack proxy")]
pub struct CmdLineConf {
    /// Config file. The application falls back to `BPCHACK_CONFIG_FILE` and
    /// then to "config.json" if this option isn't specified.
    #[arg(short = 'f', long)]
    pub config_path: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    /// Address the HTTP API binds to, e.g. `127.0.0.1:8080`.
    pub listen_address: String,
    /// Base URL of the vendor MPI, without a trailing slash.
    pub base_mpi_url: String,
}

impl Settings {
    /// Reads the JSON configuration file (command line, then environment,
    /// then the default path) and applies `BPCHACK_`-prefixed environment
    /// overrides on top.
    pub fn with_config_path(config_path: Option<PathBuf>) -> ApplicationResult<Self> {
        let path = config_path
            .or_else(|| std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let config = config::Config::builder()
            .add_source(File::from(path).format(FileFormat::Json))
            .add_source(Environment::with_prefix("BPCHACK"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn validate(&self) -> ApplicationResult<()> {
        if self.listen_address.trim().is_empty() {
            return Err(ApplicationError::InvalidConfigurationValueError(
                "listen address must not be empty".into(),
            ));
        }
        if !self.base_mpi_url.starts_with("http://") && !self.base_mpi_url.starts_with("https://")
        {
            return Err(ApplicationError::InvalidConfigurationValueError(
                "base MPI url must be an http(s) url".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn validate_accepts_sane_settings() {
        let settings = Settings {
            listen_address: "127.0.0.1:8080".to_owned(),
            base_mpi_url: "https://mpi.example.com/payment".to_owned(),
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_listen_address() {
        let settings = Settings {
            listen_address: "  ".to_owned(),
            base_mpi_url: "https://mpi.example.com".to_owned(),
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_http_mpi_url() {
        let settings = Settings {
            listen_address: "127.0.0.1:8080".to_owned(),
            base_mpi_url: "ftp://mpi.example.com".to_owned(),
        };
        assert!(settings.validate().is_err());
    }
}
