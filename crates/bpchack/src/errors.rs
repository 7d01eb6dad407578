pub type ApplicationResult<T> = Result<T, ApplicationError>;

/// Fatal startup errors of the daemon and CLI.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("error loading configuration: {0}")]
    ConfigurationError(#[from] config::ConfigError),

    #[error("invalid configuration value: {0}")]
    InvalidConfigurationValueError(String),

    #[error("i/o error: {0}")]
    IoError(#[from] std::io::Error),
}
