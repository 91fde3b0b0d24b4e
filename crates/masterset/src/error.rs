use thiserror::Error;

#[derive(Error, Debug)]
pub enum MastersetError {
    #[error("Data processing error: {0}")]
    DataProcessing(#[from] masterset_data::DataError),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),
}

pub type Result<T> = std::result::Result<T, MastersetError>;
