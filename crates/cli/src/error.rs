use thiserror::Error;

use crate::client::ClientError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("{0}")]
    Client(#[from] ClientError),
    #[error("{0}")]
    Engine(#[from] engine::EngineError),
    #[error("failed to save: {0}")]
    Persistence(#[from] engine::PersistenceError),
    #[error("{0}")]
    Usage(String),
}
