use thiserror::Error;

use crate::catalog::CatalogError;
use crate::routing::RoutingError;

/// Startup errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid listen address {0}")]
    Address(String),

    #[error("route table error: {0}")]
    Routing(#[from] RoutingError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
