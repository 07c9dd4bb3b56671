use thiserror::Error;
use crate::product_actor::ProductError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: expected a positive integer")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Product error: {0}")]
    Product(#[from] ProductError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Actor task failed: {0}")]
    ActorTaskFailed(String),
}
