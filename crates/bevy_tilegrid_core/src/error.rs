use thiserror::Error;

/// Errors from loading or saving grids and grid configuration
#[derive(Debug, Error)]
pub enum GridError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid grid format: {0}")]
    InvalidFormat(String),
}
