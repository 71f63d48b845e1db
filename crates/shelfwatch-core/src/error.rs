use thiserror::Error;

/// All the ways things can go wrong in ShelfWatch
///
/// We use thiserror here because it generates the boilerplate for us.
/// Life's too short to manually implement Display and Error traits.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Store operation failed: {0}")]
    StoreError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Invalid {field} date: {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("Notification delivery failed: {0}")]
    DeliveryError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
