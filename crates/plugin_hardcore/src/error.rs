//! Error types for the hardcore plugin.

use hardcore_system::HardcoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Hardcore system error: {0}")]
    Hardcore(#[from] HardcoreError),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Malformed event payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
