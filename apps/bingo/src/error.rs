use bingo_sdk::ClientError;
use thiserror::Error;

/// Failures of the host and player flows.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("invalid game settings: {0}")]
    InvalidConfig(String),
    #[error("invalid public url '{url}': {reason}")]
    InvalidPublicUrl { url: String, reason: String },
}
