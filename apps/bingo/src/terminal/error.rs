use bingo_sdk::{ClientError, PreferenceError};
use std::io;
use thiserror::Error;

use crate::error::FlowError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Client(#[from] ClientError),
    #[error("{0}")]
    Flow(#[from] FlowError),
    #[error("preferences: {0}")]
    Preferences(#[from] PreferenceError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("logging initialization failed: {0}")]
    Logging(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
