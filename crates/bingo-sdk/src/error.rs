use thiserror::Error;

/// Failures surfaced by the command/query client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No base URL could be resolved; fatal to every network call.
    #[error(
        "backend url is not configured; set BINGO_API_BASE_URL (or SHEET_URL) or run `bingo config set-base-url <URL>`"
    )]
    Config,
    /// Non-success HTTP status. `body` is the best-effort response text (POST only).
    #[error("HTTP {status}{}", body_suffix(.body))]
    Http { status: u16, body: Option<String> },
    #[error("network error: {0}")]
    Network(String),
    /// A GET returned a success status with a body that is not the expected JSON.
    #[error("malformed response: {0}")]
    Decode(String),
    /// A success response that lacks a field the caller cannot do without.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid request payload: {0}")]
    Encode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn body_suffix(body: &Option<String>) -> String {
    match body.as_deref() {
        Some(text) if !text.is_empty() => format!("\n{text}"),
        _ => String::new(),
    }
}
