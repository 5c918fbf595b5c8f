use thiserror::Error;

/// Errors raised by chart calculation and the remote analysis client
#[derive(Debug, Error)]
pub enum BaziError {
    /// Malformed birth tuple: month, day or hour out of range
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Element tally sums to zero, so no percentages can be taken
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// Chat-completion call failed (HTTP status, transport, or malformed body)
    #[error("remote service error: {0}")]
    RemoteService(String),
}

pub type Result<T> = std::result::Result<T, BaziError>;
