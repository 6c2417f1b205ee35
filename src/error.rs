//! Error types for the game shell
//!
//! The simulation itself never fails; only the environment around it can.

/// Error type for startup and I/O failures
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    /// Terminal smaller than the minimum supported play field
    #[error(
        "Terminal size must be at least {min_width}x{min_height} (current size: {width}x{height}). Please resize your terminal and try again."
    )]
    TerminalTooSmall {
        width: u16,
        height: u16,
        min_width: u16,
        min_height: u16,
    },

    /// IO error from terminal or filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON in a settings or score file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for game shell operations
pub type Result<T> = std::result::Result<T, GameError>;
