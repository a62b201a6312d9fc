//! Errors raised by the position adapter.

/// Errors that can occur when building positions or applying moves
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// FEN text rejected by the rules backend
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    /// Move is not legal in the given position
    #[error("Illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },

    /// Move text is not coordinate notation, or names no legal move
    #[error("Cannot parse move '{0}'")]
    InvalidMoveText(String),
}

/// Result type alias for position operations
pub type CoreResult<T> = Result<T, CoreError>;
