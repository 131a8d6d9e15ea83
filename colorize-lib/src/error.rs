//! Error types for colorize.
//!
//! The override engine itself never fails; only palette construction,
//! configuration loading and stylesheet parsing report errors.

use thiserror::Error;

/// Errors produced while setting colorize up.
#[derive(Debug, Error)]
pub enum ColorizeError {
    /// A palette original could not be resolved to a color.
    #[error("unrecognized palette color: {0}")]
    UnrecognizedColor(String),

    /// A replacement value resolves to the same color as another palette
    /// original, so a second pass would rewrite it again.
    #[error("replacement '{replacement}' collides with palette original '{original}'")]
    ReplacementCollides {
        replacement: String,
        original: String,
    },

    /// A stylesheet could not be parsed at all.
    #[error("stylesheet parse error: {0}")]
    Stylesheet(String),

    /// The configuration file was not valid JSON for `ColorizeConfig`.
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    /// Reading or writing a file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
