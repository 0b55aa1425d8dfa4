use thiserror::Error;

/// Failures turning a detector glyph into an [`EmojiCode`](crate::types::EmojiCode).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GlyphError {
    #[error("Empty emoji glyph")]
    Empty,

    #[error("Unpaired surrogate in emoji glyph: {0:#06x}")]
    UnpairedSurrogate(u16),

    #[error("Emoji glyph spans {0} UTF-16 units, expected a single code point")]
    TooLong(usize),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration from {path}")]
    ParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Game session is closed")]
    Closed,
}
