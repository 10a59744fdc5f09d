//! Error types for the tour core.

use thiserror::Error;

use crate::types::CharacterId;

/// Top-level error type for all tour-core operations.
#[derive(Error, Debug)]
pub enum TourError {
    /// Two roster entries share the same name.
    #[error("Duplicate character identity: {name}")]
    DuplicateCharacter {
        /// The repeated name.
        name: String,
    },

    /// A character starts outside the walkable arena.
    #[error("Character {name} starts outside the arena at ({x:.1}, {z:.1})")]
    OutsideArena {
        /// Character name.
        name: String,
        /// Start X.
        x: f32,
        /// Start Z.
        z: f32,
    },

    /// No character with this id exists in the roster.
    #[error("Character not found: {0}")]
    CharacterNotFound(CharacterId),

    /// A dialogue action was issued while no session is open.
    #[error("No dialogue session is open")]
    NoSession,

    /// A second reply was requested while one is still outstanding.
    #[error("A reply is already pending for this session")]
    ReplyPending,

    /// The selected option index does not exist.
    #[error("Option {index} out of range ({available} available)")]
    OptionOutOfRange {
        /// Requested index.
        index: usize,
        /// Options currently presented.
        available: usize,
    },

    /// A free-text question was empty after trimming.
    #[error("Question is empty")]
    EmptyQuestion,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, TourError>;
