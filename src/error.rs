//! Error types for the input engines.

use crate::modifier::ModifierMask;
use thiserror::Error;

/// Result type alias for polled-input operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can abort a poll.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A modifier transition fell outside every branch of the classification
    /// table. The poll is aborted and no events from it are delivered.
    #[error("invalid modifier state: {last:?} -> {new:?}")]
    InvalidModifierState {
        /// Modifiers seen on this poll.
        new: ModifierMask,
        /// Modifiers seen on the previous poll.
        last: ModifierMask,
    },
}
