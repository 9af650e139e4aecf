//! Error types and the last-error register

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::stream::Direction;

/// Main error type for the audio layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("Device enumeration failed: {0}")]
    EnumerationFailed(String),

    #[error("Invalid device index: {0}")]
    InvalidIndex(i32),

    #[error("Invalid stream parameters: {0}")]
    InvalidParameters(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Cannot set {channels} channels: {reason}")]
    ChannelNegotiationFailed { channels: u16, reason: String },

    #[error("Cannot open audio port: {0}")]
    PortOpenFailed(String),

    #[error("Cannot set sample rate to {rate} Hz: {reason}")]
    RateNegotiationFailed { rate: u32, reason: String },

    #[error("Cannot {operation} on a stream opened for {direction}")]
    DirectionMismatch {
        operation: &'static str,
        direction: Direction,
    },

    #[error("Stream is closed")]
    StreamClosed,

    #[error("Audio I/O failed: {0}")]
    Io(String),
}

/// Result type alias for the audio layer
pub type Result<T> = std::result::Result<T, AudioError>;

/// Upper bound on the stored last-error message, in bytes.
pub const MAX_ERROR_LEN: usize = 1024;

/// Last-error register.
///
/// Every failing operation overwrites the message before returning its
/// failure; the message persists until the next failure (success does not
/// clear it). Empty before any failure has occurred. Shared between an
/// [`AudioSystem`](crate::AudioSystem) and every stream it opens.
#[derive(Debug, Default)]
pub struct ErrorState {
    message: Mutex<String>,
}

impl ErrorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the register with this error's description.
    pub fn record(&self, err: &AudioError) {
        let mut text = err.to_string();
        if text.len() > MAX_ERROR_LEN {
            let mut end = MAX_ERROR_LEN;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            text.truncate(end);
        }
        tracing::debug!("audio error: {}", text);
        *self.message.lock() = text;
    }

    /// Current register contents; empty if nothing has failed yet.
    pub fn last(&self) -> String {
        self.message.lock().clone()
    }
}

/// Thread-safe handle to a shared error register
pub type SharedErrorState = Arc<ErrorState>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_before_first_failure() {
        let state = ErrorState::new();
        assert_eq!(state.last(), "");
    }

    #[test]
    fn test_last_write_wins() {
        let state = ErrorState::new();
        state.record(&AudioError::InvalidIndex(7));
        state.record(&AudioError::StreamClosed);
        assert_eq!(state.last(), "Stream is closed");
    }

    #[test]
    fn test_long_message_is_bounded() {
        let state = ErrorState::new();
        state.record(&AudioError::Io("x".repeat(4 * MAX_ERROR_LEN)));
        assert!(state.last().len() <= MAX_ERROR_LEN);
        assert!(state.last().starts_with("Audio I/O failed"));
    }
}
