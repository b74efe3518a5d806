//! # Error Types
//!
//! Error handling for the secure channel.
//!
//! Every failure in key generation, the handshake, framing, or the echo
//! service is reported as a [`ChannelError`] to the immediate caller. Nothing
//! is retried internally and nothing is swallowed.
//!
//! ## Error Categories
//! - **Entropy**: the secure random source could not supply bytes
//! - **Transport**: read/write failures on the underlying stream
//! - **Handshake**: short key exchange, unusable peer keys
//! - **Cryptographic**: frames that fail authentication
//! - **Configuration**: unreadable or invalid settings
//!
//! ## Example Usage
//! ```rust
//! use secure_echo::error::{ChannelError, Result};
//! use tracing::error;
//!
//! fn check_frame(len: usize) -> Result<()> {
//!     if len < secure_echo::core::frame::FRAME_OVERHEAD {
//!         return Err(ChannelError::AuthenticationFailure);
//!     }
//!     Ok(())
//! }
//!
//! if let Err(e) = check_frame(3) {
//!     error!(error = %e, "Frame rejected");
//! }
//! ```

use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Entropy errors
    pub const ERR_RANDOMNESS_UNAVAILABLE: &str = "Secure random source unavailable";

    /// Handshake errors
    pub const ERR_PARTIAL_KEY_WRITE: &str = "Partial public key write";
    pub const ERR_PARTIAL_KEY_READ: &str = "Partial public key read";

    /// Cryptographic errors
    pub const ERR_ENCRYPTION_FAILED: &str = "Encryption failed";

    /// Echo service errors
    pub const ERR_NO_MESSAGE: &str = "Peer closed the connection before sending a message";
}

/// Primary error type for all channel operations
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Randomness unavailable: {0}")]
    RandomnessUnavailable(String),

    #[error("Transport read error: {0}")]
    TransportRead(#[source] io::Error),

    #[error("Transport write error: {0}")]
    TransportWrite(#[source] io::Error),

    #[error("Handshake incomplete: expected {expected} bytes, got {actual}")]
    HandshakeIncomplete { expected: usize, actual: usize },

    #[error("Peer public key produces a non-contributory shared secret")]
    InvalidPeerKey,

    #[error("Message authentication failed")]
    AuthenticationFailure,

    #[error("Encryption failed")]
    EncryptionFailure,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ChannelError {
    /// True only for frames that failed authentication. Callers may drop the
    /// offending frame and keep reading; every other error ends the channel.
    pub fn is_rejected_message(&self) -> bool {
        matches!(self, ChannelError::AuthenticationFailure)
    }
}

/// Type alias for Results using ChannelError
pub type Result<T> = std::result::Result<T, ChannelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_incomplete_message() {
        let err = ChannelError::HandshakeIncomplete {
            expected: 32,
            actual: 16,
        };
        assert_eq!(
            err.to_string(),
            "Handshake incomplete: expected 32 bytes, got 16"
        );
    }

    #[test]
    fn test_only_authentication_failure_is_rejected_message() {
        assert!(ChannelError::AuthenticationFailure.is_rejected_message());
        assert!(!ChannelError::ConnectionClosed.is_rejected_message());
        assert!(!ChannelError::InvalidPeerKey.is_rejected_message());
        assert!(!ChannelError::HandshakeIncomplete {
            expected: 32,
            actual: 0
        }
        .is_rejected_message());
        assert!(!ChannelError::EncryptionFailure.is_rejected_message());
    }

    #[test]
    fn test_encryption_failure_message() {
        assert_eq!(
            ChannelError::EncryptionFailure.to_string(),
            constants::ERR_ENCRYPTION_FAILED
        );
    }
}
