//! Wire frame for the message phase.
//!
//! ```text
//! [Nonce(24)] [Ciphertext + Tag(N + 16)]
//! ```
//!
//! There is no length prefix. A frame's end is wherever the transport read
//! that carried it ended.

use bytes::{BufMut, Bytes, BytesMut};

use crate::core::nonce::{Nonce, NONCE_SIZE};
use crate::error::{ChannelError, Result};
use crate::utils::crypto::TAG_SIZE;

/// Bytes a frame adds on top of its plaintext
pub const FRAME_OVERHEAD: usize = NONCE_SIZE + TAG_SIZE;

/// One sealed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub nonce: Nonce,
    pub ciphertext: Bytes,
}

impl Frame {
    pub fn new(nonce: Nonce, ciphertext: impl Into<Bytes>) -> Self {
        Self {
            nonce,
            ciphertext: ciphertext.into(),
        }
    }

    /// Largest frame that can carry a plaintext of `capacity` bytes
    pub const fn max_len(capacity: usize) -> usize {
        capacity + FRAME_OVERHEAD
    }

    /// Plaintext length this frame decrypts to
    pub fn plaintext_len(&self) -> usize {
        self.ciphertext.len().saturating_sub(TAG_SIZE)
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(NONCE_SIZE + self.ciphertext.len());
        buf.put_slice(self.nonce.as_bytes());
        buf.put_slice(&self.ciphertext);
        buf.freeze()
    }

    /// Split raw bytes into nonce and ciphertext.
    ///
    /// Anything shorter than a nonce plus a tag can never authenticate and is
    /// rejected up front.
    pub fn decode(mut bytes: Bytes) -> Result<Self> {
        if bytes.len() < FRAME_OVERHEAD {
            return Err(ChannelError::AuthenticationFailure);
        }

        let ciphertext = bytes.split_off(NONCE_SIZE);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes);

        Ok(Self {
            nonce: Nonce::from_bytes(nonce),
            ciphertext,
        })
    }
}
