//! Per-message nonces.

use rand::TryCryptoRng;

use crate::error::{constants, ChannelError, Result};

/// Size of a nonce in bytes
pub const NONCE_SIZE: usize = 24;

/// A 24-byte nonce. A fresh value is drawn for every sealed frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    /// Draw a uniformly random nonce from a secure random source.
    ///
    /// Both directions of a session seal under the same key, so nonces must
    /// be random rather than per-direction counters.
    ///
    /// # Errors
    /// Returns `ChannelError::RandomnessUnavailable` if the source fails
    pub fn fresh<R: TryCryptoRng + ?Sized>(rng: &mut R) -> Result<Self> {
        let mut bytes = [0u8; NONCE_SIZE];
        rng.try_fill_bytes(&mut bytes).map_err(|e| {
            ChannelError::RandomnessUnavailable(format!(
                "{}: {e}",
                constants::ERR_RANDOMNESS_UNAVAILABLE
            ))
        })?;
        Ok(Self(bytes))
    }

    pub const fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}
