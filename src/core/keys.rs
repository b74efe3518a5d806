//! X25519 key material.
//!
//! Public keys are plain 32-byte values that travel over the wire during the
//! handshake. Private keys wrap `x25519_dalek::StaticSecret`, which is erased
//! when dropped, and never leave the process.

use std::fmt;

use rand::rngs::OsRng;
use rand::TryCryptoRng;
use x25519_dalek::{PublicKey as DalekPublic, SharedSecret, StaticSecret};
use zeroize::Zeroizing;

use crate::error::{constants, ChannelError, Result};

/// Size of public and private keys in bytes
pub const KEY_SIZE: usize = 32;

/// A 32-byte X25519 public key
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; KEY_SIZE]);

impl PublicKey {
    /// Wrap raw key bytes
    pub const fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Copy out the raw key bytes
    pub fn to_bytes(self) -> [u8; KEY_SIZE] {
        self.0
    }

    /// Short hex prefix used to identify the key in logs
    pub fn fingerprint(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl From<[u8; KEY_SIZE]> for PublicKey {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = ChannelError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; KEY_SIZE] =
            bytes
                .try_into()
                .map_err(|_| ChannelError::HandshakeIncomplete {
                    expected: KEY_SIZE,
                    actual: bytes.len(),
                })?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}..)", self.fingerprint())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// A 32-byte X25519 private key, erased on drop
pub struct PrivateKey(StaticSecret);

impl PrivateKey {
    /// Derive the matching public key
    pub fn public_key(&self) -> PublicKey {
        PublicKey(DalekPublic::from(&self.0).to_bytes())
    }

    pub(crate) fn diffie_hellman(&self, peer: &PublicKey) -> SharedSecret {
        self.0.diffie_hellman(&DalekPublic::from(peer.0))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// Key pair for one endpoint of one session
#[derive(Debug)]
pub struct KeyPair {
    public: PublicKey,
    private: PrivateKey,
}

impl KeyPair {
    /// Generate a key pair from the given secure random source.
    ///
    /// # Errors
    /// Returns `ChannelError::RandomnessUnavailable` if the source fails
    pub fn generate<R: TryCryptoRng + ?Sized>(rng: &mut R) -> Result<Self> {
        let mut seed = Zeroizing::new([0u8; KEY_SIZE]);
        rng.try_fill_bytes(&mut seed[..]).map_err(|e| {
            ChannelError::RandomnessUnavailable(format!(
                "{}: {e}",
                constants::ERR_RANDOMNESS_UNAVAILABLE
            ))
        })?;

        let secret = StaticSecret::from(*seed);
        let public = PublicKey(DalekPublic::from(&secret).to_bytes());

        Ok(Self {
            public,
            private: PrivateKey(secret),
        })
    }

    /// Generate a key pair from the operating system's entropy source
    pub fn generate_os() -> Result<Self> {
        Self::generate(&mut OsRng)
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    pub fn private(&self) -> &PrivateKey {
        &self.private
    }
}
