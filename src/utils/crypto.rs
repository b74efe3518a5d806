//! Public-key authenticated encryption.
//!
//! A `Crypto` is built from the local private key and the peer's public key.
//! X25519 gives a shared secret, SHA-256 over a domain label and that secret
//! gives a 256-bit key, and XChaCha20-Poly1305 seals each message under a
//! caller-supplied 24-byte nonce. Both peers derive the same key, so a frame
//! sealed by one side opens on the other.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroizing;

use crate::core::keys::{PrivateKey, PublicKey, KEY_SIZE};
use crate::core::nonce::Nonce;
use crate::error::{constants, ChannelError, Result};

/// Poly1305 authentication tag size in bytes
pub const TAG_SIZE: usize = 16;

const KEY_LABEL: &[u8] = b"secure-echo box v1";

/// Symmetric cipher bound to one (local private, peer public) pair
#[derive(Clone)]
pub struct Crypto {
    cipher: XChaCha20Poly1305,
}

impl Crypto {
    /// Derive the cipher for a key pair.
    ///
    /// # Errors
    /// Returns `ChannelError::InvalidPeerKey` if the peer key is a low-order
    /// point and the shared secret carries no contribution from our key
    pub fn new(local: &PrivateKey, peer: &PublicKey) -> Result<Self> {
        let shared = local.diffie_hellman(peer);
        if !shared.was_contributory() {
            warn!(peer = %peer.fingerprint(), "Rejecting low-order peer key");
            return Err(ChannelError::InvalidPeerKey);
        }

        let key = derive_box_key(shared.as_bytes());
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&key[..]));

        Ok(Self { cipher })
    }

    /// Seal `plaintext`, returning ciphertext with the tag appended
    pub fn encrypt(&self, plaintext: &[u8], nonce: &Nonce) -> Result<Vec<u8>> {
        self.cipher
            .encrypt(XNonce::from_slice(nonce.as_bytes()), plaintext)
            .map_err(|_| {
                warn!("{}", constants::ERR_ENCRYPTION_FAILED);
                ChannelError::EncryptionFailure
            })
    }

    /// Open `ciphertext`. Nothing is returned unless the tag verifies.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &Nonce) -> Result<Vec<u8>> {
        self.cipher
            .decrypt(XNonce::from_slice(nonce.as_bytes()), ciphertext)
            .map_err(|_| ChannelError::AuthenticationFailure)
    }
}

fn derive_box_key(shared: &[u8; KEY_SIZE]) -> Zeroizing<[u8; KEY_SIZE]> {
    let mut hasher = Sha256::new();
    hasher.update(KEY_LABEL);
    hasher.update(shared);
    Zeroizing::new(hasher.finalize().into())
}
