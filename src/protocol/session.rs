//! Per-connection key material.

use crate::core::keys::{KeyPair, PublicKey};
use crate::utils::crypto::Crypto;

/// Key material agreed by one handshake.
///
/// Owned by exactly one connection. The private key is erased when the
/// session is dropped.
pub struct Session {
    local: KeyPair,
    peer: PublicKey,
    crypto: Crypto,
}

impl Session {
    /// Bind a local key pair to the peer's public key.
    ///
    /// # Errors
    /// Returns `ChannelError::InvalidPeerKey` for a low-order peer key
    pub fn new(local: KeyPair, peer: PublicKey) -> crate::error::Result<Self> {
        let crypto = Crypto::new(local.private(), &peer)?;
        Ok(Self {
            local,
            peer,
            crypto,
        })
    }

    pub fn local_public(&self) -> &PublicKey {
        self.local.public()
    }

    pub fn peer_public(&self) -> &PublicKey {
        &self.peer
    }

    pub(crate) fn crypto(&self) -> &Crypto {
        &self.crypto
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("local", self.local.public())
            .field("peer", &self.peer)
            .finish_non_exhaustive()
    }
}
