//! Raw public-key exchange.
//!
//! Each side writes its 32-byte X25519 public key and reads the peer's. The
//! initiator writes first; the responder reads first and only generates its
//! key pair once the peer's key has arrived. A short read or write aborts the
//! handshake and no `Session` is built.
//!
//! Nothing binds the exchanged keys to an identity, so an active attacker can
//! substitute its own keys in both directions.

use rand::rngs::OsRng;
use rand::TryCryptoRng;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument, warn};

use crate::core::keys::{KeyPair, PublicKey, KEY_SIZE};
use crate::error::{constants, ChannelError, Result};
use crate::protocol::session::Session;
use crate::utils::metrics::{global_metrics, Timer};

/// Bytes each side sends during the handshake
pub const HANDSHAKE_LEN: usize = KEY_SIZE;

/// Which side of the exchange we are on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Writes its key first
    Initiator,
    /// Reads the peer's key first
    Responder,
}

/// Run the handshake as initiator with keys from the OS entropy source
pub async fn initiate<S>(stream: &mut S) -> Result<Session>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    perform(stream, Role::Initiator, &mut OsRng).await
}

/// Run the handshake as responder with keys from the OS entropy source
pub async fn respond<S>(stream: &mut S) -> Result<Session>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    perform(stream, Role::Responder, &mut OsRng).await
}

/// Run the handshake for `role`, drawing the local key pair from `rng`.
///
/// # Errors
/// - `HandshakeIncomplete` if fewer than 32 bytes go out or come back
/// - `TransportRead` / `TransportWrite` on I/O failure
/// - `RandomnessUnavailable` if `rng` cannot produce a key
/// - `InvalidPeerKey` for a low-order peer key
#[instrument(skip(stream, rng))]
pub async fn perform<S, R>(stream: &mut S, role: Role, rng: &mut R) -> Result<Session>
where
    S: AsyncRead + AsyncWrite + Unpin,
    R: TryCryptoRng + ?Sized,
{
    let metrics = global_metrics();
    metrics.handshake_attempt();
    let _timer = Timer::start("handshake");

    let result = exchange(stream, role, rng).await;

    match &result {
        Ok(session) => {
            metrics.handshake_success();
            debug!(
                local = %session.local_public().fingerprint(),
                peer = %session.peer_public().fingerprint(),
                "Handshake complete"
            );
        }
        Err(e) => {
            metrics.handshake_failed();
            warn!(error = %e, "Handshake failed");
        }
    }

    result
}

async fn exchange<S, R>(stream: &mut S, role: Role, rng: &mut R) -> Result<Session>
where
    S: AsyncRead + AsyncWrite + Unpin,
    R: TryCryptoRng + ?Sized,
{
    match role {
        Role::Initiator => {
            let local = KeyPair::generate(rng)?;
            send_public_key(stream, local.public()).await?;
            let peer = receive_public_key(stream).await?;
            Session::new(local, peer)
        }
        Role::Responder => {
            let peer = receive_public_key(stream).await?;
            let local = KeyPair::generate(rng)?;
            send_public_key(stream, local.public()).await?;
            Session::new(local, peer)
        }
    }
}

async fn send_public_key<S>(stream: &mut S, key: &PublicKey) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let bytes = key.as_bytes();
    let mut written = 0;

    while written < HANDSHAKE_LEN {
        let n = stream
            .write(&bytes[written..])
            .await
            .map_err(ChannelError::TransportWrite)?;
        if n == 0 {
            debug!(written, "{}", constants::ERR_PARTIAL_KEY_WRITE);
            return Err(ChannelError::HandshakeIncomplete {
                expected: HANDSHAKE_LEN,
                actual: written,
            });
        }
        written += n;
    }

    stream.flush().await.map_err(ChannelError::TransportWrite)
}

async fn receive_public_key<S>(stream: &mut S) -> Result<PublicKey>
where
    S: AsyncRead + Unpin,
{
    let mut buf = [0u8; HANDSHAKE_LEN];
    let mut filled = 0;

    while filled < HANDSHAKE_LEN {
        let n = stream
            .read(&mut buf[filled..])
            .await
            .map_err(ChannelError::TransportRead)?;
        if n == 0 {
            debug!(filled, "{}", constants::ERR_PARTIAL_KEY_READ);
            return Err(ChannelError::HandshakeIncomplete {
                expected: HANDSHAKE_LEN,
                actual: filled,
            });
        }
        filled += n;
    }

    Ok(PublicKey::from_bytes(buf))
}
