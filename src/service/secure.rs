//! Stream wrappers that seal and open frames.
//!
//! `SecureWriter` turns each `write` into exactly one frame on the
//! underlying stream. `SecureReader` turns exactly one underlying read into
//! one opened message. The pair only lines up when every transport read
//! returns one whole frame: datagram-like transports and the single-message
//! echo exchange satisfy that, a busy TCP stream that splits or merges writes
//! does not.

use bytes::BytesMut;
use rand::rngs::OsRng;
use rand::TryCryptoRng;
use tokio::io::{
    split, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf,
};
use tracing::{debug, instrument, warn};
use zeroize::Zeroizing;

use crate::core::frame::Frame;
use crate::core::keys::{PrivateKey, PublicKey};
use crate::core::nonce::Nonce;
use crate::error::{ChannelError, Result};
use crate::protocol::session::Session;
use crate::utils::crypto::Crypto;
use crate::utils::metrics::global_metrics;

/// Opens frames read from an underlying byte source
pub struct SecureReader<R> {
    inner: R,
    crypto: Crypto,
}

impl<R: AsyncRead + Unpin> SecureReader<R> {
    /// Wrap `inner`, opening frames sealed by `peer` for `local`
    pub fn new(inner: R, local: &PrivateKey, peer: &PublicKey) -> Result<Self> {
        Ok(Self::with_crypto(inner, Crypto::new(local, peer)?))
    }

    pub(crate) fn with_crypto(inner: R, crypto: Crypto) -> Self {
        Self { inner, crypto }
    }

    /// Read one frame and decrypt it into `buf`.
    ///
    /// At most `buf.len() + FRAME_OVERHEAD` bytes are taken from the source
    /// in a single read. Returns the plaintext length; `Ok(0)` is a genuine
    /// empty message.
    ///
    /// # Errors
    /// - `ConnectionClosed` if the source is at end-of-stream
    /// - `TransportRead` if the source fails
    /// - `AuthenticationFailure` if the frame does not verify; `buf` is left
    ///   untouched
    #[instrument(skip(self, buf), fields(capacity = buf.len()), level = "debug")]
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut raw = BytesMut::zeroed(Frame::max_len(buf.len()));
        let n = self.inner.read(&mut raw[..]).await.map_err(|e| {
            global_metrics().connection_error();
            ChannelError::TransportRead(e)
        })?;

        if n == 0 {
            debug!("End of stream");
            return Err(ChannelError::ConnectionClosed);
        }

        raw.truncate(n);
        let frame = Frame::decode(raw.freeze()).inspect_err(|_| {
            global_metrics().authentication_failure();
            warn!(frame_len = n, "Frame shorter than nonce and tag");
        })?;

        let plaintext = Zeroizing::new(
            self.crypto
                .decrypt(&frame.ciphertext, &frame.nonce)
                .inspect_err(|_| {
                    global_metrics().authentication_failure();
                    warn!(frame_len = n, "Frame failed authentication");
                })?,
        );

        let len = plaintext.len().min(buf.len());
        buf[..len].copy_from_slice(&plaintext[..len]);

        global_metrics().message_received(len as u64);
        debug!(frame_len = n, plaintext_len = len, "Opened frame");
        Ok(len)
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Seals writes into frames on an underlying byte sink
pub struct SecureWriter<W, G = OsRng> {
    inner: W,
    crypto: Crypto,
    rng: G,
}

impl<W: AsyncWrite + Unpin> SecureWriter<W> {
    /// Wrap `inner`, sealing for `peer` with `local`. Nonces come from the
    /// OS entropy source.
    pub fn new(inner: W, local: &PrivateKey, peer: &PublicKey) -> Result<Self> {
        Self::with_rng(inner, local, peer, OsRng)
    }
}

impl<W, G> SecureWriter<W, G>
where
    W: AsyncWrite + Unpin,
    G: TryCryptoRng,
{
    /// Like `new`, drawing nonces from `rng`
    pub fn with_rng(inner: W, local: &PrivateKey, peer: &PublicKey, rng: G) -> Result<Self> {
        Ok(Self::with_crypto(inner, Crypto::new(local, peer)?, rng))
    }

    pub(crate) fn with_crypto(inner: W, crypto: Crypto, rng: G) -> Self {
        Self { inner, crypto, rng }
    }

    /// Seal `plaintext` under a fresh nonce and emit it as one frame.
    ///
    /// Returns the number of plaintext bytes consumed. A failed write is
    /// reported as is; the frame is not retried.
    ///
    /// # Errors
    /// - `RandomnessUnavailable` if no nonce could be drawn
    /// - `TransportWrite` if the sink fails or accepts only part of the frame
    #[instrument(skip(self, plaintext), fields(len = plaintext.len()), level = "debug")]
    pub async fn write(&mut self, plaintext: &[u8]) -> Result<usize> {
        let nonce = Nonce::fresh(&mut self.rng)?;
        let ciphertext = self.crypto.encrypt(plaintext, &nonce)?;
        let frame = Frame::new(nonce, ciphertext).encode();

        let sent = async {
            self.inner.write_all(&frame).await?;
            self.inner.flush().await
        }
        .await;

        if let Err(e) = sent {
            global_metrics().connection_error();
            return Err(ChannelError::TransportWrite(e));
        }

        global_metrics().message_sent(frame.len() as u64);
        debug!(frame_len = frame.len(), "Sealed frame");
        Ok(plaintext.len())
    }

    /// Flush and shut down the write side of the sink
    pub async fn shutdown(&mut self) -> Result<()> {
        self.inner
            .shutdown()
            .await
            .map_err(ChannelError::TransportWrite)
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// A reader and writer over one stream, sharing one session.
///
/// Dropping the connection closes the stream and erases the session's
/// private key.
pub struct SecureConnection<S> {
    reader: SecureReader<ReadHalf<S>>,
    writer: SecureWriter<WriteHalf<S>>,
    session: Session,
}

impl<S: AsyncRead + AsyncWrite + Unpin> SecureConnection<S> {
    /// Wrap a stream whose handshake produced `session`
    pub fn new(stream: S, session: Session) -> Self {
        let (read_half, write_half) = split(stream);
        Self {
            reader: SecureReader::with_crypto(read_half, session.crypto().clone()),
            writer: SecureWriter::with_crypto(write_half, session.crypto().clone(), OsRng),
            session,
        }
    }

    /// See [`SecureReader::read`]
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.reader.read(buf).await
    }

    /// See [`SecureWriter::write`]
    pub async fn write(&mut self, plaintext: &[u8]) -> Result<usize> {
        self.writer.write(plaintext).await
    }

    /// Shut down the write side; the peer sees end-of-stream
    pub async fn shutdown(&mut self) -> Result<()> {
        self.writer.shutdown().await
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn peer_public(&self) -> &PublicKey {
        self.session.peer_public()
    }

    /// Split into independently owned halves. The session itself is dropped;
    /// each half keeps only the derived cipher.
    pub fn into_split(self) -> (SecureReader<ReadHalf<S>>, SecureWriter<WriteHalf<S>>) {
        (self.reader, self.writer)
    }
}
