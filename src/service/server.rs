//! One-shot secure echo service.
//!
//! The service accepts a single connection, runs the handshake as responder,
//! opens one message, seals the same bytes back, and closes:
//!
//! ```text
//! Listening -> Accepted -> HandshakeComplete -> MessageRelayed -> Closed
//! ```
//!
//! Any failure jumps straight to `Closed` and is returned to the caller.
//! There is no retry and no second connection.

use std::fmt;
use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tracing::{debug, error, info, instrument, warn};
use zeroize::Zeroizing;

use crate::config::ServerConfig;
use crate::error::{constants, ChannelError, Result};
use crate::protocol::handshake;
use crate::service::secure::SecureConnection;
use crate::utils::metrics::global_metrics;

/// Lifecycle of the echo service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoState {
    Listening,
    Accepted,
    HandshakeComplete,
    MessageRelayed,
    Closed,
}

impl fmt::Display for EchoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EchoState::Listening => "listening",
            EchoState::Accepted => "accepted",
            EchoState::HandshakeComplete => "handshake-complete",
            EchoState::MessageRelayed => "message-relayed",
            EchoState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Echo service for exactly one connection
#[derive(Debug)]
pub struct EchoService {
    state: EchoState,
    buffer_capacity: usize,
}

impl EchoService {
    /// Create a service whose echo buffer holds `buffer_capacity` bytes
    pub fn new(buffer_capacity: usize) -> Self {
        Self {
            state: EchoState::Listening,
            buffer_capacity,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.buffer_capacity)
    }

    pub fn state(&self) -> EchoState {
        self.state
    }

    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }

    /// Accept one connection on `listener` and echo one message.
    ///
    /// Returns the number of bytes echoed.
    ///
    /// # Errors
    /// Returns `ChannelError::ConnectionClosed` if the service has already
    /// served its connection, otherwise whatever aborted the exchange
    #[instrument(skip(self, listener), fields(capacity = self.buffer_capacity))]
    pub async fn serve(&mut self, listener: &TcpListener) -> Result<usize> {
        self.ensure_listening()?;

        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                self.transition(EchoState::Closed);
                return Err(ChannelError::Io(e));
            }
        };
        info!(%peer, "Accepted connection");

        self.relay(stream).await
    }

    /// Echo one message over an already accepted stream
    pub async fn serve_stream<S>(&mut self, stream: S) -> Result<usize>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.ensure_listening()?;
        self.relay(stream).await
    }

    fn ensure_listening(&self) -> Result<()> {
        if self.state != EchoState::Listening {
            warn!(state = %self.state, "Echo service already used");
            return Err(ChannelError::ConnectionClosed);
        }
        Ok(())
    }

    async fn relay<S>(&mut self, stream: S) -> Result<usize>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let metrics = global_metrics();
        metrics.connection_established();
        self.transition(EchoState::Accepted);

        let result = self.exchange(stream).await;

        self.transition(EchoState::Closed);
        metrics.connection_closed();

        if let Err(e) = &result {
            error!(error = %e, "Echo aborted");
        }
        result
    }

    async fn exchange<S>(&mut self, mut stream: S) -> Result<usize>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let session = handshake::respond(&mut stream).await?;
        self.transition(EchoState::HandshakeComplete);

        let mut conn = SecureConnection::new(stream, session);
        let mut buf = Zeroizing::new(vec![0u8; self.buffer_capacity]);

        let n = conn.read(&mut buf).await.inspect_err(|e| {
            if matches!(e, ChannelError::ConnectionClosed) {
                warn!("{}", constants::ERR_NO_MESSAGE);
            }
        })?;
        conn.write(&buf[..n]).await?;
        self.transition(EchoState::MessageRelayed);

        Ok(n)
    }

    fn transition(&mut self, next: EchoState) {
        debug!(from = %self.state, to = %next, "Echo state transition");
        self.state = next;
    }
}

/// Bind the configured address and serve one echo exchange
pub async fn run(config: &ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(&config.address).await?;
    info!(address = %local_addr(&listener)?, "Listening");
    serve(listener, config).await
}

/// Serve one echo exchange on an already bound listener
pub async fn serve(listener: TcpListener, config: &ServerConfig) -> Result<()> {
    let mut service = EchoService::from_config(config);
    let echoed = service.serve(&listener).await?;
    info!(bytes = echoed, "Echo complete");
    global_metrics().log_metrics();
    Ok(())
}

fn local_addr(listener: &TcpListener) -> Result<SocketAddr> {
    Ok(listener.local_addr()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::service::secure::SecureConnection;
    use tokio::io::{duplex, AsyncWriteExt};

    #[tokio::test]
    async fn test_echo_over_duplex() {
        let (mut client, server) = duplex(8192);
        let mut service = EchoService::new(1024);

        let server_task = tokio::spawn(async move {
            let result = service.serve_stream(server).await;
            (service, result)
        });

        let session = handshake::initiate(&mut client).await.unwrap();
        let mut conn = SecureConnection::new(client, session);
        conn.write(b"hello").await.unwrap();

        let mut buf = [0u8; 5];
        let n = conn.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"hello");

        let (service, result) = server_task.await.unwrap();
        assert_eq!(result.unwrap(), 5);
        assert_eq!(service.state(), EchoState::Closed);
    }

    #[tokio::test]
    async fn test_short_handshake_closes_service() {
        let (mut client, server) = duplex(8192);
        let mut service = EchoService::new(1024);

        client.write_all(&[1u8; 16]).await.unwrap();
        drop(client);

        let result = service.serve_stream(server).await;
        assert!(matches!(
            result,
            Err(ChannelError::HandshakeIncomplete {
                expected: 32,
                actual: 16
            })
        ));
        assert_eq!(service.state(), EchoState::Closed);
    }

    #[tokio::test]
    async fn test_peer_closes_before_message() {
        let (mut client, server) = duplex(8192);
        let mut service = EchoService::new(1024);

        let server_task = tokio::spawn(async move { service.serve_stream(server).await });

        let session = handshake::initiate(&mut client).await.unwrap();
        drop(session);
        drop(client);

        let result = server_task.await.unwrap();
        assert!(matches!(result, Err(ChannelError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_service_serves_only_once() {
        let (_client, server) = duplex(64);
        let mut service = EchoService::new(1024);
        service.state = EchoState::Closed;

        let result = service.serve_stream(server).await;
        assert!(matches!(result, Err(ChannelError::ConnectionClosed)));
    }
}
