use tokio::net::TcpStream;
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::protocol::handshake;
use crate::service::secure::SecureConnection;
use crate::utils::metrics::global_metrics;

/// Secure client for talking to an echo server
pub struct SecureClient {
    conn: SecureConnection<TcpStream>,
}

impl SecureClient {
    /// Connect to `addr` and run the handshake as initiator.
    ///
    /// A fresh key pair is generated for this connection only.
    #[instrument]
    pub async fn dial(addr: &str) -> Result<Self> {
        let mut stream = TcpStream::connect(addr).await?;
        global_metrics().connection_dialed();
        debug!("TCP connection established");

        let session = handshake::initiate(&mut stream).await?;
        info!(peer = %session.peer_public().fingerprint(), "Secure session established");

        Ok(Self {
            conn: SecureConnection::new(stream, session),
        })
    }

    /// Send one message
    pub async fn send(&mut self, message: &[u8]) -> Result<usize> {
        self.conn.write(message).await
    }

    /// Receive one message into `buf`
    pub async fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.conn.read(buf).await
    }

    /// Send `message` and wait for its echo.
    ///
    /// The receive buffer is sized to the message, so a longer reply is cut
    /// to `message.len()` bytes.
    pub async fn echo(&mut self, message: &[u8]) -> Result<Vec<u8>> {
        self.send(message).await?;
        let mut buf = vec![0u8; message.len()];
        let n = self.recv(&mut buf).await?;
        buf.truncate(n);
        Ok(buf)
    }

    pub fn connection(&self) -> &SecureConnection<TcpStream> {
        &self.conn
    }

    pub fn into_connection(self) -> SecureConnection<TcpStream> {
        self.conn
    }
}

/// Dial `addr` and return the bundled reader/writer
pub async fn dial(addr: &str) -> Result<SecureConnection<TcpStream>> {
    Ok(SecureClient::dial(addr).await?.into_connection())
}
