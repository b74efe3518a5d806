//! # secure-echo
//!
//! Authenticated public-key encryption over a plain byte stream, plus the
//! key exchange and a one-shot echo service built on it.
//!
//! ## Layers
//! - [`core`]: fixed-width keys, nonces, and the wire frame
//! - [`protocol`]: the raw public-key handshake and the resulting session
//! - [`service`]: `SecureReader` / `SecureWriter`, client, echo server
//! - [`utils`]: the box cipher, logging, metrics
//! - [`config`]: TOML and environment configuration
//!
//! ## Example
//! ```no_run
//! use secure_echo::service::client::SecureClient;
//!
//! # async fn demo() -> secure_echo::error::Result<()> {
//! let mut client = SecureClient::dial("localhost:9000").await?;
//! let echoed = client.echo(b"hello").await?;
//! assert_eq!(echoed, b"hello");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod utils;

pub use crate::core::keys::{KeyPair, PrivateKey, PublicKey};
pub use crate::core::nonce::Nonce;
pub use crate::error::{ChannelError, Result};
pub use crate::protocol::session::Session;
pub use crate::service::secure::{SecureConnection, SecureReader, SecureWriter};
