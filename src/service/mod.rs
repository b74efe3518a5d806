//! # Secure Services
//!
//! The sealed stream wrappers and the client/server built on them.
//!
//! ## Components
//! - **Secure**: `SecureReader`, `SecureWriter`, and the bundled `SecureConnection`
//! - **Client**: dial, handshake as initiator, send and receive messages
//! - **Server**: the one-shot echo service

pub mod client;
pub mod secure;
pub mod server;
