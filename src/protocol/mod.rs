//! # Key Exchange
//!
//! The handshake that precedes every secure connection, and the `Session` it
//! produces.
//!
//! ## Wire Format
//! ```text
//! Initiator -> Responder: [PublicKey(32)]
//! Responder -> Initiator: [PublicKey(32)]
//! ```
//!
//! No length prefix, version tag, or signature. The exchange fixes which key
//! material each side uses but authenticates neither party.

pub mod handshake;
pub mod session;

#[cfg(test)]
mod tests;
