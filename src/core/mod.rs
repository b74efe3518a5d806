//! # Core Channel Components
//!
//! Fixed-width key material, nonces, and the wire frame.
//!
//! This module provides the value types every other layer is built from.
//! Sizes are encoded in the types themselves, so a wrong-sized key or nonce
//! cannot be constructed.
//!
//! ## Components
//! - **Keys**: X25519 key pairs, public keys, zeroizing private keys
//! - **Nonce**: 24-byte per-message nonces drawn from a secure RNG
//! - **Frame**: one sealed message on the wire
//!
//! ## Wire Format
//! ```text
//! [Nonce(24)] [Ciphertext(N)] [Tag(16)]
//! ```
//!
//! ## Security
//! - Private keys are erased on drop
//! - Nonces are random, never counters, so both peers can share one key

pub mod frame;
pub mod keys;
pub mod nonce;
