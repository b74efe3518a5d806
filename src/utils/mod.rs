//! # Utility Modules
//!
//! Supporting utilities for cryptography, logging, and observability.
//!
//! ## Components
//! - **Crypto**: X25519 + XChaCha20-Poly1305 public-key authenticated encryption
//! - **Logging**: Structured logging setup on top of `tracing-subscriber`
//! - **Metrics**: Thread-safe observability counters
//!
//! ## Security
//! - Cryptographically secure RNG (rand `OsRng`)
//! - Memory zeroing for derived keys and decrypted buffers (zeroize crate)

pub mod crypto;
pub mod logging;
pub mod metrics;

pub use metrics::global_metrics;
