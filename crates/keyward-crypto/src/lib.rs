//! # Keyward Crypto
//!
//! Cryptographic primitives for the keyward encryption sidecar.
//!
//! This crate provides:
//! - PBKDF2-HMAC-SHA1 lock-key derivation with a fixed salt
//! - Versioned AES-256-GCM envelope encryption
//! - Constant-time comparison for secret-bearing byte strings
//! - Secure random number generation
//!
//! ## Cryptographic Suite
//!
//! | Function | Algorithm |
//! |----------|-----------|
//! | KDF | PBKDF2-HMAC-SHA1, 4096 iterations |
//! | AEAD | AES-256-GCM, 12-byte nonce, 16-byte tag |
//!
//! The suite is deliberately not pluggable: the KDF salt and iteration
//! count and the envelope layout are a compatibility surface shared with
//! every deployment. Changing any of them orphans existing sealed keys.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod constant_time;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod keys;
pub mod random;

pub use error::CryptoError;
pub use keys::{DataKey, LockKey, KEY_SIZE};
