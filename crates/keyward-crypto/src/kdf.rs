//! Lock-key derivation.
//!
//! PBKDF2-HMAC-SHA1 with a fixed 8-byte salt and 4096 iterations. The
//! salt is compile-time constant across all deployments: the sidecar has
//! no durable state to keep a per-install salt in, and every existing
//! sealed data key depends on these exact parameters. They are a wire
//! contract, not a tunable.

use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;

use crate::keys::{LockKey, KEY_SIZE};

/// Fixed KDF salt shared by every deployment.
pub const LOCK_KEY_SALT: [u8; 8] = [0x14, 0xB7, 0xEF, 0x26, 0x2C, 0xD6, 0x16, 0x8D];

/// PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 4096;

/// Derive the 32-byte lock key from an operator password.
///
/// Deterministic: the same password always yields the same key. The
/// empty password is valid and yields the *default* lock key the
/// process starts with.
#[must_use]
pub fn derive_lock_key(password: &[u8]) -> LockKey {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha1>(password, &LOCK_KEY_SALT, PBKDF2_ITERATIONS, &mut key);
    LockKey::new(key)
}
