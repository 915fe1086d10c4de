//! Versioned AES-256-GCM envelope encryption.
//!
//! Every sealed value carries a one-byte format version so the cipher
//! suite can evolve without ambiguity on the wire:
//!
//! ```text
//! +-------------+----------------+---------------------------------+
//! | version 1B  | nonce 12B      | ciphertext + 16B GCM auth tag   |
//! +-------------+----------------+---------------------------------+
//! ```
//!
//! Version `0x00` is the only version defined. The nonce is freshly
//! random per seal; AAD is always empty.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};

use crate::keys::KEY_SIZE;
use crate::{random, CryptoError};

/// Current (and only) envelope format version.
pub const ENVELOPE_VERSION: u8 = 0x00;

/// AES-GCM nonce size (12 bytes / 96 bits).
pub const NONCE_SIZE: usize = 12;

/// GCM authentication tag size (16 bytes / 128 bits).
pub const TAG_SIZE: usize = 16;

/// Bytes added to a plaintext by [`seal`]: version + nonce + tag.
pub const OVERHEAD: usize = 1 + NONCE_SIZE + TAG_SIZE;

/// Seal `plaintext` under `key`.
///
/// Returns the full envelope: version byte, random nonce, ciphertext
/// with appended authentication tag.
///
/// # Errors
///
/// Returns `CryptoError::RandomFailed` if nonce generation fails and
/// `CryptoError::EncryptionFailed` if the AEAD rejects the input. Both
/// indicate an environment too broken to keep holding keys in.
pub fn seal(key: &[u8; KEY_SIZE], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    random::fill_random(&mut nonce_bytes)?;

    let cipher = Aes256Gcm::new(key.into());
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    let mut envelope = Vec::with_capacity(1 + NONCE_SIZE + ciphertext.len());
    envelope.push(ENVELOPE_VERSION);
    envelope.extend_from_slice(&nonce_bytes);
    envelope.extend_from_slice(&ciphertext);
    Ok(envelope)
}

/// Open an envelope produced by [`seal`].
///
/// # Errors
///
/// - `CryptoError::CiphertextTooShort` if the envelope is empty or the
///   body after the version byte cannot hold a nonce
/// - `CryptoError::UnsupportedCipher` on an unknown version byte
/// - `CryptoError::DecryptionFailed` on authentication failure (wrong
///   key, tampered ciphertext, or truncated tag)
pub fn open(key: &[u8; KEY_SIZE], envelope: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let Some((&version, body)) = envelope.split_first() else {
        return Err(CryptoError::CiphertextTooShort);
    };
    if version != ENVELOPE_VERSION {
        return Err(CryptoError::UnsupportedCipher);
    }
    if body.len() < NONCE_SIZE {
        return Err(CryptoError::CiphertextTooShort);
    }
    let (nonce_bytes, ciphertext) = body.split_at(NONCE_SIZE);

    let cipher = Aes256Gcm::new(key.into());
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}
