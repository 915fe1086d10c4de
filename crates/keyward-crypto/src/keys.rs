//! Key material types.
//!
//! Two 32-byte symmetric keys exist in this system: the *lock key*,
//! derived from the operator password and used only to seal and open
//! data keys, and the *data key*, which encrypts actual payloads and
//! never appears in plaintext outside this process. Both are zeroized
//! on drop, which also covers replacement (the old value drops when a
//! new one is assigned).

use zeroize::ZeroizeOnDrop;

use crate::{random, CryptoError};

/// Symmetric key size (32 bytes / 256 bits).
pub const KEY_SIZE: usize = 32;

/// Password-derived key that seals and opens data keys.
///
/// Always present: at startup it is derived from the empty password.
/// Never leaves the process.
#[derive(Clone, ZeroizeOnDrop)]
pub struct LockKey([u8; KEY_SIZE]);

impl LockKey {
    /// Create a lock key from raw bytes.
    #[must_use]
    pub fn new(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get raw key bytes.
    ///
    /// # Security
    ///
    /// Handle with care - this exposes the raw key material.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// Payload-encryption key, held at rest only in sealed form.
#[derive(ZeroizeOnDrop)]
pub struct DataKey([u8; KEY_SIZE]);

impl DataKey {
    /// Create a data key from raw bytes.
    #[must_use]
    pub fn new(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyLength` if the slice is not 32 bytes.
    pub fn from_slice(slice: &[u8]) -> Result<Self, CryptoError> {
        if slice.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: slice.len(),
            });
        }
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Generate a fresh data key from the OS CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::RandomFailed` if the CSPRNG fails.
    pub fn generate() -> Result<Self, CryptoError> {
        Ok(Self(random::random_32()?))
    }

    /// Get raw key bytes.
    ///
    /// # Security
    ///
    /// Handle with care - this exposes the raw key material.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_key_from_slice() {
        let bytes = [0x42u8; KEY_SIZE];
        let key = DataKey::from_slice(&bytes).unwrap();
        assert_eq!(key.as_bytes(), &bytes);
    }

    #[test]
    fn test_data_key_from_slice_wrong_length() {
        let result = DataKey::from_slice(&[0u8; 16]);
        assert!(matches!(
            result,
            Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: 16
            })
        ));
    }

    #[test]
    fn test_generated_keys_differ() {
        let a = DataKey::generate().unwrap();
        let b = DataKey::generate().unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }
}
