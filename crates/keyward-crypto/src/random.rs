//! Secure random number generation.
//!
//! All randomness comes from the operating system CSPRNG. A failing
//! CSPRNG is not a condition this process can continue holding keys
//! under, so callers treat [`CryptoError::RandomFailed`] as fatal.

use crate::CryptoError;

/// Fill a buffer with random bytes from the OS CSPRNG
pub fn fill_random(buf: &mut [u8]) -> Result<(), CryptoError> {
    getrandom::getrandom(buf).map_err(|_| CryptoError::RandomFailed)
}

/// Generate a random 32-byte array
pub fn random_32() -> Result<[u8; 32], CryptoError> {
    let mut buf = [0u8; 32];
    fill_random(&mut buf)?;
    Ok(buf)
}
