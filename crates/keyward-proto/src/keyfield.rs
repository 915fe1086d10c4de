//! Length-prefixed optional key fields.
//!
//! Where a message carries one or two encrypted keys, each key is
//! encoded with a single length byte:
//!
//! ```text
//! encoded_key := 0x00                 (absent)
//!              | len:u8  bytes:len    (1 <= len <= 255)
//! ```
//!
//! A *data-key payload* is two such fields back to back: the current
//! encrypted data key, then the backup. The one-byte prefix caps an
//! encrypted key at 255 bytes; the 61-byte envelope of a 32-byte key
//! leaves comfortable headroom, but a future cipher suite that grows
//! past the cap must grow this wire format with it.

use crate::error::ProtocolError;

/// Largest key the 1-byte length prefix can carry.
pub const MAX_KEY_LEN: usize = u8::MAX as usize;

/// Encode one optional key field.
///
/// # Errors
///
/// Returns `ProtocolError::KeyFieldTooLong` if the key exceeds
/// [`MAX_KEY_LEN`] bytes.
pub fn encode_key(key: Option<&[u8]>) -> Result<Vec<u8>, ProtocolError> {
    match key {
        None => Ok(vec![0]),
        Some(bytes) => {
            let len = u8::try_from(bytes.len())
                .map_err(|_| ProtocolError::KeyFieldTooLong(bytes.len()))?;
            let mut out = Vec::with_capacity(1 + bytes.len());
            out.push(len);
            out.extend_from_slice(bytes);
            Ok(out)
        }
    }
}

/// Encode a data-key payload: current key field, then backup key field.
///
/// # Errors
///
/// Returns `ProtocolError::KeyFieldTooLong` if either key exceeds
/// [`MAX_KEY_LEN`] bytes.
pub fn encode_key_pair(
    current: Option<&[u8]>,
    backup: Option<&[u8]>,
) -> Result<Vec<u8>, ProtocolError> {
    let mut out = encode_key(current)?;
    out.extend_from_slice(&encode_key(backup)?);
    Ok(out)
}

/// Decode a data-key payload into its two optional fields.
///
/// A zero length byte decodes to `None`. Bytes after the second field
/// are ignored.
///
/// # Errors
///
/// Returns `ProtocolError::TruncatedKeyField` if a length prefix is
/// missing or runs past the end of the buffer.
pub fn decode_key_pair(buf: &[u8]) -> Result<(Option<Vec<u8>>, Option<Vec<u8>>), ProtocolError> {
    let (current, rest) = decode_key(buf)?;
    let (backup, _) = decode_key(rest)?;
    Ok((current, backup))
}

fn decode_key(buf: &[u8]) -> Result<(Option<Vec<u8>>, &[u8]), ProtocolError> {
    let Some((&len, rest)) = buf.split_first() else {
        return Err(ProtocolError::TruncatedKeyField { need: 1, have: 0 });
    };
    let len = len as usize;
    if len == 0 {
        return Ok((None, rest));
    }
    if rest.len() < len {
        return Err(ProtocolError::TruncatedKeyField {
            need: len,
            have: rest.len(),
        });
    }
    let (key, rest) = rest.split_at(len);
    Ok((Some(key.to_vec()), rest))
}
