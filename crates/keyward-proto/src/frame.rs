//! Length-prefixed frame codec.
//!
//! Wire layout, both directions:
//!
//! ```text
//! [size: u32, big-endian] [body: size bytes]
//! ```
//!
//! A size of zero is a protocol violation. EOF *between* frames is the
//! parent closing the channel and maps to `Ok(None)`; EOF anywhere
//! inside a frame is a violation. Partial reads are retried until the
//! frame is complete; writes are not retried.

use std::io::{self, Read, Write};

use crate::error::ProtocolError;

/// Size of the frame length prefix.
pub const LEN_PREFIX_SIZE: usize = 4;

/// Read one frame body.
///
/// Returns `Ok(None)` on clean EOF at a frame boundary, the normal
/// termination signal. The returned body is never empty.
///
/// # Errors
///
/// - `ProtocolError::EmptyFrame` on a zero size prefix
/// - `ProtocolError::TruncatedFrame` if the stream ends mid-frame
/// - `ProtocolError::Io` on any other read failure
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>, ProtocolError> {
    let mut len_buf = [0u8; LEN_PREFIX_SIZE];
    if !fill_or_eof(reader, &mut len_buf)? {
        return Ok(None);
    }

    let size = u32::from_be_bytes(len_buf) as usize;
    if size == 0 {
        return Err(ProtocolError::EmptyFrame);
    }

    let mut body = vec![0u8; size];
    if !fill_or_eof(reader, &mut body)? {
        return Err(ProtocolError::TruncatedFrame {
            expected: size,
            actual: 0,
        });
    }
    Ok(Some(body))
}

/// Write one frame: size prefix, body, flush.
///
/// # Errors
///
/// - `ProtocolError::FrameTooLarge` if the body exceeds `u32::MAX` bytes
/// - `ProtocolError::Io` on any write or flush failure
pub fn write_frame<W: Write>(writer: &mut W, body: &[u8]) -> Result<(), ProtocolError> {
    let size =
        u32::try_from(body.len()).map_err(|_| ProtocolError::FrameTooLarge(body.len()))?;

    writer.write_all(&size.to_be_bytes())?;
    writer.write_all(body)?;
    writer.flush()?;
    Ok(())
}

/// Fill `buf` completely, or report clean EOF if the stream ends before
/// the first byte. EOF after a partial fill is a truncated frame.
fn fill_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool, ProtocolError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(ProtocolError::TruncatedFrame {
                    expected: buf.len(),
                    actual: filled,
                })
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(ProtocolError::Io(err)),
        }
    }
    Ok(true)
}
