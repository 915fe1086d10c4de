//! Reply frames.
//!
//! Every accepted command produces exactly one reply frame whose first
//! byte discriminates success from error. The parent is expected to
//! branch on that byte only; error message text is diagnostic, not
//! contractual.

use std::fmt::Display;

/// Success discriminator byte.
pub const REPLY_SUCCESS: u8 = b'S';

/// Error discriminator byte.
pub const REPLY_ERROR: u8 = b'E';

/// One reply to one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `'S'` followed by zero or more data bytes
    Success(Vec<u8>),
    /// `'E'` followed by a UTF-8 message
    Error(String),
}

impl Reply {
    /// A bare success reply with no data.
    #[must_use]
    pub fn success() -> Self {
        Self::Success(Vec::new())
    }

    /// A success reply carrying data.
    #[must_use]
    pub fn success_with(data: impl Into<Vec<u8>>) -> Self {
        Self::Success(data.into())
    }

    /// An error reply from anything displayable.
    #[must_use]
    pub fn error(message: impl Display) -> Self {
        Self::Error(message.to_string())
    }

    /// Encode into a frame body.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Success(data) => {
                let mut body = Vec::with_capacity(1 + data.len());
                body.push(REPLY_SUCCESS);
                body.extend_from_slice(data);
                body
            }
            Self::Error(message) => {
                let mut body = Vec::with_capacity(1 + message.len());
                body.push(REPLY_ERROR);
                body.extend_from_slice(message.as_bytes());
                body
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_success_is_single_byte() {
        assert_eq!(Reply::success().encode(), vec![b'S']);
    }

    #[test]
    fn test_success_with_data() {
        assert_eq!(
            Reply::success_with(b"default".to_vec()).encode(),
            b"Sdefault".to_vec()
        );
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            Reply::error("Key mismatch").encode(),
            b"EKey mismatch".to_vec()
        );
    }
}
