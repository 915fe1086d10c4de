//! Command tags.
//!
//! The first body byte of every inbound frame names the operation. Tags
//! outside 1..=10 are a protocol violation; the dispatcher aborts on
//! them rather than replying, since an unknown tag means the parent and
//! sidecar disagree about the protocol itself.

use crate::error::ProtocolError;

/// Commands the parent may issue, by wire tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Replace the lock key with one derived from the payload password
    SetPassword = 1,
    /// Generate a fresh data key, sealed under the lock key
    CreateDataKey = 2,
    /// Install an encrypted data key pair supplied by the parent
    SetDataKey = 3,
    /// Report the current encrypted data key pair
    GetDataKey = 4,
    /// Seal a payload under the current data key
    Encrypt = 5,
    /// Open a payload under the current data key, falling back to the backup
    Decrypt = 6,
    /// Re-derive the lock key and re-seal the data key pair under it
    ChangePassword = 7,
    /// Retire the current data key to backup and generate a successor
    RotateDataKey = 8,
    /// Drop the backup data key after the parent confirms the pair
    ClearBackupKey = 9,
    /// Report whether the lock key is still the default-password key
    GetState = 10,
}

impl TryFrom<u8> for Command {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::SetPassword),
            2 => Ok(Self::CreateDataKey),
            3 => Ok(Self::SetDataKey),
            4 => Ok(Self::GetDataKey),
            5 => Ok(Self::Encrypt),
            6 => Ok(Self::Decrypt),
            7 => Ok(Self::ChangePassword),
            8 => Ok(Self::RotateDataKey),
            9 => Ok(Self::ClearBackupKey),
            10 => Ok(Self::GetState),
            other => Err(ProtocolError::UnknownCommand(other)),
        }
    }
}
