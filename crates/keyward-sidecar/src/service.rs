//! Key-state manager and command dispatcher.
//!
//! One strictly sequential loop: read one frame, dispatch to the
//! matching handler, write exactly one reply frame, repeat. No command
//! is ever in flight concurrently with another, which is what lets the
//! key state stay a plain mutable struct with no locking.
//!
//! Failures split into two disjoint channels:
//!
//! - *Reportable* errors (wrong key, malformed envelope, key mismatch,
//!   rotation in progress) become `E <message>` replies and leave all
//!   key state untouched. Handlers stage new values and commit only
//!   after every validation has passed.
//! - *Fatal* errors (protocol violations, I/O failure other than clean
//!   EOF, RNG failure) unwind out of [`run`]; the process exits
//!   non-zero and the parent is expected to respawn it.

use std::io::{BufReader, Read, Write};

use keyward_crypto::constant_time::ct_eq;
use keyward_crypto::kdf::derive_lock_key;
use keyward_crypto::{envelope, CryptoError, DataKey, LockKey};
use keyward_proto::{keyfield, read_frame, write_frame, Command, ProtocolError, Reply};
use thiserror::Error;
use zeroize::Zeroizing;

/// Errors that terminate the sidecar.
///
/// Everything here means either the framing contract with the parent is
/// broken or the environment is too degraded to keep holding keys.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Wire protocol violation or transport failure
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Internal cryptographic failure (RNG, AEAD refusing to seal)
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Command failures reported to the parent as `E` replies.
#[derive(Debug, Error)]
enum CommandError {
    #[error("Data key is not set")]
    DataKeyNotSet,

    #[error("Unable to decrypt value")]
    NoKeyAvailable,

    #[error("Data key rotation is in progress")]
    RotationInProgress,

    #[error("Key mismatch")]
    KeyMismatch,

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// The key hierarchy held by one sidecar process.
///
/// `lock_key` is always present; at startup it is derived from the
/// empty password, so `GetState` can tell a fresh process from one the
/// parent has configured. The two encrypted data keys are held exactly
/// as sealed bytes; plaintext data keys exist only transiently inside a
/// handler and are zeroized on drop.
pub struct EncryptionService {
    lock_key: LockKey,
    encrypted_data_key: Option<Vec<u8>>,
    backup_data_key: Option<Vec<u8>>,
}

impl EncryptionService {
    /// A fresh service in the default state: lock key derived from the
    /// empty password, no data keys.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lock_key: derive_lock_key(b""),
            encrypted_data_key: None,
            backup_data_key: None,
        }
    }

    /// Dispatch one command and produce its reply.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] only for fatal conditions; every
    /// parent-caused failure comes back as a [`Reply::Error`].
    pub fn handle(&mut self, command: Command, payload: &[u8]) -> Result<Reply, ServiceError> {
        tracing::debug!(?command, payload_len = payload.len(), "dispatching command");

        let reply = match command {
            Command::SetPassword => self.cmd_set_password(payload),
            Command::CreateDataKey => self.cmd_create_data_key()?,
            Command::SetDataKey => self.cmd_set_data_key(payload)?,
            Command::GetDataKey => self.reply_with_key_pair()?,
            Command::Encrypt => self.cmd_encrypt(payload)?,
            Command::Decrypt => self.cmd_decrypt(payload),
            Command::ChangePassword => self.cmd_change_password(payload)?,
            Command::RotateDataKey => self.cmd_rotate_data_key()?,
            Command::ClearBackupKey => self.cmd_clear_backup_key(payload)?,
            Command::GetState => self.cmd_get_state(),
        };

        if let Reply::Error(message) = &reply {
            tracing::debug!(?command, %message, "command refused");
        }
        Ok(reply)
    }

    fn cmd_set_password(&mut self, password: &[u8]) -> Reply {
        // Dropping the old key zeroizes it.
        self.lock_key = derive_lock_key(password);
        Reply::success()
    }

    fn cmd_create_data_key(&mut self) -> Result<Reply, ServiceError> {
        let data_key = DataKey::generate()?;
        let sealed = envelope::seal(self.lock_key.as_bytes(), data_key.as_bytes())?;
        self.encrypted_data_key = Some(sealed);
        self.reply_with_key_pair()
    }

    fn cmd_set_data_key(&mut self, payload: &[u8]) -> Result<Reply, ServiceError> {
        // A malformed field encoding is a protocol violation, not a
        // reportable error.
        let (current, backup) = keyfield::decode_key_pair(payload)?;

        // Validate the current key before even looking at the backup.
        // An absent current field validates as an empty envelope and
        // fails accordingly.
        let current = current.unwrap_or_default();
        if let Err(err) = self.check_sealed_data_key(&current) {
            return Ok(Reply::error(err));
        }
        let backup = match backup {
            Some(bytes) => {
                if let Err(err) = self.check_sealed_data_key(&bytes) {
                    return Ok(Reply::error(err));
                }
                Some(bytes)
            }
            None => None,
        };

        // All validations passed; commit both fields together.
        self.encrypted_data_key = Some(current);
        self.backup_data_key = backup;
        Ok(Reply::success())
    }

    fn cmd_encrypt(&mut self, payload: &[u8]) -> Result<Reply, ServiceError> {
        let Some(sealed) = self.encrypted_data_key.as_deref() else {
            return Ok(Reply::error(CommandError::DataKeyNotSet));
        };
        let data_key = match self.open_data_key(sealed) {
            Ok(key) => key,
            Err(err) => return Ok(Reply::error(err)),
        };
        let ciphertext = envelope::seal(data_key.as_bytes(), payload)?;
        Ok(Reply::success_with(ciphertext))
    }

    fn cmd_decrypt(&self, payload: &[u8]) -> Reply {
        match self.decrypt_with_key(self.encrypted_data_key.as_deref(), payload) {
            Ok(plaintext) => Reply::success_with(plaintext),
            // The fallback is silent: the parent is never told which
            // key decrypted the payload. When both attempts fail, the
            // backup attempt's error is the one surfaced.
            Err(_) => match self.decrypt_with_key(self.backup_data_key.as_deref(), payload) {
                Ok(plaintext) => Reply::success_with(plaintext),
                Err(err) => Reply::error(err),
            },
        }
    }

    fn cmd_change_password(&mut self, password: &[u8]) -> Result<Reply, ServiceError> {
        let Some(sealed) = self.encrypted_data_key.as_deref() else {
            return Ok(Reply::error(CommandError::DataKeyNotSet));
        };
        let backup_plain = match self.backup_data_key.as_deref() {
            Some(bytes) => match self.open_data_key(bytes) {
                Ok(key) => Some(key),
                Err(err) => return Ok(Reply::error(err)),
            },
            None => None,
        };
        let current_plain = match self.open_data_key(sealed) {
            Ok(key) => key,
            Err(err) => return Ok(Reply::error(err)),
        };

        // Both keys open under the old lock key; re-seal under the new
        // one. The data key material itself is unchanged.
        self.lock_key = derive_lock_key(password);
        self.encrypted_data_key = Some(envelope::seal(
            self.lock_key.as_bytes(),
            current_plain.as_bytes(),
        )?);
        if let Some(backup) = backup_plain {
            self.backup_data_key =
                Some(envelope::seal(self.lock_key.as_bytes(), backup.as_bytes())?);
        }
        self.reply_with_key_pair()
    }

    fn cmd_rotate_data_key(&mut self) -> Result<Reply, ServiceError> {
        if self.encrypted_data_key.is_none() {
            return Ok(Reply::error(CommandError::DataKeyNotSet));
        }
        // A second rotation before the parent clears the backup would
        // need a third key generation the protocol cannot represent.
        if self.backup_data_key.is_some() {
            return Ok(Reply::error(CommandError::RotationInProgress));
        }

        let data_key = DataKey::generate()?;
        let sealed = envelope::seal(self.lock_key.as_bytes(), data_key.as_bytes())?;
        self.backup_data_key = self.encrypted_data_key.replace(sealed);
        tracing::info!("data key rotated, previous key retained as backup");
        self.reply_with_key_pair()
    }

    fn cmd_clear_backup_key(&mut self, payload: &[u8]) -> Result<Reply, ServiceError> {
        // The parent echoes the pair it believes is current; comparing
        // before the destructive step catches a lost update between its
        // view and ours. Constant-time: the pair is secret-bearing.
        let current = keyfield::encode_key_pair(
            self.encrypted_data_key.as_deref(),
            self.backup_data_key.as_deref(),
        )?;
        if !ct_eq(&current, payload) {
            return Ok(Reply::error(CommandError::KeyMismatch));
        }
        if self.backup_data_key.take().is_none() {
            return Ok(Reply::success());
        }
        tracing::info!("backup data key cleared, rotation complete");
        self.reply_with_key_pair()
    }

    fn cmd_get_state(&self) -> Reply {
        let default_key = derive_lock_key(b"");
        if ct_eq(self.lock_key.as_bytes(), default_key.as_bytes()) {
            Reply::success_with(b"default".to_vec())
        } else {
            Reply::success_with(b"user_configured".to_vec())
        }
    }

    /// `S` plus the encoded (current, backup) pair.
    fn reply_with_key_pair(&self) -> Result<Reply, ServiceError> {
        let pair = keyfield::encode_key_pair(
            self.encrypted_data_key.as_deref(),
            self.backup_data_key.as_deref(),
        )?;
        Ok(Reply::success_with(pair))
    }

    /// Open a sealed data key under the lock key and check its shape.
    fn open_data_key(&self, sealed: &[u8]) -> Result<DataKey, CommandError> {
        let plain = Zeroizing::new(envelope::open(self.lock_key.as_bytes(), sealed)?);
        Ok(DataKey::from_slice(&plain)?)
    }

    fn check_sealed_data_key(&self, sealed: &[u8]) -> Result<(), CommandError> {
        self.open_data_key(sealed).map(|_| ())
    }

    fn decrypt_with_key(
        &self,
        sealed: Option<&[u8]>,
        payload: &[u8],
    ) -> Result<Vec<u8>, CommandError> {
        let sealed = sealed.ok_or(CommandError::NoKeyAvailable)?;
        let data_key = self.open_data_key(sealed)?;
        Ok(envelope::open(data_key.as_bytes(), payload)?)
    }
}

impl Default for EncryptionService {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive a full sidecar session over a `Read`/`Write` pair.
///
/// Returns `Ok(())` on clean EOF at a frame boundary, the parent's
/// normal way of shutting the sidecar down.
///
/// # Errors
///
/// Returns [`ServiceError`] on protocol violations, transport failures,
/// or internal cryptographic failures. The caller must exit non-zero.
pub fn run<R: Read, W: Write>(input: R, mut output: W) -> Result<(), ServiceError> {
    let mut reader = BufReader::new(input);
    let mut service = EncryptionService::new();

    loop {
        let Some(body) = read_frame(&mut reader)? else {
            tracing::info!("input closed at frame boundary, shutting down");
            return Ok(());
        };
        // Command payloads may carry passwords or plaintext.
        let body = Zeroizing::new(body);

        let command = Command::try_from(body[0]).map_err(ServiceError::Protocol)?;
        let reply = service.handle(command, &body[1..])?;
        write_frame(&mut output, &reply.encode())?;
    }
}
