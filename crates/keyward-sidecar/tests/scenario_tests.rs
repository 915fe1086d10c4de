//! End-to-end protocol scenarios.
//!
//! Wire-level tests drive [`keyward_sidecar::run`] over in-memory pipes
//! and assert exact reply bytes; multi-step flows that feed one reply
//! into the next command drive [`EncryptionService`] directly.

use std::io::Cursor;

use keyward_proto::{keyfield, Command, ProtocolError, Reply};
use keyward_sidecar::{run, EncryptionService, ServiceError};

/// 61 bytes: version + 12-byte nonce + 32-byte key + 16-byte tag.
const SEALED_KEY_LEN: usize = 61;

fn frame(body: &[u8]) -> Vec<u8> {
    let mut wire = (body.len() as u32).to_be_bytes().to_vec();
    wire.extend_from_slice(body);
    wire
}

fn split_frames(mut wire: &[u8]) -> Vec<Vec<u8>> {
    let mut frames = Vec::new();
    while !wire.is_empty() {
        let (len, rest) = wire.split_at(4);
        let size = u32::from_be_bytes(len.try_into().unwrap()) as usize;
        let (body, rest) = rest.split_at(size);
        frames.push(body.to_vec());
        wire = rest;
    }
    frames
}

/// Run a whole session from pre-built command bodies, returning the
/// reply bodies.
fn session(bodies: &[&[u8]]) -> Vec<Vec<u8>> {
    let input: Vec<u8> = bodies.iter().flat_map(|body| frame(body)).collect();
    let mut output = Vec::new();
    run(Cursor::new(input), &mut output).expect("session should end cleanly");
    split_frames(&output)
}

fn success_data(service: &mut EncryptionService, command: Command, payload: &[u8]) -> Vec<u8> {
    match service.handle(command, payload).unwrap() {
        Reply::Success(data) => data,
        Reply::Error(message) => panic!("{command:?} failed: {message}"),
    }
}

fn error_message(service: &mut EncryptionService, command: Command, payload: &[u8]) -> String {
    match service.handle(command, payload).unwrap() {
        Reply::Error(message) => message,
        Reply::Success(data) => panic!("{command:?} unexpectedly succeeded: {data:?}"),
    }
}

// ============================================================================
// Wire-exact sessions
// ============================================================================

#[test]
fn default_state_probe() {
    // [1] 0x0A  ->  [8] "Sdefault"
    let input = frame(&[0x0A]);
    let mut output = Vec::new();
    run(Cursor::new(input), &mut output).unwrap();

    assert_eq!(output, [&[0, 0, 0, 8][..], b"Sdefault"].concat());
}

#[test]
fn set_password_then_create_data_key() {
    let mut set_password = vec![0x01];
    set_password.extend_from_slice(b"hunter2");

    let replies = session(&[&set_password, &[0x02], &[0x0A]]);
    assert_eq!(replies.len(), 3);

    // SetPassword: bare success.
    assert_eq!(replies[0], b"S");

    // CreateDataKey: S, encoded 61-byte envelope, absent backup.
    let reply = &replies[1];
    assert_eq!(reply.len(), 1 + 1 + SEALED_KEY_LEN + 1);
    assert_eq!(reply[0], b'S');
    assert_eq!(reply[1] as usize, SEALED_KEY_LEN);
    assert_eq!(*reply.last().unwrap(), 0);

    // GetState: no longer the default lock key.
    assert_eq!(replies[2], b"Suser_configured");
}

#[test]
fn get_data_key_before_any_key_exists() {
    let replies = session(&[&[0x04]]);
    assert_eq!(replies[0], b"S\x00\x00");
}

#[test]
fn clean_eof_is_a_clean_exit() {
    let mut output = Vec::new();
    assert!(run(Cursor::new(Vec::new()), &mut output).is_ok());
    assert!(output.is_empty());
}

// ============================================================================
// Fatal protocol violations
// ============================================================================

#[test]
fn zero_size_frame_is_fatal() {
    let mut output = Vec::new();
    let result = run(Cursor::new(vec![0, 0, 0, 0]), &mut output);
    assert!(matches!(
        result,
        Err(ServiceError::Protocol(ProtocolError::EmptyFrame))
    ));
}

#[test]
fn unknown_command_tag_is_fatal() {
    let mut output = Vec::new();
    let result = run(Cursor::new(frame(&[0x0B])), &mut output);
    assert!(matches!(
        result,
        Err(ServiceError::Protocol(ProtocolError::UnknownCommand(0x0B)))
    ));
}

#[test]
fn eof_inside_a_frame_is_fatal() {
    let mut wire = frame(&[0x01, b'p', b'w']);
    wire.truncate(wire.len() - 1);

    let mut output = Vec::new();
    let result = run(Cursor::new(wire), &mut output);
    assert!(matches!(
        result,
        Err(ServiceError::Protocol(ProtocolError::TruncatedFrame { .. }))
    ));
}

#[test]
fn malformed_set_data_key_payload_is_fatal() {
    // Field claims 200 bytes, frame carries 2.
    let mut output = Vec::new();
    let result = run(Cursor::new(frame(&[0x03, 200, 0xAA, 0xBB])), &mut output);
    assert!(matches!(
        result,
        Err(ServiceError::Protocol(
            ProtocolError::TruncatedKeyField { .. }
        ))
    ));
}

// ============================================================================
// Multi-step flows
// ============================================================================

#[test]
fn encrypt_decrypt_round_trip() {
    let mut service = EncryptionService::new();
    success_data(&mut service, Command::SetPassword, b"hunter2");
    success_data(&mut service, Command::CreateDataKey, &[]);

    let ciphertext = success_data(&mut service, Command::Encrypt, b"hello");
    assert_eq!(ciphertext.len(), "hello".len() + 29);

    let plaintext = success_data(&mut service, Command::Decrypt, &ciphertext);
    assert_eq!(plaintext, b"hello");
}

#[test]
fn rotate_decrypt_old_then_clear_backup() {
    let mut service = EncryptionService::new();
    success_data(&mut service, Command::SetPassword, b"hunter2");
    success_data(&mut service, Command::CreateDataKey, &[]);
    let old_ciphertext = success_data(&mut service, Command::Encrypt, b"hello");

    // Rotation: both fields of the reply are populated.
    let pair = success_data(&mut service, Command::RotateDataKey, &[]);
    assert_eq!(pair.len(), 2 * (1 + SEALED_KEY_LEN));
    assert_eq!(pair[0] as usize, SEALED_KEY_LEN);
    assert_eq!(pair[1 + SEALED_KEY_LEN] as usize, SEALED_KEY_LEN);

    // Payloads sealed under the old key still decrypt, via the backup.
    let plaintext = success_data(&mut service, Command::Decrypt, &old_ciphertext);
    assert_eq!(plaintext, b"hello");

    // A second rotation is refused while the backup exists.
    let message = error_message(&mut service, Command::RotateDataKey, &[]);
    assert_eq!(message, "Data key rotation is in progress");

    // Retire the backup by echoing the current pair.
    let cleared = success_data(&mut service, Command::ClearBackupKey, &pair);
    assert_eq!(cleared.len(), 1 + SEALED_KEY_LEN + 1);
    assert_eq!(*cleared.last().unwrap(), 0);

    // The old key is gone; its ciphertexts are no longer decryptable.
    let message = error_message(&mut service, Command::Decrypt, &old_ciphertext);
    assert_eq!(message, "Unable to decrypt value");

    // The new current key still works.
    let ciphertext = success_data(&mut service, Command::Encrypt, b"fresh");
    let plaintext = success_data(&mut service, Command::Decrypt, &ciphertext);
    assert_eq!(plaintext, b"fresh");

    // And rotation is possible again.
    success_data(&mut service, Command::RotateDataKey, &[]);
}

#[test]
fn password_change_preserves_data() {
    let mut service = EncryptionService::new();
    success_data(&mut service, Command::SetPassword, b"old password");
    success_data(&mut service, Command::CreateDataKey, &[]);
    let ciphertext = success_data(&mut service, Command::Encrypt, b"x");

    let pair = success_data(&mut service, Command::ChangePassword, b"new");
    assert_eq!(pair.len(), 1 + SEALED_KEY_LEN + 1);

    let plaintext = success_data(&mut service, Command::Decrypt, &ciphertext);
    assert_eq!(plaintext, b"x");
}

#[test]
fn password_change_reseals_backup_too() {
    let mut service = EncryptionService::new();
    success_data(&mut service, Command::CreateDataKey, &[]);
    let old_ciphertext = success_data(&mut service, Command::Encrypt, b"payload");
    success_data(&mut service, Command::RotateDataKey, &[]);

    let pair = success_data(&mut service, Command::ChangePassword, b"rotated mid-window");
    assert_eq!(pair.len(), 2 * (1 + SEALED_KEY_LEN));

    // The backup was re-sealed under the new lock key, so the old
    // ciphertext is still reachable through the fallback.
    let plaintext = success_data(&mut service, Command::Decrypt, &old_ciphertext);
    assert_eq!(plaintext, b"payload");
}

#[test]
fn change_password_reply_matches_get_data_key() {
    let mut service = EncryptionService::new();
    success_data(&mut service, Command::CreateDataKey, &[]);

    let pair = success_data(&mut service, Command::ChangePassword, b"np");
    let stored = success_data(&mut service, Command::GetDataKey, &[]);
    assert_eq!(pair, stored);
}

#[test]
fn key_mismatch_on_clear() {
    let mut service = EncryptionService::new();
    success_data(&mut service, Command::CreateDataKey, &[]);
    success_data(&mut service, Command::RotateDataKey, &[]);
    let before = success_data(&mut service, Command::GetDataKey, &[]);

    let message = error_message(&mut service, Command::ClearBackupKey, &[]);
    assert_eq!(message, "Key mismatch");

    // A stale echo (backup omitted) is also refused.
    let (current, _) = keyfield::decode_key_pair(&before).unwrap();
    let stale = keyfield::encode_key_pair(current.as_deref(), None).unwrap();
    let message = error_message(&mut service, Command::ClearBackupKey, &stale);
    assert_eq!(message, "Key mismatch");

    let after = success_data(&mut service, Command::GetDataKey, &[]);
    assert_eq!(after, before);
}

#[test]
fn data_keys_transfer_between_processes_via_set_data_key() {
    // One process rotates mid-window, hands its pair to the parent...
    let mut donor = EncryptionService::new();
    success_data(&mut donor, Command::SetPassword, b"shared");
    success_data(&mut donor, Command::CreateDataKey, &[]);
    let ciphertext = success_data(&mut donor, Command::Encrypt, b"carried across");
    success_data(&mut donor, Command::RotateDataKey, &[]);
    let pair = success_data(&mut donor, Command::GetDataKey, &[]);

    // ...and a respawned sidecar with the same password accepts it.
    let mut respawned = EncryptionService::new();
    success_data(&mut respawned, Command::SetPassword, b"shared");
    let data = success_data(&mut respawned, Command::SetDataKey, &pair);
    assert!(data.is_empty());

    // The installed pair reads back byte-identical.
    let stored = success_data(&mut respawned, Command::GetDataKey, &[]);
    assert_eq!(stored, pair);

    // And old ciphertexts decrypt in the new process via the backup.
    let plaintext = success_data(&mut respawned, Command::Decrypt, &ciphertext);
    assert_eq!(plaintext, b"carried across");
}
