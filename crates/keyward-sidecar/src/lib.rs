//! # Keyward Sidecar
//!
//! Long-running encryption sidecar that holds a product's master data
//! encryption key on behalf of a parent supervisor process.
//!
//! The parent spawns this process and drives it over stdin/stdout with
//! the framed command protocol from `keyward-proto`. The sidecar keeps
//! three pieces of state, all in memory and none on disk:
//!
//! - the *lock key*, derived from the operator password,
//! - the current *encrypted data key*, sealed under the lock key,
//! - optionally the previous encrypted data key, retained as a backup
//!   across a rotation window.
//!
//! Trust is by process ancestry: the sidecar never authenticates its
//! parent, never listens on the network, and never logs key material.
//! It is stateless between invocations; the parent re-initializes it on
//! every start.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod service;

pub use service::{run, EncryptionService, ServiceError};
