//! # Keyward Proto
//!
//! Wire protocol between the keyward sidecar and its parent supervisor.
//!
//! The transport is the sidecar's stdin/stdout. Every message in either
//! direction is a *frame*: a `u32` big-endian size followed by exactly
//! that many body bytes. Command frames carry a one-byte tag and a
//! payload; reply frames carry an `'S'`/`'E'` discriminator followed by
//! data or an error message.
//!
//! This crate is transport-agnostic: framing works over any
//! [`std::io::Read`]/[`std::io::Write`] pair, which is what lets the
//! sidecar's tests drive a full session through in-memory pipes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod command;
pub mod error;
pub mod frame;
pub mod keyfield;
pub mod reply;

pub use command::Command;
pub use error::ProtocolError;
pub use frame::{read_frame, write_frame};
pub use reply::Reply;
