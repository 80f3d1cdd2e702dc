//! Locate core: the user-presence/capability codec.
//!
//! This crate decodes and encodes user-info records carried in length-prefixed
//! TLV blocks, matches 16-byte capability identifiers against the built-in
//! feature table, and normalizes handles for keyed lookups. It carries no
//! session state and performs no I/O: buffers come in fully assembled and go
//! out the same way.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! The only hard failure is `LocateError::Truncated`; everything else that is
//! malformed degrades to "fewer recognized fields".

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod handle;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorCode, LocateError, Result};
pub use handle::normalize_handle;
