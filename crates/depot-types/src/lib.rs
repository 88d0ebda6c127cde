//! Core types shared across the depot workspace.
//!
//! A depot stores immutable objects keyed by the SHA-256 of their content,
//! plus a mutable namespace of labels pointing at manifest objects. This
//! crate defines the vocabulary every other crate speaks:
//!
//! - [`ObjectHash`] — 32-byte content address with hex codecs
//! - [`Manifest`] — canonical path→digest mapping describing one tree snapshot
//! - [`validate_label_name`] — label naming rules
//!
//! No I/O happens here; storage and wire concerns live in `depot-store` and
//! `depot-protocol`.

pub mod error;
pub mod hash;
pub mod label;
pub mod manifest;

pub use error::TypeError;
pub use hash::{ObjectHash, HASH_LEN};
pub use label::{validate_label_name, MAX_LABEL_NAME_LEN};
pub use manifest::{Manifest, NOHASH};
