//! Durable storage for depot: objects and labels.
//!
//! Two independent on-disk namespaces live under one depot root:
//!
//! - `objects/` — one file per immutable blob, sharded two levels deep by the
//!   leading bytes of the content hash ([`ObjectStore`])
//! - `labels/` — one file per mutable label, containing the hex of the bound
//!   manifest hash ([`LabelStore`])
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written; content-addressing makes equal-hash
//!    rewrites idempotent.
//! 2. Label writes are atomic from a reader's point of view (temp file +
//!    rename).
//! 3. The store never interprets object contents — it is a pure key-value
//!    store; manifests and file blobs are stored identically.
//! 4. All I/O errors are propagated, never silently ignored.
//!
//! This is the single storage component in the workspace: the server
//! dispatches wire requests directly onto these types, and nothing else
//! touches the on-disk layout.

pub mod depot;
pub mod error;
pub mod label;
pub mod object;

pub use depot::{Depot, LABELS_DIR, OBJECTS_DIR};
pub use error::{StoreError, StoreResult};
pub use label::LabelStore;
pub use object::{ObjectStore, SHARD_PREFIX_LEN};
