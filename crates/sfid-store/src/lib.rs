//! # sfid-store: Sequence Allocation and Code Issuance
//!
//! The only stateful part of the identity-code engine. [`SequenceStore`]
//! hands out raw sequence numbers per bucket; [`CodeIssuer`] runs the full
//! generation pipeline on top of it using the pure functions in
//! `sfid-core`.
//!
//! Persisted state is a single table mapping bucket key to next sequence
//! number. Nothing else is stored.

pub mod error;
pub mod issuer;
pub mod sequence;

pub use error::{IssueError, StoreError};
pub use issuer::{CodeIssuer, IssuedCode};
pub use sequence::{MemorySequenceStore, SequenceStore, SqliteSequenceStore, DEFAULT_DB_PATH};
