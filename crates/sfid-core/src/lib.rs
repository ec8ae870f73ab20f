//! # sfid-core: Identity-Code Engine
//!
//! Pure, synchronous building blocks for identity codes of the form
//!
//! ```text
//! A3-R5-T2P1C1-N9-D*
//! GFR-ZS001-ZF0P-834425093-20240101
//! ```
//!
//! | Field | Meaning                         | Module        |
//! |-------|---------------------------------|---------------|
//! | A3    | subject category                | [`fields`]    |
//! | R5    | province + city                 | [`fields`], [`schema`] |
//! | T2    | organization type               | [`fields`]    |
//! | P1    | profit status                   | [`fields`]    |
//! | C1    | base-36 check character         | [`checksum`]  |
//! | N9    | perturbed sequence number       | [`perturb`]   |
//! | D*    | issuance date `Y...YMMDD`       | [`calendar`], [`temporal`] |
//!
//! Sequence allocation needs durable state and lives in `sfid-store`; this
//! crate only maps an already-allocated raw sequence to its public form.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sfid-*` crates.
//! - No `unsafe` code.
//! - Every rejection is a typed error variant; nothing matches on message
//!   text.
//! - [`SchemaConfig`] is immutable and passed by reference; there is no
//!   global province table.

pub mod account;
pub mod calendar;
pub mod checksum;
pub mod codec;
pub mod error;
pub mod fields;
pub mod perturb;
pub mod schema;
pub mod temporal;

pub use account::{derive_account, AccountId};
pub use calendar::validate_date;
pub use checksum::checksum;
pub use codec::{compose_code, parse_code, render_code, verify_code, Grammar, ParsedCode};
pub use error::{CodeError, DateError, SchemaError, ValidationError};
pub use fields::{
    validate_fields, Bucket, Category, CodeFields, IssueDate, OrgType, Profit, Region,
};
pub use perturb::{perturb_seq, AffineKey, N9Secret, PublicSeq, DEFAULT_SECRET, SEQ_SPACE};
pub use schema::{City, Province, SchemaConfig};
pub use temporal::{issue_date_from, today};
