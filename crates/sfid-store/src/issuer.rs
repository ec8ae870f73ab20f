//! # Code Issuance
//!
//! The generation pipeline: validated fields → bucket → raw sequence from
//! the store → perturbed `N9` → check character → rendered code → account.
//!
//! Validation happens before allocation, so a rejected request never
//! consumes a sequence number.

use serde::Serialize;

use sfid_core::{
    compose_code, derive_account, AccountId, CodeFields, N9Secret, ParsedCode, SchemaConfig,
};

use crate::error::IssueError;
use crate::sequence::SequenceStore;

/// A freshly issued code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedCode {
    /// The code.
    pub code: ParsedCode,
    /// Its derived account identifier.
    pub account: AccountId,
    /// The raw sequence number behind `code.seq()`.
    pub raw_seq: u32,
}

/// Issues codes against a [`SequenceStore`] under one perturbation secret.
#[derive(Debug)]
pub struct CodeIssuer<S> {
    store: S,
    secret: N9Secret,
}

impl<S: SequenceStore> CodeIssuer<S> {
    /// Create an issuer.
    pub fn new(store: S, secret: N9Secret) -> Self {
        Self { store, secret }
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Issue the next code for already-validated fields.
    ///
    /// # Errors
    ///
    /// [`IssueError::Store`] when the bucket is exhausted or the store
    /// fails.
    pub async fn issue(&self, fields: &CodeFields) -> Result<IssuedCode, IssueError> {
        let bucket = fields.bucket();
        let raw_seq = self.store.next_seq(bucket.as_str()).await?;
        let code = compose_code(fields, raw_seq, &self.secret);
        let account = derive_account(&code);
        tracing::debug!(%bucket, raw_seq, %code, "issued code");
        Ok(IssuedCode {
            code,
            account,
            raw_seq,
        })
    }

    /// Validate raw field strings, then issue.
    ///
    /// # Errors
    ///
    /// [`IssueError::Validation`] for invalid fields (nothing allocated),
    /// otherwise as [`CodeIssuer::issue`].
    pub async fn issue_from_parts(
        &self,
        schema: &SchemaConfig,
        category: &str,
        region: &str,
        org: &str,
        profit: &str,
        date: &str,
    ) -> Result<IssuedCode, IssueError> {
        let fields = CodeFields::parse(schema, category, region, org, profit, date)?;
        self.issue(&fields).await
    }
}
