//! # Verify: check a code's grammar, fields, and check character.
//!
//! ```bash
//! sfid verify --code GFR-ZS001-ZF0P-834425093-20240101
//! ```
//!
//! Prints `VALID` and exits 0, or `INVALID: <reason>` and exits 1.

use anyhow::Result;
use clap::Args;

use sfid_core::{verify_code, CodeError, SchemaConfig};

use crate::config::Settings;

/// Arguments for `sfid verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// The code, segmented or unsegmented.
    #[arg(long)]
    pub code: String,
}

/// Execute `sfid verify`.
pub fn run_verify(args: &VerifyArgs, settings: &Settings) -> Result<u8> {
    let schema = settings.schema_config()?;
    let (line, status) = verdict(&args.code, &schema);
    println!("{line}");
    Ok(status)
}

fn verdict(code: &str, schema: &SchemaConfig) -> (String, u8) {
    match verify_code(code, schema) {
        Ok(_) => ("VALID".to_string(), 0),
        Err(e) => (invalid_line(&e), 1),
    }
}

/// `INVALID: <reason>`, shared by the code-taking subcommands.
pub(crate) fn invalid_line(err: &CodeError) -> String {
    tracing::debug!(error = ?err, "code rejected");
    format!("INVALID: {err}")
}
