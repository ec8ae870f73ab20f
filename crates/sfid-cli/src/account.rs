//! # Account: derive the account identifier of a verified code.
//!
//! ```bash
//! sfid account --code GFR-ZS001-ZF0P-834425093-20240101
//! ```

use anyhow::Result;
use clap::Args;

use sfid_core::{derive_account, verify_code};

use crate::config::Settings;
use crate::verify::invalid_line;

/// Arguments for `sfid account`.
#[derive(Args, Debug)]
pub struct AccountArgs {
    /// The code, segmented or unsegmented.
    #[arg(long)]
    pub code: String,
}

/// Execute `sfid account`. Codes that fail verification get no account.
pub fn run_account(args: &AccountArgs, settings: &Settings) -> Result<u8> {
    let schema = settings.schema_config()?;
    match verify_code(&args.code, &schema) {
        Ok(code) => {
            println!("{}", derive_account(&code));
            Ok(0)
        }
        Err(e) => {
            println!("{}", invalid_line(&e));
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verified_code_gets_account() {
        let args = AccountArgs {
            code: "GMRGD001ZG1D35589064720240229".into(),
        };
        assert_eq!(run_account(&args, &Settings::default()).unwrap(), 0);
    }

    #[test]
    fn mistyped_code_is_refused() {
        let args = AccountArgs {
            code: "GMR-GD001-ZG1D-355890648-20240229".into(),
        };
        assert_eq!(run_account(&args, &Settings::default()).unwrap(), 1);
    }
}
