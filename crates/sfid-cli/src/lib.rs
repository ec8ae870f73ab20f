//! # sfid-cli: CLI for the Identity-Code Engine
//!
//! Provides the `sfid` command-line interface. Every subcommand is
//! non-interactive and prints its result to stdout; diagnostics go to
//! stderr through `tracing`.
//!
//! ## Subcommands
//!
//! - `sfid generate`: validate fields, allocate a sequence, print the code.
//! - `sfid verify`: grammar, field, and check-character verification.
//! - `sfid parse`: field breakdown, account, and checksum status.
//! - `sfid account`: account identifier of a verified code.
//! - `sfid provinces`: the configured province table.
//!
//! ```bash
//! sfid generate --category GFR --province ZS --city 001 --org ZF
//! sfid verify --code GFR-ZS001-ZF0P-834425093-20240101
//! ```

pub mod account;
pub mod config;
pub mod generate;
pub mod parse;
pub mod provinces;
pub mod verify;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_modules_are_accessible() {
        let _ = std::any::type_name::<account::AccountArgs>();
        let _ = std::any::type_name::<config::Settings>();
        let _ = std::any::type_name::<generate::GenerateArgs>();
        let _ = std::any::type_name::<parse::ParseArgs>();
        let _ = std::any::type_name::<provinces::ProvincesArgs>();
        let _ = std::any::type_name::<verify::VerifyArgs>();
    }
}
