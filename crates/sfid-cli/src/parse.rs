//! # Parse: break a code into its fields.
//!
//! ```bash
//! sfid parse --code gfrzs001zf0p83442509320240101
//! sfid parse --code GFR-ZS001-ZF0P-834425093-20240101 --json
//! ```
//!
//! Parsing reports every field even when the check character is wrong;
//! the exit status is 0 only when it matches.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use sfid_core::{derive_account, parse_code, ParsedCode, SchemaConfig};

use crate::config::Settings;
use crate::verify::invalid_line;

/// Arguments for `sfid parse`.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// The code, segmented or unsegmented.
    #[arg(long)]
    pub code: String,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ParseReport<'a> {
    #[serde(flatten)]
    code: &'a ParsedCode,
    province_name: Option<&'a str>,
    city_name: Option<&'a str>,
    canonical: String,
    account: String,
    checksum_ok: bool,
    expected_check: char,
}

/// Execute `sfid parse`.
pub fn run_parse(args: &ParseArgs, settings: &Settings) -> Result<u8> {
    let schema = settings.schema_config()?;
    let code = match parse_code(&args.code, &schema) {
        Ok(code) => code,
        Err(e) => {
            println!("{}", invalid_line(&e));
            return Ok(1);
        }
    };

    let report = report(&code, &schema);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in render_lines(&code, &report) {
            println!("{line}");
        }
    }
    Ok(if report.checksum_ok { 0 } else { 1 })
}

fn report<'a>(code: &'a ParsedCode, schema: &'a SchemaConfig) -> ParseReport<'a> {
    let region = code.region();
    ParseReport {
        code,
        province_name: schema.province_name(region.province()),
        city_name: schema.city_name(region.province(), region.city()),
        canonical: code.to_string(),
        account: derive_account(code).to_string(),
        checksum_ok: code.checksum_ok(),
        expected_check: code.expected_check(),
    }
}

fn render_lines(code: &ParsedCode, report: &ParseReport<'_>) -> Vec<String> {
    let region = code.region();
    let place = match (report.province_name, report.city_name) {
        (Some(p), Some(c)) => format!(" ({p} {c})"),
        (Some(p), None) => format!(" ({p})"),
        _ => String::new(),
    };
    let checksum = if report.checksum_ok {
        "OK".to_string()
    } else {
        format!("FAIL (expected {})", report.expected_check)
    };
    vec![
        format!("code:     {}", report.canonical),
        format!("A3:       {} {}", code.category(), code.category().label()),
        format!("R5:       {region}{place}"),
        format!("T2:       {} {}", code.org(), code.org().label()),
        format!("P1:       {} {}", code.profit(), code.profit().label()),
        format!("C1:       {}", code.check()),
        format!("N9:       {}", code.seq()),
        format!("D*:       {}", code.date()),
        format!("account:  {}", report.account),
        format!("checksum: {checksum}"),
    ]
}
