//! # Provinces: list the configured province table.

use anyhow::Result;
use clap::Args;

use sfid_core::SchemaConfig;

use crate::config::Settings;

/// Arguments for `sfid provinces`.
#[derive(Args, Debug)]
pub struct ProvincesArgs {
    /// Also list each province's configured cities.
    #[arg(long)]
    pub cities: bool,
}

/// Execute `sfid provinces`.
pub fn run_provinces(args: &ProvincesArgs, settings: &Settings) -> Result<u8> {
    let schema = settings.schema_config()?;
    for line in listing(&schema, args.cities) {
        println!("{line}");
    }
    Ok(0)
}

fn listing(schema: &SchemaConfig, with_cities: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for p in schema.provinces() {
        lines.push(format!("  {:<4} {} ({} cities)", p.code, p.name, p.cities.len()));
        if with_cities {
            for c in &p.cities {
                lines.push(format!("         {}{} {}", p.code, c.code, c.name));
            }
        }
    }
    lines.push(String::new());
    lines.push(format!("Total: {} provinces", schema.provinces().len()));
    lines
}
