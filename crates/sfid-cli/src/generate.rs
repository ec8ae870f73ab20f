//! # Generate: issue a new identity code.
//!
//! ```bash
//! sfid generate --category GFR --province ZS --city 001 --org ZF
//! sfid generate --category GMR --province GD --city 001 --date 20240229 --json
//! ```
//!
//! Categories that pin an organization type or profit status get it
//! filled in when the flag is omitted; an explicit conflicting value is
//! still rejected by validation.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde::Serialize;

use sfid_core::{today, Category, CodeFields, SchemaConfig};
use sfid_store::{CodeIssuer, IssuedCode, SqliteSequenceStore};

use crate::config::Settings;

/// Arguments for `sfid generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Subject category (A3): GMR, ZRR, ZNR, GFR, SFR, FFR.
    #[arg(long)]
    pub category: String,

    /// Province code (first two characters of R5).
    #[arg(long)]
    pub province: String,

    /// City code (last three digits of R5).
    #[arg(long)]
    pub city: String,

    /// Organization type (T2). Defaults to the category's required value.
    #[arg(long)]
    pub org: Option<String>,

    /// Profit status (P1), 0 or 1. Defaults to the category's required value.
    #[arg(long)]
    pub profit: Option<String>,

    /// Issuance date Y...YMMDD. Defaults to today.
    #[arg(long)]
    pub date: Option<String>,

    /// Sequence database path.
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Perturbation secret.
    #[arg(long)]
    pub secret: Option<String>,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Output of a successful `generate`.
#[derive(Debug, Serialize)]
struct GenerateReport<'a> {
    province_name: &'a str,
    region: &'a str,
    date: &'a str,
    code: String,
    account: String,
}

/// Execute `sfid generate`.
pub fn run_generate(args: &GenerateArgs, settings: &Settings) -> Result<u8> {
    let schema = settings.schema_config()?;
    let fields = resolve_fields(args, &schema)?;
    let db = settings.database_path(args.db.as_deref());
    let secret = settings.secret(args.secret.as_deref());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let issued: IssuedCode = runtime.block_on(async {
        let store = SqliteSequenceStore::open(&db)
            .await
            .with_context(|| format!("failed to open sequence database {}", db.display()))?;
        let issuer = CodeIssuer::new(store, secret);
        let issued = issuer.issue(&fields).await?;
        issuer.store().close().await;
        anyhow::Ok(issued)
    })?;

    let region = issued.code.region();
    let report = GenerateReport {
        province_name: schema.province_name(region.province()).unwrap_or_default(),
        region: region.as_str(),
        date: issued.code.date().as_str(),
        code: issued.code.to_string(),
        account: issued.account.to_string(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("PROVINCE: {}", report.province_name);
        println!("R5:       {}", report.region);
        println!("D*:       {}", report.date);
        println!("CODE:     {}", report.code);
        println!("ACCOUNT:  {}", report.account);
    }
    Ok(0)
}

/// Normalize the flags and fill in category-pinned values.
fn resolve_fields(args: &GenerateArgs, schema: &SchemaConfig) -> Result<CodeFields> {
    let category_code = args.category.trim().to_uppercase();
    let category: Category = category_code.parse()?;

    let org = match &args.org {
        Some(org) => org.trim().to_uppercase(),
        None => category
            .forced_org()
            .map(|o| o.code().to_string())
            .ok_or_else(|| anyhow!("--org is required for category {category}"))?,
    };
    let profit = match &args.profit {
        Some(p) => p.trim().to_string(),
        None => category
            .forced_profit()
            .map(|p| p.code().to_string())
            .ok_or_else(|| anyhow!("--profit is required for category {category}"))?,
    };
    let date = match &args.date {
        Some(d) => d.trim().to_string(),
        None => today().as_str().to_string(),
    };
    let region = format!(
        "{}{}",
        args.province.trim().to_uppercase(),
        args.city.trim()
    );

    Ok(CodeFields::parse(
        schema,
        &category_code,
        &region,
        &org,
        &profit,
        &date,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfid_core::{OrgType, Profit, ValidationError};

    fn args(category: &str) -> GenerateArgs {
        GenerateArgs {
            category: category.into(),
            province: "zs".into(),
            city: "001".into(),
            org: None,
            profit: None,
            date: Some("20240101".into()),
            db: None,
            secret: None,
            json: false,
        }
    }

    #[test]
    fn citizen_gets_forced_org_and_profit() {
        let fields = resolve_fields(&args("gmr"), &SchemaConfig::builtin()).unwrap();
        assert_eq!(fields.org(), OrgType::National);
        assert_eq!(fields.profit(), Profit::ForProfit);
        assert_eq!(fields.region().as_str(), "ZS001");
    }

    #[test]
    fn public_legal_person_needs_org() {
        let err = resolve_fields(&args("GFR"), &SchemaConfig::builtin()).unwrap_err();
        assert!(err.to_string().contains("--org"));

        let mut a = args("GFR");
        a.org = Some("zf".into());
        let fields = resolve_fields(&a, &SchemaConfig::builtin()).unwrap();
        assert_eq!(fields.profit(), Profit::NonProfit);
        assert_eq!(fields.bucket().as_str(), "GFR|ZS001|ZF|0|20240101");
    }

    #[test]
    fn intelligent_agent_needs_profit() {
        let err = resolve_fields(&args("ZNR"), &SchemaConfig::builtin()).unwrap_err();
        assert!(err.to_string().contains("--profit"));
    }

    #[test]
    fn explicit_conflict_is_rejected() {
        let mut a = args("GMR");
        a.profit = Some("0".into());
        let err = resolve_fields(&a, &SchemaConfig::builtin()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::ProfitRequired { .. })
        ));
    }

    #[test]
    fn date_defaults_to_today() {
        let mut a = args("GMR");
        a.date = None;
        let fields = resolve_fields(&a, &SchemaConfig::builtin()).unwrap();
        assert_eq!(fields.date().as_str().len(), 8);
    }

    #[test]
    fn generate_writes_sequence_database() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("seq.db");
        let mut a = args("GFR");
        a.org = Some("ZF".into());
        a.db = Some(db.clone());
        a.secret = Some("GMB-IDENTITY-DEFAULT-SECRET".into());

        assert_eq!(run_generate(&a, &Settings::default()).unwrap(), 0);
        assert_eq!(run_generate(&a, &Settings::default()).unwrap(), 0);
        assert!(db.exists());
    }
}
