//! # Code Codec
//!
//! Bidirectional mapping between [`ParsedCode`] and the textual identity
//! code, `A3 R5 T2 P1 C1 N9 D*`, in two surface forms:
//!
//! - segmented: `GFR-ZS001-ZF0P-834425093-20240101`
//! - unsegmented: `GFRZS001ZF0P83442509320240101`
//!
//! Parsing trims and uppercases the input, tries the segmented grammar,
//! then the unsegmented one. A structural match is then re-validated field
//! by field against the schema, the calendar, and the category rules.
//! Rendering always emits the segmented form.
//!
//! [`parse_code`] does not compare the check character; [`verify_code`]
//! does, and reports a mismatch with both characters.

use std::fmt;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::Serialize;

use crate::checksum::checksum;
use crate::error::CodeError;
use crate::fields::{Category, CodeFields, IssueDate, OrgType, Profit, Region};
use crate::perturb::{perturb_seq, N9Secret, PublicSeq};
use crate::schema::SchemaConfig;

const SEGMENTED_PATTERN: &str =
    r"^([A-Z]{3})-([A-Z0-9]{5})-([A-Z]{2})([01])([A-Z0-9])-([0-9]{9})-([0-9]+)$";
const UNSEGMENTED_PATTERN: &str =
    r"^([A-Z]{3})([A-Z0-9]{5})([A-Z]{2})([01])([A-Z0-9])([0-9]{9})([0-9]+)$";

// Both patterns are constants; `None` is unreachable and would make every
// input a format error.
fn segmented_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SEGMENTED_PATTERN).ok()).as_ref()
}

fn unsegmented_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(UNSEGMENTED_PATTERN).ok()).as_ref()
}

/// Which surface grammar a code was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grammar {
    /// Hyphen-delimited groups.
    Segmented,
    /// No separators.
    Unsegmented,
}

/// Raw field slices from a structural grammar match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFields<'a> {
    /// `A3`
    pub category: &'a str,
    /// `R5`
    pub region: &'a str,
    /// `T2`
    pub org: &'a str,
    /// `P1`
    pub profit: &'a str,
    /// `C1`
    pub check: &'a str,
    /// `N9`
    pub seq: &'a str,
    /// `D*`
    pub date: &'a str,
}

impl<'a> RawFields<'a> {
    fn from_captures(caps: &Captures<'a>) -> Option<Self> {
        Some(Self {
            category: caps.get(1)?.as_str(),
            region: caps.get(2)?.as_str(),
            org: caps.get(3)?.as_str(),
            profit: caps.get(4)?.as_str(),
            check: caps.get(5)?.as_str(),
            seq: caps.get(6)?.as_str(),
            date: caps.get(7)?.as_str(),
        })
    }
}

/// Match normalized (trimmed, uppercased) text against the two grammars,
/// segmented first.
pub fn match_grammar(normalized: &str) -> Option<(Grammar, RawFields<'_>)> {
    if let Some(caps) = segmented_re()?.captures(normalized) {
        return RawFields::from_captures(&caps).map(|f| (Grammar::Segmented, f));
    }
    unsegmented_re()?
        .captures(normalized)
        .and_then(|caps| RawFields::from_captures(&caps))
        .map(|f| (Grammar::Unsegmented, f))
}

/// A structurally and semantically valid identity code.
///
/// Obtained from [`parse_code`], [`verify_code`], or [`compose_code`].
/// Immutable. The check character is whatever the source carried; use
/// [`ParsedCode::checksum_ok`] or [`verify_code`] to confirm it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParsedCode {
    #[serde(flatten)]
    fields: CodeFields,
    check: char,
    seq: PublicSeq,
}

impl ParsedCode {
    /// `A3`
    pub fn category(&self) -> Category {
        self.fields.category()
    }

    /// `R5`
    pub fn region(&self) -> &Region {
        self.fields.region()
    }

    /// `T2`
    pub fn org(&self) -> OrgType {
        self.fields.org()
    }

    /// `P1`
    pub fn profit(&self) -> Profit {
        self.fields.profit()
    }

    /// `C1` as carried by the code.
    pub fn check(&self) -> char {
        self.check
    }

    /// `N9`
    pub fn seq(&self) -> PublicSeq {
        self.seq
    }

    /// `D*`
    pub fn date(&self) -> &IssueDate {
        self.fields.date()
    }

    /// The five caller-chosen fields.
    pub fn fields(&self) -> &CodeFields {
        &self.fields
    }

    /// Checksum payload: every field except `C1`, in canonical order.
    pub fn payload(&self) -> String {
        payload(&self.fields, self.seq)
    }

    /// The check character recomputed from the payload.
    pub fn expected_check(&self) -> char {
        checksum(&self.payload())
    }

    /// Whether the carried check character matches the payload.
    pub fn checksum_ok(&self) -> bool {
        self.expected_check() == self.check
    }

    /// All seven fields concatenated with no separators.
    pub fn unsegmented(&self) -> String {
        let f = &self.fields;
        format!(
            "{}{}{}{}{}{}{}",
            f.category(),
            f.region(),
            f.org(),
            f.profit(),
            self.check,
            self.seq,
            f.date()
        )
    }
}

impl fmt::Display for ParsedCode {
    /// Segmented form `A3-R5-T2P1C1-N9-D*`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = &self.fields;
        write!(
            f,
            "{}-{}-{}{}{}-{}-{}",
            fields.category(),
            fields.region(),
            fields.org(),
            fields.profit(),
            self.check,
            self.seq,
            fields.date()
        )
    }
}

fn payload(fields: &CodeFields, seq: PublicSeq) -> String {
    format!(
        "{}{}{}{}{}{}",
        fields.category(),
        fields.region(),
        fields.org(),
        fields.profit(),
        seq,
        fields.date()
    )
}

/// Parse a textual code in either surface form and validate every field.
///
/// The check character is not compared; see [`verify_code`].
///
/// # Errors
///
/// [`CodeError::Format`] when neither grammar matches,
/// [`CodeError::Validation`] when a field is invalid.
pub fn parse_code(text: &str, schema: &SchemaConfig) -> Result<ParsedCode, CodeError> {
    let normalized = text.trim().to_uppercase();
    let (_, raw) =
        match_grammar(&normalized).ok_or_else(|| CodeError::Format(normalized.clone()))?;

    let fields = CodeFields::parse(
        schema,
        raw.category,
        raw.region,
        raw.org,
        raw.profit,
        raw.date,
    )?;
    let check = raw
        .check
        .chars()
        .next()
        .ok_or_else(|| CodeError::Format(normalized.clone()))?;
    let seq = PublicSeq::parse(raw.seq).ok_or_else(|| CodeError::Format(normalized.clone()))?;

    Ok(ParsedCode { fields, check, seq })
}

/// Parse a code and confirm its check character.
///
/// # Errors
///
/// Everything [`parse_code`] reports, plus
/// [`CodeError::ChecksumMismatch`] pairing the expected and received
/// characters.
pub fn verify_code(text: &str, schema: &SchemaConfig) -> Result<ParsedCode, CodeError> {
    let code = parse_code(text, schema)?;
    let expected = code.expected_check();
    if expected != code.check {
        return Err(CodeError::ChecksumMismatch {
            expected,
            received: code.check,
        });
    }
    Ok(code)
}

/// Render a code in its segmented form.
pub fn render_code(code: &ParsedCode) -> String {
    code.to_string()
}

/// Assemble a code from validated fields and a raw sequence number:
/// perturb the sequence for the fields' bucket, then compute the check
/// character.
pub fn compose_code(fields: &CodeFields, raw_seq: u32, secret: &N9Secret) -> ParsedCode {
    let seq = perturb_seq(raw_seq, &fields.bucket(), secret);
    let check = checksum(&payload(fields, seq));
    ParsedCode {
        fields: fields.clone(),
        check,
        seq,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    const GFR_CODE: &str = "GFR-ZS001-ZF0P-834425093-20240101";
    const GMR_CODE: &str = "GMR-GD001-ZG1D-355890647-20240229";

    fn schema() -> SchemaConfig {
        SchemaConfig::builtin()
    }

    fn gfr_fields() -> CodeFields {
        CodeFields::parse(&schema(), "GFR", "ZS001", "ZF", "0", "20240101").unwrap()
    }

    #[test]
    fn compose_matches_reference() {
        let code = compose_code(&gfr_fields(), 0, &N9Secret::default());
        assert_eq!(render_code(&code), GFR_CODE);

        let fields = CodeFields::parse(&schema(), "GMR", "GD001", "ZG", "1", "20240229").unwrap();
        let code = compose_code(&fields, 5, &N9Secret::default());
        assert_eq!(render_code(&code), GMR_CODE);
    }

    #[test]
    fn parse_segmented() {
        let code = parse_code(GFR_CODE, &schema()).unwrap();
        assert_eq!(code.category(), Category::PublicLegalPerson);
        assert_eq!(code.region().as_str(), "ZS001");
        assert_eq!(code.org(), OrgType::Government);
        assert_eq!(code.profit(), Profit::NonProfit);
        assert_eq!(code.check(), 'P');
        assert_eq!(code.seq().to_string(), "834425093");
        assert_eq!(code.date().as_str(), "20240101");
        assert!(code.checksum_ok());
    }

    #[test]
    fn parse_unsegmented_lowercase_padded() {
        let code = parse_code("  gfrzs001zf0p83442509320240101 \n", &schema()).unwrap();
        assert_eq!(render_code(&code), GFR_CODE);
        assert_eq!(code.unsegmented(), "GFRZS001ZF0P83442509320240101");
    }

    #[test]
    fn match_grammar_order() {
        assert!(segmented_re().is_some());
        assert!(unsegmented_re().is_some());
        let (g, raw) = match_grammar(GFR_CODE).unwrap();
        assert_eq!(g, Grammar::Segmented);
        assert_eq!(raw.check, "P");
        let (g, raw) = match_grammar("GFRZS001ZF0P83442509320240101").unwrap();
        assert_eq!(g, Grammar::Unsegmented);
        assert_eq!(raw.seq, "834425093");
        assert_eq!(raw.date, "20240101");
        assert!(match_grammar("GFR-ZS001ZF0P83442509320240101").is_none());
    }

    #[test]
    fn long_year_dates_roundtrip() {
        let fields = CodeFields::parse(&schema(), "FFR", "HJ123", "TG", "1", "123450101").unwrap();
        let code = compose_code(&fields, 7, &N9Secret::default());
        let text = render_code(&code);
        assert!(text.ends_with("-123450101"));
        assert_eq!(verify_code(&text, &schema()).unwrap(), code);
    }

    #[test]
    fn format_errors() {
        for bad in [
            "",
            "GFR-ZS001-ZF0P-83442509-20240101", // 8-digit N9
            "GFR-ZS001-ZF2P-834425093-20240101", // P1 outside [01]
            "GF1-ZS001-ZF0P-834425093-20240101",
            "GFR-ZS001-ZF0P-834425093-",
            "GFR_ZS001_ZF0P_834425093_20240101",
        ] {
            assert!(
                matches!(parse_code(bad, &schema()), Err(CodeError::Format(_))),
                "expected format error for {bad:?}"
            );
        }
    }

    #[test]
    fn structural_match_still_validated() {
        // Grammar-valid, but the year portion is empty.
        assert!(matches!(
            parse_code("GFR-ZS001-ZF0P-834425093-0101", &schema()),
            Err(CodeError::Validation(ValidationError::InvalidDate(_)))
        ));
        // Unknown province.
        assert!(matches!(
            parse_code("GFR-QQ001-ZF0P-834425093-20240101", &schema()),
            Err(CodeError::Validation(ValidationError::UnknownProvince(_)))
        ));
        // Cross rule: GFR may not use ZG.
        assert!(matches!(
            parse_code("GFR-ZS001-ZG0P-834425093-20240101", &schema()),
            Err(CodeError::Validation(ValidationError::OrgForbidden { .. }))
        ));
        // Calendar: 2023 is not a leap year.
        assert!(matches!(
            parse_code("GMR-GD001-ZG1D-355890647-20230229", &schema()),
            Err(CodeError::Validation(ValidationError::InvalidDate(_)))
        ));
    }

    #[test]
    fn verify_reports_mismatch_pair() {
        let tampered = "GFR-ZS001-ZF0Q-834425093-20240101";
        let parsed = parse_code(tampered, &schema()).unwrap();
        assert!(!parsed.checksum_ok());
        assert_eq!(
            verify_code(tampered, &schema()),
            Err(CodeError::ChecksumMismatch {
                expected: 'P',
                received: 'Q'
            })
        );
        assert!(verify_code(GFR_CODE, &schema()).is_ok());
    }

    #[test]
    fn serializes_with_wire_codes() {
        let code = parse_code(GFR_CODE, &schema()).unwrap();
        let json = serde_json::to_value(&code).unwrap();
        assert_eq!(json["category"], "GFR");
        assert_eq!(json["region"], "ZS001");
        assert_eq!(json["org"], "ZF");
        assert_eq!(json["profit"], "0");
        assert_eq!(json["check"], "P");
        assert_eq!(json["seq"], "834425093");
        assert_eq!(json["date"], "20240101");
    }
}
