//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types used throughout the identity-code engine. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Each validation rule has its own variant. Callers match on the variant,
//!   never on message text.
//! - Format errors (no grammar matched) are distinct from validation errors
//!   (well-formed but semantically wrong) and from checksum mismatches
//!   (valid but mistyped).
//! - A checksum mismatch carries both characters so the caller can report
//!   the expected value alongside the received one.

use thiserror::Error;

use crate::fields::{Category, OrgType, Profit};

/// A `D*` date field that is not a valid proleptic Gregorian date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// The date contains characters other than ASCII digits.
    #[error("date must contain only digits, got {0:?}")]
    NotDigits(String),

    /// The date is shorter than `YMMDD`.
    #[error("date must be Y...YMMDD (at least 5 digits), got {0:?}")]
    TooShort(String),

    /// The year portion is zero.
    #[error("year must be >= 1")]
    YearZero,

    /// The month is outside `01..=12`.
    #[error("month must be 01..12, got {0:02}")]
    MonthOutOfRange(u32),

    /// The day is outside the month's range for that year.
    #[error("day {day:02} out of range for month {month:02} (max {max})")]
    DayOutOfRange {
        /// Parsed month (1-12).
        month: u32,
        /// Parsed day.
        day: u32,
        /// Days in that month for that year.
        max: u32,
    },
}

/// A field tuple that violates a schema, grammar, date, or cross-field rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `A3` is not one of the configured categories.
    #[error("invalid A3: unknown category code {0:?}")]
    UnknownCategory(String),

    /// `R5` is not 2 alphanumeric characters followed by 3 digits.
    #[error("R5 must be 2 alphanumeric characters + 3 digits, got {0:?}")]
    MalformedRegion(String),

    /// The province prefix of `R5` is not in the province table.
    #[error("province code {0:?} not configured")]
    UnknownProvince(String),

    /// `T2` is not one of the configured organization types.
    #[error("invalid T2: unknown organization code {0:?}")]
    UnknownOrg(String),

    /// `P1` is not `0` or `1`.
    #[error("invalid P1: profit status must be 0 or 1, got {0:?}")]
    InvalidProfit(String),

    /// `D*` failed calendar validation.
    #[error("invalid D*: {0}")]
    InvalidDate(#[from] DateError),

    /// The category pins a specific organization type.
    #[error("{category} requires T2={required}")]
    OrgRequired {
        /// The category that imposes the rule.
        category: Category,
        /// The only organization type it accepts.
        required: OrgType,
    },

    /// The category forbids a specific organization type.
    #[error("{category} cannot use T2={org}")]
    OrgForbidden {
        /// The category that imposes the rule.
        category: Category,
        /// The rejected organization type.
        org: OrgType,
    },

    /// The category pins a specific profit status.
    #[error("{category} requires P1={required}")]
    ProfitRequired {
        /// The category that imposes the rule.
        category: Category,
        /// The only profit status it accepts.
        required: Profit,
    },
}

/// Failure to parse or verify a textual identity code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    /// The text matches neither the segmented nor the unsegmented grammar.
    #[error("code format invalid: {0:?}")]
    Format(String),

    /// The text is well formed but one of its fields is invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// All fields are valid but the check character is wrong.
    #[error("checksum mismatch, expected {expected}, got {received}")]
    ChecksumMismatch {
        /// Check character recomputed from the payload.
        expected: char,
        /// Check character carried by the code.
        received: char,
    },
}

/// Malformed schema configuration.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The YAML document could not be parsed.
    #[error("schema YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The schema file could not be read.
    #[error("failed to read schema file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The schema configures no provinces at all.
    #[error("schema must configure at least one province")]
    Empty,

    /// A province code is not 2 uppercase alphanumeric characters.
    #[error("province code must be 2 uppercase alphanumeric characters, got {0:?}")]
    InvalidProvinceCode(String),

    /// A province code appears more than once.
    #[error("duplicate province code {0:?}")]
    DuplicateProvince(String),

    /// A city code is not exactly 3 digits.
    #[error("city code under province {province} must be 3 digits, got {city:?}")]
    InvalidCityCode {
        /// Province the city belongs to.
        province: String,
        /// The rejected city code.
        city: String,
    },
}
