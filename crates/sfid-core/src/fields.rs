//! # Code Fields
//!
//! Domain-primitive types for the fields of an identity code
//! `A3-R5-T2P1C1-N9-D*`:
//!
//! | Field | Type         | Shape                                   |
//! |-------|--------------|-----------------------------------------|
//! | A3    | [`Category`] | closed set of 6 subject categories      |
//! | R5    | [`Region`]   | 2-char province + 3-digit city          |
//! | T2    | [`OrgType`]  | closed set of 9 organization types      |
//! | P1    | [`Profit`]   | `0` non-profit, `1` for-profit          |
//! | D*    | [`IssueDate`]| `Y...YMMDD`, calendar-valid             |
//!
//! [`CodeFields`] bundles the five caller-chosen fields and is only
//! constructible through [`CodeFields::new`] / [`CodeFields::parse`], which
//! enforce the province table and the category cross-field rules. The check
//! character and public sequence are derived, see [`crate::codec`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::calendar::validate_date;
use crate::error::{DateError, ValidationError};
use crate::schema::SchemaConfig;

/// Implement `Deserialize` for string newtypes by routing through `new()`,
/// so invalid values are rejected at deserialization time.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// A3: subject category
// ---------------------------------------------------------------------------

/// Subject category (`A3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// `GMR`: citizen.
    #[serde(rename = "GMR")]
    Citizen,
    /// `ZRR`: natural person.
    #[serde(rename = "ZRR")]
    NaturalPerson,
    /// `ZNR`: intelligent agent.
    #[serde(rename = "ZNR")]
    IntelligentAgent,
    /// `GFR`: public legal person.
    #[serde(rename = "GFR")]
    PublicLegalPerson,
    /// `SFR`: private legal person.
    #[serde(rename = "SFR")]
    PrivateLegalPerson,
    /// `FFR`: unincorporated body.
    #[serde(rename = "FFR")]
    UnincorporatedBody,
}

impl Category {
    /// Every category, in table order.
    pub const ALL: [Category; 6] = [
        Self::Citizen,
        Self::NaturalPerson,
        Self::IntelligentAgent,
        Self::PublicLegalPerson,
        Self::PrivateLegalPerson,
        Self::UnincorporatedBody,
    ];

    /// The 3-letter wire code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Citizen => "GMR",
            Self::NaturalPerson => "ZRR",
            Self::IntelligentAgent => "ZNR",
            Self::PublicLegalPerson => "GFR",
            Self::PrivateLegalPerson => "SFR",
            Self::UnincorporatedBody => "FFR",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Citizen => "公民人",
            Self::NaturalPerson => "自然人",
            Self::IntelligentAgent => "智能人",
            Self::PublicLegalPerson => "公法人",
            Self::PrivateLegalPerson => "私法人",
            Self::UnincorporatedBody => "非法人",
        }
    }

    /// Look up a category by wire code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// The organization type this category must use, if it pins one.
    ///
    /// Citizens, natural persons, intelligent agents, and private legal
    /// persons are all registered under [`OrgType::National`].
    pub fn forced_org(&self) -> Option<OrgType> {
        match self {
            Self::Citizen
            | Self::NaturalPerson
            | Self::IntelligentAgent
            | Self::PrivateLegalPerson => Some(OrgType::National),
            Self::PublicLegalPerson | Self::UnincorporatedBody => None,
        }
    }

    /// The organization type this category may not use, if any.
    pub fn forbidden_org(&self) -> Option<OrgType> {
        match self {
            Self::PublicLegalPerson => Some(OrgType::National),
            Self::Citizen
            | Self::NaturalPerson
            | Self::IntelligentAgent
            | Self::PrivateLegalPerson
            | Self::UnincorporatedBody => None,
        }
    }

    /// The profit status this category must carry, if it pins one.
    pub fn forced_profit(&self) -> Option<Profit> {
        match self {
            Self::Citizen | Self::NaturalPerson => Some(Profit::ForProfit),
            Self::PublicLegalPerson => Some(Profit::NonProfit),
            Self::IntelligentAgent | Self::PrivateLegalPerson | Self::UnincorporatedBody => None,
        }
    }

    /// Check the category's org/profit cross-field rules.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule: required org, forbidden org, then
    /// required profit status.
    pub fn check_cross_rules(&self, org: OrgType, profit: Profit) -> Result<(), ValidationError> {
        if let Some(required) = self.forced_org() {
            if org != required {
                return Err(ValidationError::OrgRequired {
                    category: *self,
                    required,
                });
            }
        }
        if self.forbidden_org() == Some(org) {
            return Err(ValidationError::OrgForbidden {
                category: *self,
                org,
            });
        }
        if let Some(required) = self.forced_profit() {
            if profit != required {
                return Err(ValidationError::ProfitRequired {
                    category: *self,
                    required,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// T2: organization type
// ---------------------------------------------------------------------------

/// Affiliated organization type (`T2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrgType {
    /// `ZG`: the nation itself; the mandatory org for person-like categories.
    #[serde(rename = "ZG")]
    National,
    /// `ZF`: government.
    #[serde(rename = "ZF")]
    Government,
    /// `LF`: legislature.
    #[serde(rename = "LF")]
    Legislature,
    /// `SF`: judiciary.
    #[serde(rename = "SF")]
    Judiciary,
    /// `JC`: supervisory (control) branch.
    #[serde(rename = "JC")]
    Supervision,
    /// `JY`: civic education commission.
    #[serde(rename = "JY")]
    CivicEducation,
    /// `CB`: civic reserve commission.
    #[serde(rename = "CB")]
    CivicReserve,
    /// `CH`: civic reserve bank.
    #[serde(rename = "CH")]
    ReserveBank,
    /// `TG`: another nation.
    #[serde(rename = "TG")]
    ForeignNation,
}

impl OrgType {
    /// Every organization type, in table order.
    pub const ALL: [OrgType; 9] = [
        Self::National,
        Self::Government,
        Self::Legislature,
        Self::Judiciary,
        Self::Supervision,
        Self::CivicEducation,
        Self::CivicReserve,
        Self::ReserveBank,
        Self::ForeignNation,
    ];

    /// The 2-letter wire code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::National => "ZG",
            Self::Government => "ZF",
            Self::Legislature => "LF",
            Self::Judiciary => "SF",
            Self::Supervision => "JC",
            Self::CivicEducation => "JY",
            Self::CivicReserve => "CB",
            Self::ReserveBank => "CH",
            Self::ForeignNation => "TG",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::National => "中国",
            Self::Government => "政府",
            Self::Legislature => "立法院",
            Self::Judiciary => "司法院",
            Self::Supervision => "监察院",
            Self::CivicEducation => "公民教育委员会",
            Self::CivicReserve => "公民储备委员会",
            Self::ReserveBank => "公民储备银行",
            Self::ForeignNation => "他国",
        }
    }

    /// Look up an organization type by wire code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.code() == code)
    }
}

impl fmt::Display for OrgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for OrgType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| ValidationError::UnknownOrg(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// P1: profit status
// ---------------------------------------------------------------------------

/// Profit status (`P1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Profit {
    /// `0`
    #[serde(rename = "0")]
    NonProfit,
    /// `1`
    #[serde(rename = "1")]
    ForProfit,
}

impl Profit {
    /// The 1-digit wire code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NonProfit => "0",
            Self::ForProfit => "1",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NonProfit => "非盈利",
            Self::ForProfit => "盈利",
        }
    }
}

impl fmt::Display for Profit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Profit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(Self::NonProfit),
            "1" => Ok(Self::ForProfit),
            other => Err(ValidationError::InvalidProfit(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// R5: region
// ---------------------------------------------------------------------------

/// Province + city code (`R5`).
///
/// Construction checks grammar only: 2 uppercase alphanumerics then 3
/// digits. Membership of the province in the configured table is checked by
/// [`CodeFields::new`]; the city suffix is not cross-checked against the
/// province's city list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct Region(String);

impl_validating_deserialize!(Region);

impl Region {
    /// Create a region from its 5-character code.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MalformedRegion`] on a grammar mismatch.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let b = s.as_bytes();
        let well_formed = b.len() == 5
            && b[..2]
                .iter()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            && b[2..].iter().all(u8::is_ascii_digit);
        if !well_formed {
            return Err(ValidationError::MalformedRegion(s));
        }
        Ok(Self(s))
    }

    /// Build a region from separate province and city codes.
    ///
    /// # Errors
    ///
    /// Same as [`Region::new`].
    pub fn from_parts(province: &str, city: &str) -> Result<Self, ValidationError> {
        Self::new(format!("{province}{city}"))
    }

    /// The 2-character province code.
    pub fn province(&self) -> &str {
        &self.0[..2]
    }

    /// The 3-digit city code.
    pub fn city(&self) -> &str {
        &self.0[2..]
    }

    /// The full 5-character code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Region> for String {
    fn from(r: Region) -> Self {
        r.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// D*: issuance date
// ---------------------------------------------------------------------------

/// Calendar-valid issuance date (`D*`), `Y...YMMDD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct IssueDate(String);

impl_validating_deserialize!(IssueDate);

impl IssueDate {
    /// Create a date, validating it against the Gregorian calendar.
    ///
    /// # Errors
    ///
    /// Returns the [`DateError`] from [`validate_date`].
    pub fn new(value: impl Into<String>) -> Result<Self, DateError> {
        let s = value.into();
        validate_date(&s)?;
        Ok(Self(s))
    }

    /// Wrap a date already known to be calendar-valid.
    pub(crate) fn from_trusted(s: String) -> Self {
        Self(s)
    }

    /// The year digits (everything before `MMDD`).
    pub fn year(&self) -> &str {
        &self.0[..self.0.len() - 4]
    }

    /// The date string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<IssueDate> for String {
    fn from(d: IssueDate) -> Self {
        d.0
    }
}

impl fmt::Display for IssueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Field tuple and bucket
// ---------------------------------------------------------------------------

/// The five caller-chosen fields of a code, validated as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CodeFields {
    category: Category,
    region: Region,
    org: OrgType,
    profit: Profit,
    date: IssueDate,
}

impl CodeFields {
    /// Assemble typed fields, checking the province table and the
    /// category cross-field rules.
    ///
    /// # Errors
    ///
    /// [`ValidationError::UnknownProvince`] or one of the cross-rule
    /// variants.
    pub fn new(
        schema: &SchemaConfig,
        category: Category,
        region: Region,
        org: OrgType,
        profit: Profit,
        date: IssueDate,
    ) -> Result<Self, ValidationError> {
        if !schema.has_province(region.province()) {
            return Err(ValidationError::UnknownProvince(region.province().to_string()));
        }
        category.check_cross_rules(org, profit)?;
        Ok(Self {
            category,
            region,
            org,
            profit,
            date,
        })
    }

    /// Validate raw field strings in table order (A3, R5, province, T2,
    /// P1, D*) and then the cross-field rules.
    ///
    /// # Errors
    ///
    /// The first [`ValidationError`] encountered.
    pub fn parse(
        schema: &SchemaConfig,
        category: &str,
        region: &str,
        org: &str,
        profit: &str,
        date: &str,
    ) -> Result<Self, ValidationError> {
        let category: Category = category.parse()?;
        let region = Region::new(region)?;
        if !schema.has_province(region.province()) {
            return Err(ValidationError::UnknownProvince(region.province().to_string()));
        }
        let org: OrgType = org.parse()?;
        let profit: Profit = profit.parse()?;
        let date = IssueDate::new(date)?;
        Self::new(schema, category, region, org, profit, date)
    }

    /// `A3`
    pub fn category(&self) -> Category {
        self.category
    }

    /// `R5`
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// `T2`
    pub fn org(&self) -> OrgType {
        self.org
    }

    /// `P1`
    pub fn profit(&self) -> Profit {
        self.profit
    }

    /// `D*`
    pub fn date(&self) -> &IssueDate {
        &self.date
    }

    /// The sequence bucket these fields allocate from.
    pub fn bucket(&self) -> Bucket {
        Bucket::new(self)
    }
}

/// Validate a raw field tuple without keeping the typed result.
///
/// # Errors
///
/// The first [`ValidationError`] encountered, in the order documented on
/// [`CodeFields::parse`].
pub fn validate_fields(
    schema: &SchemaConfig,
    category: &str,
    region: &str,
    org: &str,
    profit: &str,
    date: &str,
) -> Result<(), ValidationError> {
    CodeFields::parse(schema, category, region, org, profit, date).map(|_| ())
}

/// Composite key `A3|R5|T2|P1|D*` naming one independent sequence space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Bucket(String);

impl Bucket {
    /// Render the bucket key for a validated field tuple.
    pub fn new(fields: &CodeFields) -> Self {
        Self(format!(
            "{}|{}|{}|{}|{}",
            fields.category, fields.region, fields.org, fields.profit, fields.date
        ))
    }

    #[cfg(test)]
    pub(crate) fn from_raw(key: String) -> Self {
        Self(key)
    }

    /// The bucket key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Bucket {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
