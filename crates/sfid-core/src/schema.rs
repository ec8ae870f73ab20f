//! # Code Schema: Province and City Tables
//!
//! Immutable configuration loaded once at startup and passed by reference
//! into field validation. The category, organization, and profit tables are
//! closed enums in [`crate::fields`]; the province→city tables are data and
//! live here.
//!
//! ## Sources
//!
//! - [`SchemaConfig::builtin()`]: the 43 configured provinces, no cities.
//! - [`SchemaConfig::from_yaml_str()`] / [`SchemaConfig::from_yaml_file()`]:
//!   a YAML document of the form:
//!
//! ```yaml
//! provinces:
//!   - code: ZS
//!     name: 中枢省
//!     cities:
//!       - code: "001"
//!         name: 中枢市
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// The configured provinces: (display name, 2-character code).
const BUILTIN_PROVINCES: [(&str, &str); 43] = [
    ("中枢省", "ZS"),
    ("岭南省", "LN"),
    ("广东省", "GD"),
    ("广西省", "GX"),
    ("福建省", "FJ"),
    ("海南省", "HN"),
    ("云南省", "YN"),
    ("贵州省", "GZ"),
    ("湖南省", "HU"),
    ("江西省", "JX"),
    ("浙江省", "ZJ"),
    ("江苏省", "JS"),
    ("山东省", "SD"),
    ("山西省", "SX"),
    ("河南省", "HE"),
    ("河北省", "HB"),
    ("湖北省", "HI"),
    ("陕西省", "SI"),
    ("重庆省", "CQ"),
    ("四川省", "SC"),
    ("甘肃省", "GS"),
    ("北平省", "BP"),
    ("海滨省", "HA"),
    ("松江省", "SJ"),
    ("龙江省", "LJ"),
    ("吉林省", "JL"),
    ("辽宁省", "LI"),
    ("宁夏省", "NX"),
    ("青海省", "QH"),
    ("安徽省", "AH"),
    ("台湾省", "TW"),
    ("西藏省", "XZ"),
    ("新疆省", "XJ"),
    ("西康省", "XK"),
    ("阿里省", "AL"),
    ("葱岭省", "CL"),
    ("天山省", "TS"),
    ("河西省", "HX"),
    ("昆仑省", "KL"),
    ("河套省", "HT"),
    ("热河省", "RH"),
    ("兴安省", "XA"),
    ("合江省", "HJ"),
];

/// A city entry under a province.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    /// 3-digit city code (the `R5` suffix).
    pub code: String,
    /// Display name.
    pub name: String,
}

/// A province entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Province {
    /// 2-character province code (the `R5` prefix).
    pub code: String,
    /// Display name.
    pub name: String,
    /// Configured cities, in display order.
    #[serde(default)]
    pub cities: Vec<City>,
}

#[derive(Deserialize)]
struct SchemaDocument {
    provinces: Vec<Province>,
}

/// Validated province/city tables.
#[derive(Debug, Clone)]
pub struct SchemaConfig {
    provinces: Vec<Province>,
    index: HashMap<String, usize>,
}

impl SchemaConfig {
    /// Build a schema from province entries.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the list is empty, a code is malformed,
    /// or a province code repeats.
    pub fn new(provinces: Vec<Province>) -> Result<Self, SchemaError> {
        if provinces.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut index = HashMap::with_capacity(provinces.len());
        for (i, p) in provinces.iter().enumerate() {
            if !is_province_code(&p.code) {
                return Err(SchemaError::InvalidProvinceCode(p.code.clone()));
            }
            for c in &p.cities {
                if c.code.len() != 3 || !c.code.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(SchemaError::InvalidCityCode {
                        province: p.code.clone(),
                        city: c.code.clone(),
                    });
                }
            }
            if index.insert(p.code.clone(), i).is_some() {
                return Err(SchemaError::DuplicateProvince(p.code.clone()));
            }
        }
        Ok(Self { provinces, index })
    }

    /// The built-in province table with an empty city table.
    pub fn builtin() -> Self {
        let provinces: Vec<Province> = BUILTIN_PROVINCES
            .iter()
            .map(|(name, code)| Province {
                code: (*code).to_string(),
                name: (*name).to_string(),
                cities: Vec::new(),
            })
            .collect();
        let index = provinces
            .iter()
            .enumerate()
            .map(|(i, p)| (p.code.clone(), i))
            .collect();
        Self { provinces, index }
    }

    /// Parse a schema YAML document.
    ///
    /// # Errors
    ///
    /// YAML syntax errors or any [`SchemaConfig::new`] failure.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SchemaError> {
        let doc: SchemaDocument = serde_yaml::from_str(yaml)?;
        Self::new(doc.provinces)
    }

    /// Read and parse a schema YAML file.
    ///
    /// # Errors
    ///
    /// I/O failures or any [`SchemaConfig::from_yaml_str`] failure.
    pub fn from_yaml_file(path: &Path) -> Result<Self, SchemaError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let schema = Self::from_yaml_str(&yaml)?;
        tracing::debug!(
            path = %path.display(),
            provinces = schema.provinces.len(),
            "loaded schema configuration"
        );
        Ok(schema)
    }

    /// Whether `code` is a configured province.
    pub fn has_province(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    /// Look up a province entry.
    pub fn province(&self, code: &str) -> Option<&Province> {
        self.index.get(code).map(|&i| &self.provinces[i])
    }

    /// Display name of a province.
    pub fn province_name(&self, code: &str) -> Option<&str> {
        self.province(code).map(|p| p.name.as_str())
    }

    /// Configured cities of a province (empty when unknown or unconfigured).
    pub fn cities(&self, province: &str) -> &[City] {
        self.province(province)
            .map(|p| p.cities.as_slice())
            .unwrap_or_default()
    }

    /// Display name of a city under a province.
    pub fn city_name(&self, province: &str, city: &str) -> Option<&str> {
        self.cities(province)
            .iter()
            .find(|c| c.code == city)
            .map(|c| c.name.as_str())
    }

    /// All provinces, in table order.
    pub fn provinces(&self) -> &[Province] {
        &self.provinces
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

fn is_province_code(code: &str) -> bool {
    code.len() == 2
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
provinces:
  - code: ZS
    name: 中枢省
    cities:
      - code: "001"
        name: 中枢市
      - code: "002"
        name: 北辰市
  - code: GD
    name: 广东省
"#;

    #[test]
    fn builtin_has_all_provinces() {
        let s = SchemaConfig::builtin();
        assert_eq!(s.provinces().len(), 43);
        assert!(s.has_province("ZS"));
        assert!(s.has_province("HJ"));
        assert!(!s.has_province("QQ"));
        assert_eq!(s.province_name("GD"), Some("广东省"));
        assert!(s.cities("ZS").is_empty());
    }

    #[test]
    fn builtin_passes_own_validation() {
        let s = SchemaConfig::builtin();
        assert!(SchemaConfig::new(s.provinces().to_vec()).is_ok());
    }

    #[test]
    fn yaml_lookup() {
        let s = SchemaConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(s.provinces().len(), 2);
        assert_eq!(s.cities("ZS").len(), 2);
        assert_eq!(s.city_name("ZS", "002"), Some("北辰市"));
        assert_eq!(s.city_name("ZS", "003"), None);
        assert!(s.cities("GD").is_empty());
        assert!(s.cities("QQ").is_empty());
    }

    #[test]
    fn yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.yaml");
        std::fs::write(&path, SAMPLE).unwrap();
        let s = SchemaConfig::from_yaml_file(&path).unwrap();
        assert_eq!(s.province_name("ZS"), Some("中枢省"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SchemaConfig::from_yaml_file(Path::new("/nonexistent/schema.yaml")).unwrap_err();
        assert!(matches!(err, SchemaError::Io { .. }));
    }

    #[test]
    fn rejects_bad_tables() {
        let dup = "provinces:\n  - {code: ZS, name: a}\n  - {code: ZS, name: b}\n";
        assert!(matches!(
            SchemaConfig::from_yaml_str(dup),
            Err(SchemaError::DuplicateProvince(_))
        ));

        let bad_code = "provinces:\n  - {code: zs, name: a}\n";
        assert!(matches!(
            SchemaConfig::from_yaml_str(bad_code),
            Err(SchemaError::InvalidProvinceCode(_))
        ));

        let bad_city = "provinces:\n  - code: ZS\n    name: a\n    cities: [{code: \"01\", name: x}]\n";
        assert!(matches!(
            SchemaConfig::from_yaml_str(bad_city),
            Err(SchemaError::InvalidCityCode { .. })
        ));

        assert!(matches!(
            SchemaConfig::from_yaml_str("provinces: []\n"),
            Err(SchemaError::Empty)
        ));
        assert!(matches!(
            SchemaConfig::from_yaml_str("provinces: ["),
            Err(SchemaError::Yaml(_))
        ));
    }
}
