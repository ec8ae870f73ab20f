//! # Account Derivation
//!
//! Every identity code maps deterministically to a 32-byte account
//! identifier: `BLAKE2b-256` over the unsegmented code (all seven fields,
//! check character included), rendered as `0x` plus 64 lowercase hex
//! digits.
//!
//! Derivation only accepts a [`ParsedCode`], so the input is always a
//! structurally valid, canonically cased code. Segmented and unsegmented
//! spellings of the same code therefore yield the same account.

use std::fmt;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::Serialize;

use crate::codec::ParsedCode;

type Blake2b256 = Blake2b<U32>;

/// A 32-byte account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct AccountId([u8; 32]);

impl AccountId {
    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex without the `0x` prefix.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl From<AccountId> for String {
    fn from(a: AccountId) -> Self {
        a.to_string()
    }
}

/// Derive the account identifier of a code.
pub fn derive_account(code: &ParsedCode) -> AccountId {
    let digest = Blake2b256::digest(code.unsegmented().as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    AccountId(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_code;
    use crate::schema::SchemaConfig;

    fn account_of(text: &str) -> String {
        derive_account(&parse_code(text, &SchemaConfig::builtin()).unwrap()).to_string()
    }

    #[test]
    fn blake2b_256_known_answer() {
        let digest = Blake2b256::digest(b"abc");
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        assert_eq!(
            hex,
            "bddd813c634239723171ef3fee98579b94964e3bb1cb3e427262c8c068d52319"
        );
    }

    #[test]
    fn reference_accounts() {
        assert_eq!(
            account_of("GFR-ZS001-ZF0P-834425093-20240101"),
            "0x97687d2ef6c7260ef21050bd3ffe787a8a5ed89b661e69a5c575468bc3fdaca6"
        );
        assert_eq!(
            account_of("GMR-GD001-ZG1D-355890647-20240229"),
            "0x38d1cff4b070a4895e313ad857c4e2c596a0e3100b5bcd247ebf7a2f29f15583"
        );
    }

    #[test]
    fn spelling_does_not_change_account() {
        let segmented = account_of("GFR-ZS001-ZF0P-834425093-20240101");
        assert_eq!(account_of("GFRZS001ZF0P83442509320240101"), segmented);
        assert_eq!(account_of("  gfr-zs001-zf0p-834425093-20240101 "), segmented);
    }

    #[test]
    fn display_shape() {
        let s = account_of("GFR-ZS001-ZF0P-834425093-20240101");
        assert_eq!(s.len(), 66);
        assert!(s.starts_with("0x"));
        assert!(s[2..].bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
    }

    #[test]
    fn distinct_codes_distinct_accounts() {
        assert_ne!(
            account_of("GFR-ZS001-ZF0P-834425093-20240101"),
            account_of("GMR-GD001-ZG1D-355890647-20240229")
        );
    }

    #[test]
    fn serializes_as_prefixed_hex() {
        let code = parse_code("GFR-ZS001-ZF0P-834425093-20240101", &SchemaConfig::builtin()).unwrap();
        let json = serde_json::to_string(&derive_account(&code)).unwrap();
        assert_eq!(
            json,
            "\"0x97687d2ef6c7260ef21050bd3ffe787a8a5ed89b661e69a5c575468bc3fdaca6\""
        );
    }
}
