//! # Sequence Perturbation
//!
//! Maps a raw per-bucket sequence number to the public 9-digit `N9` field so
//! that issued codes do not reveal issuance order, while staying fully
//! deterministic for a given `(bucket, secret)` pair.
//!
//! ## Algorithm
//!
//! 1. `d = BLAKE2b-128(bucket || "|" || secret)`.
//! 2. `a = be_u64(d[0..8]) mod 1e9`, stepped forward (wrapping, skipping 0)
//!    until `gcd(a, 10) = 1`.
//! 3. `b = be_u64(d[8..16]) mod 1e9`.
//! 4. `N9 = (a * seq + b) mod 1e9`, zero-padded to 9 digits.
//!
//! Since `a` is a unit mod `1e9` the map is a bijection on `0..1e9`: two raw
//! sequences in one bucket never share a public value, and
//! [`AffineKey::recover`] inverts it for audits.
//!
//! ## Secret
//!
//! [`N9Secret`] is an obfuscation key, not a confidentiality secret. Anyone
//! holding it can recover raw sequence numbers from public codes; it does
//! not protect any data.

use std::fmt;

use blake2::digest::consts::U16;
use blake2::{Blake2b, Digest};
use serde::Serialize;

use crate::fields::Bucket;

/// Size of the public sequence space, and the allocation ceiling per bucket.
pub const SEQ_SPACE: u64 = 1_000_000_000;

/// Default perturbation secret.
pub const DEFAULT_SECRET: &str = "GMB-IDENTITY-DEFAULT-SECRET";

/// Environment variable that overrides [`DEFAULT_SECRET`].
pub const SECRET_ENV_VAR: &str = "IDENTITY_N9_SECRET";

type Blake2b128 = Blake2b<U16>;

/// Determinism/obfuscation key mixed into the perturbation hash.
#[derive(Clone, PartialEq, Eq)]
pub struct N9Secret(String);

impl N9Secret {
    /// Wrap a secret string.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Resolve the secret from `IDENTITY_N9_SECRET`, falling back to
    /// [`DEFAULT_SECRET`]. An empty variable counts as unset.
    pub fn from_env() -> Self {
        match std::env::var(SECRET_ENV_VAR) {
            Ok(s) if !s.is_empty() => Self(s),
            _ => Self::default(),
        }
    }

    /// The secret string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for N9Secret {
    fn default() -> Self {
        Self(DEFAULT_SECRET.to_string())
    }
}

// Keep the value out of logs.
impl fmt::Debug for N9Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("N9Secret(..)")
    }
}

/// The public 9-digit sequence field (`N9`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct PublicSeq(u32);

impl PublicSeq {
    /// Parse exactly 9 ASCII digits.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() != 9 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok().map(Self)
    }

    /// The numeric value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PublicSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:09}", self.0)
    }
}

impl From<PublicSeq> for String {
    fn from(s: PublicSeq) -> Self {
        s.to_string()
    }
}

/// The affine map `seq -> (a * seq + b) mod 1e9` for one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffineKey {
    a: u64,
    b: u64,
}

impl AffineKey {
    /// Derive the key for a bucket under a secret.
    pub fn derive(bucket: &Bucket, secret: &N9Secret) -> Self {
        let mut hasher = Blake2b128::new();
        hasher.update(bucket.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(secret.as_str().as_bytes());
        let digest = hasher.finalize();

        let mut hi = [0u8; 8];
        let mut lo = [0u8; 8];
        hi.copy_from_slice(&digest[..8]);
        lo.copy_from_slice(&digest[8..]);

        let mut a = u64::from_be_bytes(hi) % SEQ_SPACE;
        while a % 2 == 0 || a % 5 == 0 {
            a = (a + 1) % SEQ_SPACE;
            if a == 0 {
                a = 1;
            }
        }
        let b = u64::from_be_bytes(lo) % SEQ_SPACE;
        Self { a, b }
    }

    /// Multiplier, coprime to 10.
    pub fn multiplier(&self) -> u64 {
        self.a
    }

    /// Offset.
    pub fn offset(&self) -> u64 {
        self.b
    }

    /// Apply the map. `raw_seq` is reduced mod 1e9 first.
    pub fn apply(&self, raw_seq: u32) -> PublicSeq {
        let x = u64::from(raw_seq) % SEQ_SPACE;
        // a, x < 1e9 so a * x + b < 1e18 + 1e9, well inside u64.
        let y = (self.a * x + self.b) % SEQ_SPACE;
        PublicSeq(y as u32)
    }

    /// Invert the map: recover the raw sequence behind a public value.
    pub fn recover(&self, public: PublicSeq) -> u32 {
        let inv = mod_inverse(self.a, SEQ_SPACE);
        let y = u64::from(public.0) % SEQ_SPACE;
        let shifted = (y + SEQ_SPACE - self.b) % SEQ_SPACE;
        // inv, shifted < 1e9: product < 1e18.
        ((inv * shifted) % SEQ_SPACE) as u32
    }
}

/// Perturb a raw sequence number into the public `N9` field.
///
/// Pure: the same `(raw_seq, bucket, secret)` always yields the same value.
pub fn perturb_seq(raw_seq: u32, bucket: &Bucket, secret: &N9Secret) -> PublicSeq {
    AffineKey::derive(bucket, secret).apply(raw_seq)
}

/// Inverse of `a` modulo `m`; `a` must be coprime to `m`.
fn mod_inverse(a: u64, m: u64) -> u64 {
    let (mut old_r, mut r) = (a as i64, m as i64);
    let (mut old_s, mut s) = (1i64, 0i64);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
    }
    old_s.rem_euclid(m as i64) as u64
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn any_key() -> impl Strategy<Value = AffineKey> {
        ("[A-Z]{3}\\|[A-Z0-9]{5}\\|[A-Z]{2}\\|[01]\\|[0-9]{8}", "[ -~]{0,32}").prop_map(
            |(bucket, secret)| AffineKey::derive(&Bucket::from_raw(bucket), &N9Secret::new(secret)),
        )
    }

    proptest! {
        /// The map is injective on the full sequence space: recover()
        /// is a left inverse, so distinct raws cannot collide.
        #[test]
        fn bijection(key in any_key(), raw in 0u32..1_000_000_000) {
            prop_assert_eq!(key.recover(key.apply(raw)), raw);
        }

        /// Distinct raws give distinct public values.
        #[test]
        fn distinct_raws_distinct_outputs(
            key in any_key(),
            x in 0u32..1_000_000_000,
            y in 0u32..1_000_000_000,
        ) {
            prop_assume!(x != y);
            prop_assert_ne!(key.apply(x), key.apply(y));
        }

        /// Output is always exactly 9 digits.
        #[test]
        fn nine_digits(key in any_key(), raw in any::<u32>()) {
            let s = key.apply(raw).to_string();
            prop_assert_eq!(s.len(), 9);
            prop_assert!(s.bytes().all(|b| b.is_ascii_digit()));
        }
    }
}
