//! SHA-1 certificate fingerprints.
//!
//! A fingerprint identifies a certificate by its exact DER encoding and is
//! the key type of the trust store. It is an identity, not a security
//! property: possession of a matching fingerprint never substitutes for
//! signature verification.

use std::fmt;
use std::str::FromStr;

use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, TrustError};

/// Length of a SHA-1 fingerprint in bytes.
pub const FINGERPRINT_LEN: usize = 20;

/// SHA-1 fingerprint of a certificate's DER encoding.
///
/// Ordered byte-wise lexicographically, so it can serve as a `BTreeMap` /
/// `BTreeSet` key with deterministic iteration order. The canonical string
/// form is uppercase colon-separated hex (`AB:CD:...`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Compute the fingerprint of a DER-encoded certificate.
    #[must_use]
    pub fn of_der(der: &[u8]) -> Self {
        let hash = digest(&SHA1_FOR_LEGACY_USE_ONLY, der);
        let mut bytes = [0u8; FINGERPRINT_LEN];
        bytes.copy_from_slice(hash.as_ref());
        Self(bytes)
    }

    /// Parse a fingerprint from its colon-hex string form.
    ///
    /// The input is trimmed and upcased before parsing; after that it must
    /// be exactly twenty uppercase hex pairs separated by `:`.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::MalformedFingerprint` on wrong length, missing
    /// separators or non-hex digits.
    pub fn from_hex(input: &str) -> Result<Self> {
        let hex_str = input.trim().to_uppercase();
        if hex_str.len() != 3 * FINGERPRINT_LEN - 1 {
            return Err(TrustError::MalformedFingerprint(format!(
                "expected {} characters, got {}",
                3 * FINGERPRINT_LEN - 1,
                hex_str.len()
            )));
        }

        let raw = hex_str.as_bytes();
        let mut bytes = [0u8; FINGERPRINT_LEN];

        for (n, byte) in bytes.iter_mut().enumerate() {
            if n + 1 < FINGERPRINT_LEN && raw[3 * n + 2] != b':' {
                return Err(TrustError::MalformedFingerprint(format!(
                    "missing ':' separator after byte {n}"
                )));
            }

            let hi = hex_digit(raw[3 * n]);
            let lo = hex_digit(raw[3 * n + 1]);
            match (hi, lo) {
                (Some(hi), Some(lo)) => *byte = (hi << 4) | lo,
                _ => {
                    return Err(TrustError::MalformedFingerprint(format!(
                        "illegal hex digit at byte {n}"
                    )));
                }
            }
        }

        Ok(Self(bytes))
    }

    /// Raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }
}

/// Decode one uppercase hex digit.
const fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, byte) in self.0.iter().enumerate() {
            if n > 0 {
                write!(f, ":")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

impl FromStr for Fingerprint {
    type Err = TrustError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let fp = Fingerprint::of_der(b"some certificate bytes");
        let parsed = Fingerprint::from_hex(&fp.to_string()).unwrap();
        assert_eq!(fp, parsed);
    }

    #[test]
    fn display_form_is_canonical() {
        let fp = Fingerprint::of_der(b"hello");
        let s = fp.to_string();
        assert_eq!(s.len(), 59);
        assert_eq!(s.matches(':').count(), 19);
        assert!(s
            .chars()
            .all(|c| c == ':' || c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn lowercase_input_accepted() {
        let fp = Fingerprint::of_der(b"hello");
        let lower = fp.to_string().to_lowercase();
        assert_eq!(Fingerprint::from_hex(&lower).unwrap(), fp);
    }

    #[test]
    fn surrounding_whitespace_accepted() {
        let fp = Fingerprint::of_der(b"hello");
        let padded = format!("  {fp} \n");
        assert_eq!(Fingerprint::from_hex(&padded).unwrap(), fp);
    }

    #[test]
    fn wrong_length_rejected() {
        let err = Fingerprint::from_hex("AB:CD").unwrap_err();
        assert!(matches!(err, TrustError::MalformedFingerprint(_)));
    }

    #[test]
    fn missing_separator_rejected() {
        let fp = Fingerprint::of_der(b"hello");
        let broken = fp.to_string().replacen(':', "-", 1);
        let err = Fingerprint::from_hex(&broken).unwrap_err();
        assert!(matches!(err, TrustError::MalformedFingerprint(_)));
    }

    #[test]
    fn non_hex_digit_rejected() {
        let fp = Fingerprint::of_der(b"hello");
        let mut broken = fp.to_string();
        broken.replace_range(0..2, "ZZ");
        let err = Fingerprint::from_hex(&broken).unwrap_err();
        assert!(matches!(err, TrustError::MalformedFingerprint(_)));
    }

    #[test]
    fn ordering_is_byte_wise() {
        let a = Fingerprint([0u8; FINGERPRINT_LEN]);
        let mut high = [0u8; FINGERPRINT_LEN];
        high[0] = 1;
        let b = Fingerprint(high);
        assert!(a < b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn serde_uses_string_form() {
        let fp = Fingerprint::of_der(b"hello");
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{fp}\""));
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fp);
    }
}
