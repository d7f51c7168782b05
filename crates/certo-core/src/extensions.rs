//! Typed X.509 extension content consumed by the usage policy.
//!
//! Only the three extensions the policy evaluator understands get a typed
//! model; everything else is kept as a raw OID/criticality pair so the
//! unsupported-critical-extension check can still see it.

use serde::{Deserialize, Serialize};

/// Basic-constraints extension content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicConstraints {
    /// Whether the certified key may sign other certificates.
    pub is_ca: bool,
    /// Maximum number of subordinate CA certificates below this one,
    /// `None` for unbounded.
    pub path_len_constraint: Option<u32>,
}

impl BasicConstraints {
    /// Constraints of a CA certificate.
    #[must_use]
    pub const fn ca(path_len_constraint: Option<u32>) -> Self {
        Self {
            is_ca: true,
            path_len_constraint,
        }
    }

    /// Constraints of an end-entity certificate.
    #[must_use]
    pub const fn end_entity() -> Self {
        Self {
            is_ca: false,
            path_len_constraint: None,
        }
    }
}

/// Key-usage extension content: the RFC 5280 ability bitset.
///
/// Bit positions match the wire encoding, bit 0 = `digitalSignature`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyUsage {
    flags: u16,
}

impl KeyUsage {
    /// `digitalSignature` ability bit.
    pub const DIGITAL_SIGNATURE: u16 = 1 << 0;
    /// `nonRepudiation` ability bit.
    pub const NON_REPUDIATION: u16 = 1 << 1;
    /// `keyEncipherment` ability bit.
    pub const KEY_ENCIPHERMENT: u16 = 1 << 2;
    /// `dataEncipherment` ability bit.
    pub const DATA_ENCIPHERMENT: u16 = 1 << 3;
    /// `keyAgreement` ability bit.
    pub const KEY_AGREEMENT: u16 = 1 << 4;
    /// `keyCertSign` ability bit.
    pub const KEY_CERT_SIGN: u16 = 1 << 5;
    /// `cRLSign` ability bit.
    pub const CRL_SIGN: u16 = 1 << 6;
    /// `encipherOnly` ability bit.
    pub const ENCIPHER_ONLY: u16 = 1 << 7;
    /// `decipherOnly` ability bit.
    pub const DECIPHER_ONLY: u16 = 1 << 8;

    /// Build from a raw ability bitset.
    #[must_use]
    pub const fn new(flags: u16) -> Self {
        Self { flags }
    }

    /// Test for one or more ability bits.
    #[must_use]
    pub const fn has(self, abilities: u16) -> bool {
        self.flags & abilities != 0
    }

    /// May verify/produce digital signatures.
    #[must_use]
    pub const fn digital_signature(self) -> bool {
        self.has(Self::DIGITAL_SIGNATURE)
    }

    /// May encipher (wrap) symmetric keys.
    #[must_use]
    pub const fn key_encipherment(self) -> bool {
        self.has(Self::KEY_ENCIPHERMENT)
    }

    /// May sign other certificates.
    #[must_use]
    pub const fn key_cert_sign(self) -> bool {
        self.has(Self::KEY_CERT_SIGN)
    }
}

/// Extended-key-usage extension content: well-known purposes plus any
/// additional purpose OIDs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedKeyUsage {
    /// `anyExtendedKeyUsage` wildcard purpose.
    pub any: bool,
    /// TLS server authentication.
    pub server_auth: bool,
    /// TLS client authentication.
    pub client_auth: bool,
    /// Code signing.
    pub code_signing: bool,
    /// Email protection (S/MIME).
    pub email_protection: bool,
    /// Trusted timestamping.
    pub time_stamping: bool,
    /// OCSP response signing.
    pub ocsp_signing: bool,
    /// Any other purpose OIDs, dotted form.
    pub other: Vec<String>,
}

/// An extension value together with its criticality flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertExtension<T> {
    /// Whether a validator must understand this extension or reject the
    /// certificate.
    pub critical: bool,
    /// The typed extension content.
    pub value: T,
}

impl<T> CertExtension<T> {
    /// Wrap extension content with its criticality flag.
    pub const fn new(critical: bool, value: T) -> Self {
        Self { critical, value }
    }
}

/// An extension the policy evaluator has no typed model for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawExtension {
    /// Dotted OID of the extension.
    pub oid: String,
    /// Criticality flag.
    pub critical: bool,
}
