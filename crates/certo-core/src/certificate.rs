//! Owned X.509 certificate values.
//!
//! The trust store works on an eagerly-extracted, owned representation:
//! the DER encoding is kept verbatim (it is what signatures are verified
//! over and what the fingerprint hashes), and everything the policy
//! evaluator needs -- identities, validity window, typed extensions -- is
//! pulled out once at construction time.

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{Result, TrustError};
use crate::extensions::{
    BasicConstraints, CertExtension, ExtendedKeyUsage, KeyUsage, RawExtension,
};
use crate::fingerprint::Fingerprint;

/// An immutable X.509 certificate.
///
/// Two certificates are equal iff their DER encodings are equal; the
/// fingerprint is computed once at construction and never changes.
#[derive(Clone)]
pub struct Certificate {
    der: Vec<u8>,
    fingerprint: Fingerprint,
    subject: String,
    issuer: String,
    serial: String,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    basic_constraints: Option<CertExtension<BasicConstraints>>,
    key_usage: Option<CertExtension<KeyUsage>>,
    extended_key_usage: Option<CertExtension<ExtendedKeyUsage>>,
    other_extensions: Vec<RawExtension>,
}

/// Externally-parsed certificate fields, ready for assembly into a
/// [`Certificate`].
///
/// This is the entry point for callers that bring their own parser; the
/// `encoding` is whatever canonical byte form identifies the certificate
/// and is what the fingerprint is computed over.
#[derive(Debug, Clone)]
pub struct CertificateParts {
    /// Canonical encoding of the certificate.
    pub encoding: Vec<u8>,
    /// Subject identity (distinguished name, human-readable form).
    pub subject: String,
    /// Issuer identity (distinguished name, human-readable form).
    pub issuer: String,
    /// Serial number, hex form.
    pub serial: String,
    /// Start of the validity window.
    pub not_before: DateTime<Utc>,
    /// End of the validity window.
    pub not_after: DateTime<Utc>,
    /// Basic-constraints extension, if present.
    pub basic_constraints: Option<CertExtension<BasicConstraints>>,
    /// Key-usage extension, if present.
    pub key_usage: Option<CertExtension<KeyUsage>>,
    /// Extended-key-usage extension, if present.
    pub extended_key_usage: Option<CertExtension<ExtendedKeyUsage>>,
    /// All remaining extensions, as OID/criticality pairs.
    pub other_extensions: Vec<RawExtension>,
}

impl Certificate {
    /// Parse a DER-encoded X.509 certificate.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::ParseError` if the bytes are not a single
    /// well-formed certificate.
    pub fn from_der(der: Vec<u8>) -> Result<Self> {
        let parts = extract_parts(&der)?;
        Ok(Self::from_parts(parts))
    }

    /// Parse a single PEM-armored certificate.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::ParseError` if the PEM armor is broken, the
    /// block is not a `CERTIFICATE`, or the enclosed DER does not parse.
    pub fn from_pem(data: &[u8]) -> Result<Self> {
        let block = pem::parse(data).map_err(|e| TrustError::ParseError(e.to_string()))?;
        if block.tag() != "CERTIFICATE" {
            return Err(TrustError::ParseError(format!(
                "expected a CERTIFICATE block, found {}",
                block.tag()
            )));
        }
        Self::from_der(block.contents().to_vec())
    }

    /// Assemble a certificate from externally-parsed fields.
    #[must_use]
    pub fn from_parts(parts: CertificateParts) -> Self {
        let fingerprint = Fingerprint::of_der(&parts.encoding);
        Self {
            der: parts.encoding,
            fingerprint,
            subject: parts.subject,
            issuer: parts.issuer,
            serial: parts.serial,
            not_before: parts.not_before,
            not_after: parts.not_after,
            basic_constraints: parts.basic_constraints,
            key_usage: parts.key_usage,
            extended_key_usage: parts.extended_key_usage,
            other_extensions: parts.other_extensions,
        }
    }

    /// The certificate's canonical encoding.
    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Fingerprint of the canonical encoding.
    #[must_use]
    pub const fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Subject identity.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Issuer identity.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Serial number, hex form.
    #[must_use]
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Start of the validity window.
    #[must_use]
    pub const fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    /// End of the validity window.
    #[must_use]
    pub const fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// Whether subject and issuer identity coincide.
    #[must_use]
    pub fn is_self_issued(&self) -> bool {
        self.subject == self.issuer
    }

    /// Whether `at` falls inside the validity window.
    #[must_use]
    pub fn valid_at(&self, at: DateTime<Utc>) -> bool {
        self.not_before <= at && at <= self.not_after
    }

    /// Basic-constraints extension, if present.
    #[must_use]
    pub const fn basic_constraints(&self) -> Option<&CertExtension<BasicConstraints>> {
        self.basic_constraints.as_ref()
    }

    /// Key-usage extension, if present.
    #[must_use]
    pub const fn key_usage(&self) -> Option<&CertExtension<KeyUsage>> {
        self.key_usage.as_ref()
    }

    /// Extended-key-usage extension, if present.
    #[must_use]
    pub const fn extended_key_usage(&self) -> Option<&CertExtension<ExtendedKeyUsage>> {
        self.extended_key_usage.as_ref()
    }

    /// Extensions without a typed model, as OID/criticality pairs.
    #[must_use]
    pub fn other_extensions(&self) -> &[RawExtension] {
        &self.other_extensions
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}

impl std::fmt::Debug for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject)
            .field("issuer", &self.issuer)
            .field("serial", &self.serial)
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

/// Run the X.509 parser over a DER blob and pull out everything the trust
/// engine needs.
fn extract_parts(der: &[u8]) -> Result<CertificateParts> {
    use x509_parser::extensions::ParsedExtension;

    let (rest, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| TrustError::ParseError(e.to_string()))?;
    if !rest.is_empty() {
        return Err(TrustError::ParseError(
            "trailing data after certificate".to_string(),
        ));
    }

    let subject = cert.subject().to_string();
    let issuer = cert.issuer().to_string();
    let serial = cert.raw_serial_as_string();
    let not_before = asn1_to_utc(cert.validity().not_before);
    let not_after = asn1_to_utc(cert.validity().not_after);

    let mut basic_constraints = None;
    let mut key_usage = None;
    let mut extended_key_usage = None;
    let mut other_extensions = Vec::new();

    for ext in cert.extensions() {
        match ext.parsed_extension() {
            ParsedExtension::BasicConstraints(bc) => {
                basic_constraints = Some(CertExtension::new(
                    ext.critical,
                    BasicConstraints {
                        is_ca: bc.ca,
                        path_len_constraint: bc.path_len_constraint,
                    },
                ));
            }
            ParsedExtension::KeyUsage(ku) => {
                key_usage = Some(CertExtension::new(ext.critical, KeyUsage::new(ku.flags)));
            }
            ParsedExtension::ExtendedKeyUsage(eku) => {
                extended_key_usage = Some(CertExtension::new(
                    ext.critical,
                    ExtendedKeyUsage {
                        any: eku.any,
                        server_auth: eku.server_auth,
                        client_auth: eku.client_auth,
                        code_signing: eku.code_signing,
                        email_protection: eku.email_protection,
                        time_stamping: eku.time_stamping,
                        ocsp_signing: eku.ocsp_signing,
                        other: eku.other.iter().map(|oid| oid.to_id_string()).collect(),
                    },
                ));
            }
            _ => other_extensions.push(RawExtension {
                oid: ext.oid.to_id_string(),
                critical: ext.critical,
            }),
        }
    }

    Ok(CertificateParts {
        encoding: der.to_vec(),
        subject,
        issuer,
        serial,
        not_before,
        not_after,
        basic_constraints,
        key_usage,
        extended_key_usage,
        other_extensions,
    })
}

/// Convert an ASN.1 `GeneralizedTime` / `UTCTime` to `DateTime<Utc>`.
fn asn1_to_utc(t: x509_parser::time::ASN1Time) -> DateTime<Utc> {
    let epoch = t.timestamp();
    Utc.timestamp_opt(epoch, 0)
        .single()
        .unwrap_or_else(Utc::now)
}
