//! Error types for certificate trust evaluation.

use thiserror::Error;

use crate::usage::IntendedUsage;

/// Result type alias for trust-evaluation operations.
pub type Result<T> = std::result::Result<T, TrustError>;

/// Errors surfaced by the trust store and its validation pipeline.
///
/// Validation is fail-closed: a certificate is either fully validated for
/// the requested usage or rejected with one of these kinds. None of them is
/// ever downgraded to a warning.
#[derive(Error, Debug)]
pub enum TrustError {
    /// No certificate is stored under the given fingerprint.
    #[error("no certificate known for fingerprint {fingerprint}")]
    UnknownFingerprint {
        /// Colon-hex form of the fingerprint that was looked up.
        fingerprint: String,
    },

    /// No certification path from the leaf to a self-signed root exists.
    #[error("no certification path to a self-signed root found for {subject}")]
    NoChainFound {
        /// Subject identity of the leaf certificate.
        subject: String,
    },

    /// Unique-path mode only: a subject identity resolves to more than one
    /// certificate (cross-certification).
    #[error("subject identity {subject} resolves to more than one certificate")]
    AmbiguousChain {
        /// The ambiguous subject identity.
        subject: String,
    },

    /// The path terminates at a root that is not marked trusted.
    #[error("root certificate {subject} is not a trusted root")]
    UntrustedRoot {
        /// Subject identity of the untrusted root.
        subject: String,
    },

    /// A certificate's signature does not verify under its issuer's key.
    #[error("signature of {subject} does not verify under {issuer}")]
    InvalidSignature {
        /// Subject identity of the certificate whose signature failed.
        subject: String,
        /// Subject identity of the issuer the signature was checked against.
        issuer: String,
    },

    /// A certificate in the path is outside its validity window.
    #[error("certificate {subject} is outside its validity window")]
    Expired {
        /// Subject identity of the expired certificate.
        subject: String,
    },

    /// A certificate in the path carries no basic-constraints extension.
    #[error("certificate {subject} carries no basic-constraints extension")]
    MissingBasicConstraints {
        /// Subject identity of the offending certificate.
        subject: String,
    },

    /// A non-leaf certificate in the path is not a CA certificate.
    #[error("non-CA certificate {subject} above the leaf position")]
    NonCaInChain {
        /// Subject identity of the non-CA certificate.
        subject: String,
    },

    /// A CA certificate's basic-constraints extension is not critical.
    #[error("CA certificate {subject}: basic-constraints extension not critical")]
    CaConstraintsNotCritical {
        /// Subject identity of the offending CA certificate.
        subject: String,
    },

    /// A CA certificate's path-length constraint is exceeded by the
    /// subordinate CAs below it in the path.
    #[error("path length constraint of {subject} violated: {allowed} subordinate CAs allowed, {found} present")]
    PathLengthViolated {
        /// Subject identity of the constrained CA certificate.
        subject: String,
        /// Maximum number of subordinate CAs the constraint allows.
        allowed: u32,
        /// Number of subordinate CAs actually below it in the path.
        found: u32,
    },

    /// A certificate in the path carries no key-usage extension.
    #[error("certificate {subject} carries no key-usage extension")]
    MissingKeyUsage {
        /// Subject identity of the offending certificate.
        subject: String,
    },

    /// A certificate's constraints do not allow the intended usage.
    #[error("certificate {subject} does not allow use for {usage}")]
    UsageNotAllowed {
        /// Subject identity of the offending certificate.
        subject: String,
        /// The usage that was requested.
        usage: IntendedUsage,
    },

    /// A certificate carries a critical extension the evaluator does not
    /// handle (anything other than basic-constraints, key-usage and
    /// extended-key-usage).
    #[error("certificate {subject} carries unsupported critical extension {oid}")]
    UnsupportedCriticalExtension {
        /// Subject identity of the offending certificate.
        subject: String,
        /// Dotted OID of the unsupported extension.
        oid: String,
    },

    /// A CA certificate's key-usage extension is not critical.
    #[error("CA certificate {subject}: key-usage extension not critical")]
    KeyUsageNotCritical {
        /// Subject identity of the offending CA certificate.
        subject: String,
    },

    /// The revocation oracle reported a certificate in the path as revoked.
    #[error("certificate {subject} ({fingerprint}) has been revoked")]
    CertificateRevoked {
        /// Subject identity of the revoked certificate.
        subject: String,
        /// Colon-hex fingerprint of the revoked certificate.
        fingerprint: String,
    },

    /// The revocation oracle could not be queried. Never treated as
    /// "not revoked".
    #[error("revocation oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// A fingerprint string does not have the canonical colon-hex form.
    #[error("malformed fingerprint: {0}")]
    MalformedFingerprint(String),

    /// A certificate blob could not be parsed.
    #[error("certificate parse error: {0}")]
    ParseError(String),

    /// I/O failure while reading from a certificate source.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
