//! Shared test fixtures: hand-assembled certificates and a
//! convention-based signature verifier.
//!
//! The builder produces `Certificate` values from parts, with a unique
//! synthetic encoding per certificate so fingerprints never collide. The
//! stub verifier treats a signature as valid whenever the child's issuer
//! identity names the issuer's subject identity, minus any explicitly
//! denied pair -- enough to model broken links and substituted leaves
//! without real keys.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};

use certo_core::{
    BasicConstraints, CertExtension, Certificate, CertificateParts, Fingerprint, KeyUsage,
    RawExtension,
};

use crate::verify::SignatureVerifier;

static SERIAL: AtomicU64 = AtomicU64::new(1);

/// Builder for synthetic certificates.
pub(crate) struct CertBuilder {
    subject: String,
    issuer: String,
    basic: Option<CertExtension<BasicConstraints>>,
    key_usage: Option<CertExtension<KeyUsage>>,
    other: Vec<RawExtension>,
    expired: bool,
}

/// An end-entity certificate: basic constraints present (non-critical),
/// key usage keyEncipherment + digitalSignature (non-critical).
pub(crate) fn leaf(subject: &str, issuer: &str) -> CertBuilder {
    CertBuilder {
        subject: subject.to_string(),
        issuer: issuer.to_string(),
        basic: Some(CertExtension::new(false, BasicConstraints::end_entity())),
        key_usage: Some(CertExtension::new(
            false,
            KeyUsage::new(KeyUsage::KEY_ENCIPHERMENT | KeyUsage::DIGITAL_SIGNATURE),
        )),
        other: Vec::new(),
        expired: false,
    }
}

/// A CA certificate: basic constraints critical and unbounded, key usage
/// keyCertSign (critical).
pub(crate) fn ca(subject: &str, issuer: &str) -> CertBuilder {
    CertBuilder {
        subject: subject.to_string(),
        issuer: issuer.to_string(),
        basic: Some(CertExtension::new(true, BasicConstraints::ca(None))),
        key_usage: Some(CertExtension::new(
            true,
            KeyUsage::new(KeyUsage::KEY_CERT_SIGN),
        )),
        other: Vec::new(),
        expired: false,
    }
}

impl CertBuilder {
    /// Set the CA path-length constraint.
    pub(crate) fn path_len(mut self, limit: u32) -> Self {
        if let Some(bc) = &mut self.basic {
            bc.value.path_len_constraint = Some(limit);
        }
        self
    }

    /// Override the basic-constraints criticality flag.
    pub(crate) fn bc_critical(mut self, critical: bool) -> Self {
        if let Some(bc) = &mut self.basic {
            bc.critical = critical;
        }
        self
    }

    /// Drop the basic-constraints extension entirely.
    pub(crate) fn no_basic_constraints(mut self) -> Self {
        self.basic = None;
        self
    }

    /// Replace the key-usage ability bits, keeping the criticality flag.
    pub(crate) fn key_usage(mut self, flags: u16) -> Self {
        let critical = self.key_usage.as_ref().is_some_and(|ku| ku.critical);
        self.key_usage = Some(CertExtension::new(critical, KeyUsage::new(flags)));
        self
    }

    /// Override the key-usage criticality flag.
    pub(crate) fn ku_critical(mut self, critical: bool) -> Self {
        if let Some(ku) = &mut self.key_usage {
            ku.critical = critical;
        }
        self
    }

    /// Drop the key-usage extension entirely.
    pub(crate) fn no_key_usage(mut self) -> Self {
        self.key_usage = None;
        self
    }

    /// Attach an extension the evaluator has no model for, marked
    /// critical.
    pub(crate) fn critical_extension(mut self, oid: &str) -> Self {
        self.other.push(RawExtension {
            oid: oid.to_string(),
            critical: true,
        });
        self
    }

    /// Put the validity window entirely in the past.
    pub(crate) fn expired(mut self) -> Self {
        self.expired = true;
        self
    }

    /// Assemble the certificate.
    pub(crate) fn build(self) -> Arc<Certificate> {
        let serial = SERIAL.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now();
        let (not_before, not_after) = if self.expired {
            (now - Duration::days(730), now - Duration::days(365))
        } else {
            (now - Duration::days(1), now + Duration::days(365))
        };

        Arc::new(Certificate::from_parts(CertificateParts {
            encoding: format!("{}|{}|{serial}", self.subject, self.issuer).into_bytes(),
            subject: self.subject,
            issuer: self.issuer,
            serial: format!("{serial:02x}"),
            not_before,
            not_after,
            basic_constraints: self.basic,
            key_usage: self.key_usage,
            extended_key_usage: None,
            other_extensions: self.other,
        }))
    }
}

/// Convention-based verifier: a signature is good iff the child names the
/// issuer's subject identity, unless the exact pair was denied.
pub(crate) struct StubVerifier {
    broken: HashSet<(Fingerprint, Fingerprint)>,
}

impl StubVerifier {
    pub(crate) fn new() -> Self {
        Self {
            broken: HashSet::new(),
        }
    }

    /// Make the (certificate, issuer) pair fail verification.
    pub(crate) fn deny(&mut self, cert: &Certificate, issuer: &Certificate) {
        self.broken
            .insert((cert.fingerprint().clone(), issuer.fingerprint().clone()));
    }
}

impl SignatureVerifier for StubVerifier {
    fn verify(&self, cert: &Certificate, issuer: &Certificate) -> bool {
        let pair = (cert.fingerprint().clone(), issuer.fingerprint().clone());
        if self.broken.contains(&pair) {
            return false;
        }
        cert.issuer() == issuer.subject()
    }
}
