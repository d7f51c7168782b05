//! Signature verification capability.
//!
//! Verification is an injected capability of the trust store, not a
//! process-global provider: the store is constructed with whatever
//! implementation should judge signatures, and everything downstream
//! (path building, policy evaluation) goes through that one trait object.

use certo_core::Certificate;
use tracing::trace;

/// Verifies certificate signatures.
///
/// Implementations are assumed correct and side-effect-free. A `false`
/// return discards the path or fails the validation that asked -- there is
/// no "unknown" outcome.
pub trait SignatureVerifier: Send + Sync {
    /// Whether `cert`'s signature verifies under `issuer`'s public key.
    fn verify(&self, cert: &Certificate, issuer: &Certificate) -> bool;

    /// Whether a certificate verifies under its own public key.
    fn self_verify(&self, cert: &Certificate) -> bool {
        self.verify(cert, cert)
    }
}

/// ring-backed verifier over the stored DER encodings.
///
/// Re-parses both encodings on every call. A certificate that fails to
/// re-parse or uses a signature algorithm the backend does not support
/// verifies as `false`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RingVerifier;

impl SignatureVerifier for RingVerifier {
    fn verify(&self, cert: &Certificate, issuer: &Certificate) -> bool {
        let Ok((_, child)) = x509_parser::parse_x509_certificate(cert.der()) else {
            return false;
        };
        let Ok((_, parent)) = x509_parser::parse_x509_certificate(issuer.der()) else {
            return false;
        };

        match child.verify_signature(Some(parent.public_key())) {
            Ok(()) => true,
            Err(e) => {
                trace!(
                    subject = cert.subject(),
                    issuer = issuer.subject(),
                    error = %e,
                    "signature verification failed"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::{
        BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
        KeyUsagePurpose,
    };

    fn dn(name: &str) -> DistinguishedName {
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, name);
        dn
    }

    fn root(name: &str) -> (rcgen::Certificate, KeyPair) {
        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::default();
        params.distinguished_name = dn(name);
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![KeyUsagePurpose::KeyCertSign];
        (params.self_signed(&key).unwrap(), key)
    }

    fn leaf_signed_by(name: &str, issuer: &rcgen::Certificate, issuer_key: &KeyPair) -> rcgen::Certificate {
        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::default();
        params.distinguished_name = dn(name);
        params.is_ca = IsCa::ExplicitNoCa;
        params.key_usages = vec![KeyUsagePurpose::KeyEncipherment];
        params.signed_by(&key, issuer, issuer_key).unwrap()
    }

    fn parse(cert: &rcgen::Certificate) -> Certificate {
        Certificate::from_der(cert.der().to_vec()).unwrap()
    }

    #[test]
    fn verifies_issued_certificate() {
        let (root_cert, root_key) = root("Verify Root");
        let leaf = leaf_signed_by("Verify Leaf", &root_cert, &root_key);

        let verifier = RingVerifier;
        assert!(verifier.verify(&parse(&leaf), &parse(&root_cert)));
    }

    #[test]
    fn self_signed_root_self_verifies() {
        let (root_cert, _) = root("Verify Root");
        let verifier = RingVerifier;
        assert!(verifier.self_verify(&parse(&root_cert)));
    }

    #[test]
    fn rejects_wrong_issuer() {
        let (root_a, key_a) = root("Root A");
        let (root_b, _) = root("Root B");
        let leaf = leaf_signed_by("Leaf", &root_a, &key_a);

        let verifier = RingVerifier;
        assert!(!verifier.verify(&parse(&leaf), &parse(&root_b)));
    }

    #[test]
    fn leaf_does_not_self_verify() {
        let (root_cert, root_key) = root("Root");
        let leaf = leaf_signed_by("Leaf", &root_cert, &root_key);

        let verifier = RingVerifier;
        assert!(!verifier.self_verify(&parse(&leaf)));
    }
}
