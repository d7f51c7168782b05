//! Usage-policy evaluation over a single certification path.
//!
//! Every rule must hold for a path to pass, and the overall validation
//! applies this to every discovered path: one failing path rejects the
//! certificate for the requested usage even if another path would have
//! been fine -- the certificate's owner does not get to pick the most
//! favorable interpretation.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use certo_core::{is_allowed_by, Certificate, Fingerprint, IntendedUsage, Result, TrustError};

use crate::verify::SignatureVerifier;

/// Validate one ordered path (leaf at index 0, self-signed root last)
/// against the declared usage.
///
/// Violations are reported deterministically: the root checks first, then
/// the first offending certificate in leaf-to-root order.
///
/// The declared usage gates the leaf; every certificate above it acts as
/// a CA on this path and is gated by the CA policy instead.
///
/// # Errors
///
/// Returns the first violated rule as the matching `TrustError` kind.
pub fn check_path(
    path: &[Arc<Certificate>],
    usage: IntendedUsage,
    trusted: &BTreeSet<Fingerprint>,
    verifier: &dyn SignatureVerifier,
    now: DateTime<Utc>,
) -> Result<()> {
    let Some(root) = path.last() else {
        return Err(TrustError::NoChainFound {
            subject: String::new(),
        });
    };

    // The root must be explicitly trusted and must verify under its own
    // key.
    if !trusted.contains(root.fingerprint()) {
        return Err(TrustError::UntrustedRoot {
            subject: root.subject().to_string(),
        });
    }
    if !verifier.self_verify(root) {
        return Err(TrustError::InvalidSignature {
            subject: root.subject().to_string(),
            issuer: root.subject().to_string(),
        });
    }

    for (i, cert) in path.iter().enumerate() {
        let subject = cert.subject().to_string();

        // Signature linkage. The path builder already verified every
        // link; re-checked here so a path from any origin is judged on
        // its own.
        if let Some(issuer) = path.get(i + 1) {
            if !verifier.verify(cert, issuer) {
                return Err(TrustError::InvalidSignature {
                    subject,
                    issuer: issuer.subject().to_string(),
                });
            }
        }

        // Validity window at evaluation time.
        if !cert.valid_at(now) {
            return Err(TrustError::Expired { subject });
        }

        // Basic constraints: present everywhere, CA above the leaf,
        // critical on CAs, path-length respected.
        let Some(bc) = cert.basic_constraints() else {
            return Err(TrustError::MissingBasicConstraints { subject });
        };
        let basic = bc.value;
        if i > 0 && !basic.is_ca {
            return Err(TrustError::NonCaInChain { subject });
        }
        if basic.is_ca {
            if !bc.critical {
                return Err(TrustError::CaConstraintsNotCritical { subject });
            }
            if let Some(limit) = basic.path_len_constraint {
                // Certificates at indices 1..i are the CAs below this
                // one; the leaf does not count.
                let below = u32::try_from(i.saturating_sub(1)).unwrap_or(u32::MAX);
                if below > limit {
                    return Err(TrustError::PathLengthViolated {
                        subject,
                        allowed: limit,
                        found: below,
                    });
                }
            }
        }

        // Key usage: present everywhere and compatible with the role the
        // certificate plays on this path.
        let Some(ku) = cert.key_usage() else {
            return Err(TrustError::MissingKeyUsage { subject });
        };
        let effective = if i == 0 { usage } else { IntendedUsage::Ca };
        if !is_allowed_by(effective, basic, ku.value) {
            return Err(TrustError::UsageNotAllowed {
                subject,
                usage: effective,
            });
        }

        // Critical extensions: a CA's key usage must itself be critical,
        // and nothing outside the three understood extensions may be
        // marked critical.
        if basic.is_ca && !ku.critical {
            return Err(TrustError::KeyUsageNotCritical { subject });
        }
        if let Some(raw) = cert.other_extensions().iter().find(|e| e.critical) {
            return Err(TrustError::UnsupportedCriticalExtension {
                subject,
                oid: raw.oid.clone(),
            });
        }
    }

    Ok(())
}
