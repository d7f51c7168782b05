//! Certification-path construction.
//!
//! Given a leaf certificate and a pool of known certificates, discovers
//! every path from the leaf to a self-signed root. The search is
//! exhaustive, not shortest-path: cross-certified identities can yield
//! several valid paths for one leaf, and the policy evaluator must see
//! all of them.
//!
//! The search runs over an explicit worklist of owned path snapshots:
//! whenever an identity resolves to several candidate issuers, the path
//! is copied once per candidate, so no two queued paths ever share
//! backing storage.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::trace;

use certo_core::{Certificate, Result, TrustError};

use crate::verify::SignatureVerifier;

/// An ordered certification path: leaf at index 0, self-signed root last.
pub type CertPath = Vec<Arc<Certificate>>;

/// Index of all pool certificates by subject identity.
///
/// A subject identity may map to several certificates -- that is what
/// makes cross-certification possible.
fn index_by_subject(
    leaf: &Arc<Certificate>,
    pool: &[Arc<Certificate>],
) -> BTreeMap<String, Vec<Arc<Certificate>>> {
    let mut index: BTreeMap<String, Vec<Arc<Certificate>>> = BTreeMap::new();
    for cert in pool {
        index
            .entry(cert.subject().to_string())
            .or_default()
            .push(Arc::clone(cert));
    }

    // The leaf may not have been added to the pool yet; it still has to
    // be reachable under its own identity.
    let known = index
        .get(leaf.subject())
        .is_some_and(|certs| certs.iter().any(|c| c.fingerprint() == leaf.fingerprint()));
    if !known {
        index
            .entry(leaf.subject().to_string())
            .or_default()
            .push(Arc::clone(leaf));
    }

    index
}

/// Find every certification path from `leaf` to a self-signed root.
///
/// Forks once per candidate issuer, discards cycles, dead ends, broken
/// signature links and paths exceeding `max_depth`. When a path
/// terminates at a self-signed certificate, index 0 is re-bound to the
/// caller-supplied leaf object and the leaf's signature is re-verified
/// against the next element -- this guards against the first element
/// having been substituted by a same-identity certificate during lookup.
///
/// # Errors
///
/// Returns `TrustError::NoChainFound` if no path survives.
pub fn build_all_paths(
    leaf: &Arc<Certificate>,
    pool: &[Arc<Certificate>],
    verifier: &dyn SignatureVerifier,
    max_depth: usize,
) -> Result<Vec<CertPath>> {
    let index = index_by_subject(leaf, pool);

    let mut work: Vec<CertPath> = index
        .get(leaf.subject())
        .map(|starts| starts.iter().map(|c| vec![Arc::clone(c)]).collect())
        .unwrap_or_default();
    let mut complete: Vec<CertPath> = Vec::new();

    while let Some(mut path) = work.pop() {
        let Some(tip) = path.last().map(Arc::clone) else {
            continue;
        };

        if tip.is_self_issued() {
            // Candidate termination: re-bind index 0 to the original leaf
            // and re-verify the first link.
            path[0] = Arc::clone(leaf);
            if path.len() > 1 && !verifier.verify(&path[0], &path[1]) {
                trace!(
                    subject = leaf.subject(),
                    root = tip.subject(),
                    "discarding path: leaf does not verify after re-binding"
                );
                continue;
            }
            trace!(root = tip.subject(), len = path.len(), "path complete");
            complete.push(path);
            continue;
        }

        if path.len() >= max_depth {
            trace!(subject = tip.subject(), "discarding path: depth cap reached");
            continue;
        }

        let Some(issuers) = index.get(tip.issuer()) else {
            trace!(
                subject = tip.subject(),
                issuer = tip.issuer(),
                "discarding path: issuer not known"
            );
            continue;
        };

        for issuer in issuers {
            if path.iter().any(|c| c.fingerprint() == issuer.fingerprint()) {
                trace!(subject = issuer.subject(), "skipping candidate issuer: cycle");
                continue;
            }
            if !verifier.verify(&tip, issuer) {
                trace!(
                    subject = tip.subject(),
                    issuer = issuer.subject(),
                    "skipping candidate issuer: signature does not verify"
                );
                continue;
            }
            let mut fork = path.clone();
            fork.push(Arc::clone(issuer));
            work.push(fork);
        }
    }

    if complete.is_empty() {
        return Err(TrustError::NoChainFound {
            subject: leaf.subject().to_string(),
        });
    }

    Ok(complete)
}

/// Find the single certification path from `leaf` to a self-signed root.
///
/// Legacy mode for stores without cross-certification: every identity
/// along the walk must resolve to exactly one certificate.
///
/// # Errors
///
/// Returns `TrustError::AmbiguousChain` if any identity along the path
/// resolves to more than one certificate, `TrustError::InvalidSignature`
/// if a link does not verify, and `TrustError::NoChainFound` on dead
/// ends, cycles or depth overrun.
pub fn build_unique_path(
    leaf: &Arc<Certificate>,
    pool: &[Arc<Certificate>],
    verifier: &dyn SignatureVerifier,
    max_depth: usize,
) -> Result<CertPath> {
    let index = index_by_subject(leaf, pool);
    let dead_end = || TrustError::NoChainFound {
        subject: leaf.subject().to_string(),
    };

    if index.get(leaf.subject()).is_some_and(|certs| certs.len() > 1) {
        return Err(TrustError::AmbiguousChain {
            subject: leaf.subject().to_string(),
        });
    }

    let mut path: CertPath = vec![Arc::clone(leaf)];

    loop {
        let Some(tip) = path.last().map(Arc::clone) else {
            return Err(dead_end());
        };

        if tip.is_self_issued() {
            return Ok(path);
        }

        if path.len() >= max_depth {
            return Err(dead_end());
        }

        let issuers = index.get(tip.issuer()).ok_or_else(dead_end)?;
        if issuers.len() > 1 {
            return Err(TrustError::AmbiguousChain {
                subject: tip.issuer().to_string(),
            });
        }
        let Some(issuer) = issuers.first() else {
            return Err(dead_end());
        };

        if path.iter().any(|c| c.fingerprint() == issuer.fingerprint()) {
            return Err(dead_end());
        }
        if !verifier.verify(&tip, issuer) {
            return Err(TrustError::InvalidSignature {
                subject: tip.subject().to_string(),
                issuer: issuer.subject().to_string(),
            });
        }

        path.push(Arc::clone(issuer));
    }
}
