//! The certificate trust store and its validating entry point.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, warn};

use certo_core::{Certificate, Fingerprint, IntendedUsage, Result, TrustError};

use crate::chain::{build_all_paths, build_unique_path, CertPath};
use crate::options::ValidationOptions;
use crate::policy::check_path;
use crate::revocation::{check_paths, RevocationOracle};
use crate::source::CertificateSource;
use crate::verify::{RingVerifier, SignatureVerifier};

/// Fingerprint-keyed certificate store with a trusted-root set and a
/// policy-gated accessor.
///
/// The store is a shared, mutable resource: insertions and trust marking
/// may happen concurrently with lookups and validations.
/// [`use_certificate`](Self::use_certificate) captures a consistent
/// snapshot at entry, so a validation in progress never observes a torn
/// path, and the revocation oracle is awaited with no lock held -- a slow
/// oracle never blocks unrelated lookups or insertions.
///
/// The store grows monotonically: certificates are never removed during a
/// session.
pub struct TrustStore {
    inner: RwLock<Inner>,
    verifier: Arc<dyn SignatureVerifier>,
    oracle: Arc<dyn RevocationOracle>,
    options: ValidationOptions,
}

#[derive(Default)]
struct Inner {
    certs: BTreeMap<Fingerprint, Arc<Certificate>>,
    trusted: BTreeSet<Fingerprint>,
}

impl TrustStore {
    /// Create a store with the ring-backed signature verifier.
    pub fn new(oracle: Arc<dyn RevocationOracle>) -> Self {
        Self::with_verifier(Arc::new(RingVerifier), oracle)
    }

    /// Create a store with a custom signature verifier.
    pub fn with_verifier(
        verifier: Arc<dyn SignatureVerifier>,
        oracle: Arc<dyn RevocationOracle>,
    ) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            verifier,
            oracle,
            options: ValidationOptions::default(),
        }
    }

    /// Replace the validation options.
    #[must_use]
    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    /// Add a certificate, keyed by its fingerprint.
    ///
    /// Returns `true` if it was newly inserted. Re-adding a certificate
    /// with a known fingerprint keeps the existing entry, discards the
    /// incoming copy and returns `false`; concurrent duplicate inserts
    /// are therefore a harmless no-op.
    pub fn add(&self, cert: Certificate) -> bool {
        let fingerprint = cert.fingerprint().clone();
        match self.write().certs.entry(fingerprint) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                debug!(subject = cert.subject(), "certificate added");
                slot.insert(Arc::new(cert));
                true
            }
        }
    }

    /// Bulk-load every certificate a source lists.
    ///
    /// Unparseable entries are logged and skipped without aborting the
    /// batch, and do not count towards the result; an I/O failure of the
    /// source itself fails the call. Returns the number of newly inserted
    /// certificates (duplicates of stored certificates do not count
    /// either).
    pub async fn add_all_from_source(&self, source: &dyn CertificateSource) -> Result<usize> {
        let blobs = source.list().await?;
        let mut added = 0;

        for blob in blobs {
            match Certificate::from_der(blob) {
                Ok(cert) => {
                    if self.add(cert) {
                        added += 1;
                    }
                }
                Err(e) => warn!(error = %e, "skipping unparseable certificate"),
            }
        }

        debug!(added, "bulk load complete");
        Ok(added)
    }

    /// Look up a certificate by fingerprint. No validation side effects.
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<Arc<Certificate>> {
        self.read().certs.get(fingerprint).cloned()
    }

    /// Mark a fingerprint as a trusted root.
    ///
    /// Trust is a statement about an identity, independent of possessing
    /// the bytes: the certificate itself may be added later, or never.
    /// Returns `false` if the fingerprint was already trusted.
    pub fn mark_trusted(&self, fingerprint: Fingerprint) -> bool {
        self.write().trusted.insert(fingerprint)
    }

    /// Add a certificate and mark its fingerprint trusted in one step.
    pub fn add_trusted(&self, cert: Certificate) {
        let fingerprint = cert.fingerprint().clone();
        self.add(cert);
        self.mark_trusted(fingerprint);
    }

    /// Whether a fingerprint is marked as a trusted root.
    pub fn is_trusted(&self, fingerprint: &Fingerprint) -> bool {
        self.read().trusted.contains(fingerprint)
    }

    /// All trusted-root fingerprints, in order.
    pub fn trusted_roots(&self) -> Vec<Fingerprint> {
        self.read().trusted.iter().cloned().collect()
    }

    /// All stored certificates, in fingerprint order.
    pub fn certificates(&self) -> Vec<Arc<Certificate>> {
        self.read().certs.values().cloned().collect()
    }

    /// Number of stored certificates.
    pub fn len(&self) -> usize {
        self.read().certs.len()
    }

    /// Whether the store holds no certificates.
    pub fn is_empty(&self) -> bool {
        self.read().certs.is_empty()
    }

    /// All certification paths from the stored certificate to self-signed
    /// roots, over the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFingerprint` if the certificate is not stored and
    /// `NoChainFound` if no path exists.
    pub fn paths_for(&self, fingerprint: &Fingerprint) -> Result<Vec<CertPath>> {
        let (leaf, pool, _) = self.snapshot_for(fingerprint)?;
        build_all_paths(
            &leaf,
            &pool,
            self.verifier.as_ref(),
            self.options.max_path_depth,
        )
    }

    /// Resolve a certificate for a declared usage.
    ///
    /// With `usage == None` the certificate is returned as stored, with
    /// no validation whatsoever -- the inspection escape hatch; even an
    /// expired or unchained certificate resolves.
    ///
    /// With a usage, the certificate is returned only if **every**
    /// certification path from it to a trusted root satisfies the whole
    /// usage policy and no certificate on any path is revoked. Any
    /// failure rejects the call as a whole; there is no partial success.
    pub async fn use_certificate(
        &self,
        fingerprint: &Fingerprint,
        usage: Option<IntendedUsage>,
    ) -> Result<Arc<Certificate>> {
        // Consistent snapshot; path construction and policy evaluation
        // run lock-free on it.
        let (leaf, pool, trusted) = self.snapshot_for(fingerprint)?;

        let Some(usage) = usage else {
            return Ok(leaf);
        };

        let paths = if self.options.unique_path {
            vec![build_unique_path(
                &leaf,
                &pool,
                self.verifier.as_ref(),
                self.options.max_path_depth,
            )?]
        } else {
            build_all_paths(
                &leaf,
                &pool,
                self.verifier.as_ref(),
                self.options.max_path_depth,
            )?
        };

        let now = self.options.evaluation_time.unwrap_or_else(Utc::now);
        for path in &paths {
            check_path(path, usage, &trusted, self.verifier.as_ref(), now)?;
        }

        // The only blocking I/O of the pipeline; no lock is held here.
        check_paths(&paths, self.oracle.as_ref()).await?;

        debug!(
            subject = leaf.subject(),
            usage = %usage,
            paths = paths.len(),
            "certificate validated"
        );
        Ok(leaf)
    }

    /// Consistent view of the store under one read-lock acquisition:
    /// the resolved certificate, the full pool and the trusted set.
    fn snapshot_for(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<(Arc<Certificate>, Vec<Arc<Certificate>>, BTreeSet<Fingerprint>)> {
        let inner = self.read();
        let leaf = inner.certs.get(fingerprint).cloned().ok_or_else(|| {
            TrustError::UnknownFingerprint {
                fingerprint: fingerprint.to_string(),
            }
        })?;
        let pool = inner.certs.values().cloned().collect();
        Ok((leaf, pool, inner.trusted.clone()))
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
