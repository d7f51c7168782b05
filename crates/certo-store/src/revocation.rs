//! Fail-closed revocation checking.
//!
//! Revocation status comes from an external oracle. The gate's contract
//! is strict: only an explicit `NotRevoked` answer passes a certificate.
//! A `Revoked` answer fails the validation naming the certificate, and an
//! oracle failure (network, timeout, parsing) also fails the validation --
//! it is never interpreted as "not revoked".

use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tracing::debug;

use certo_core::{Fingerprint, Result, TrustError};

use crate::chain::CertPath;

/// Revocation status of a single certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationStatus {
    /// The oracle has no revocation on record for the certificate.
    NotRevoked,
    /// The certificate has been invalidated before its expiry.
    Revoked,
}

/// External oracle answering revocation queries by fingerprint.
///
/// The query is the only operation in the validation pipeline expected to
/// block on I/O; the trust store awaits it without holding its lock.
/// Retries, if any, belong to the oracle's own transport.
#[async_trait]
pub trait RevocationOracle: Send + Sync {
    /// Query the status of the certificate with the given fingerprint.
    async fn query(&self, fingerprint: &Fingerprint) -> Result<RevocationStatus>;
}

/// Check every certificate of every validated path against the oracle.
///
/// Each fingerprint is queried at most once across the whole sweep. The
/// first certificate reported revoked fails the validation; any oracle
/// error surfaces as `OracleUnavailable`.
pub async fn check_paths(paths: &[CertPath], oracle: &dyn RevocationOracle) -> Result<()> {
    let mut queried = BTreeSet::new();

    for path in paths {
        for cert in path {
            if !queried.insert(cert.fingerprint().clone()) {
                continue;
            }

            let status = oracle.query(cert.fingerprint()).await.map_err(|e| match e {
                TrustError::OracleUnavailable(_) => e,
                other => TrustError::OracleUnavailable(other.to_string()),
            })?;

            if status == RevocationStatus::Revoked {
                debug!(subject = cert.subject(), "oracle reports certificate revoked");
                return Err(TrustError::CertificateRevoked {
                    subject: cert.subject().to_string(),
                    fingerprint: cert.fingerprint().to_string(),
                });
            }
        }
    }

    Ok(())
}

/// In-memory oracle backed by a set of revoked fingerprints.
///
/// Useful for tests and air-gapped deployments where the revocation list
/// is distributed out of band; a networked responder implements
/// [`RevocationOracle`] with its own transport instead.
#[derive(Debug, Default)]
pub struct StaticOracle {
    revoked: RwLock<BTreeSet<Fingerprint>>,
}

impl StaticOracle {
    /// An oracle with nothing revoked.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a fingerprint as revoked.
    pub fn revoke(&self, fingerprint: Fingerprint) {
        self.revoked
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(fingerprint);
    }
}

#[async_trait]
impl RevocationOracle for StaticOracle {
    async fn query(&self, fingerprint: &Fingerprint) -> Result<RevocationStatus> {
        let revoked = self
            .revoked
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(fingerprint);
        Ok(if revoked {
            RevocationStatus::Revoked
        } else {
            RevocationStatus::NotRevoked
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{ca, leaf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Oracle that counts queries and fails or revokes on demand.
    struct ScriptedOracle {
        queries: AtomicUsize,
        revoked: Option<Fingerprint>,
        fail: bool,
    }

    impl ScriptedOracle {
        fn passing() -> Self {
            Self {
                queries: AtomicUsize::new(0),
                revoked: None,
                fail: false,
            }
        }
    }

    #[async_trait]
    impl RevocationOracle for ScriptedOracle {
        async fn query(&self, fingerprint: &Fingerprint) -> Result<RevocationStatus> {
            self.queries.fetch_add(1, Ordering::Relaxed);
            if self.fail {
                return Err(TrustError::OracleUnavailable("scripted failure".into()));
            }
            Ok(if self.revoked.as_ref() == Some(fingerprint) {
                RevocationStatus::Revoked
            } else {
                RevocationStatus::NotRevoked
            })
        }
    }

    fn two_paths() -> Vec<CertPath> {
        let root = ca("CN=Root", "CN=Root").build();
        let inter_a = ca("CN=Inter A", "CN=Root").build();
        let inter_b = ca("CN=Inter B", "CN=Root").build();
        let end = leaf("CN=Leaf", "CN=Inter A").build();
        vec![
            vec![end.clone(), inter_a, root.clone()],
            vec![end, inter_b, root],
        ]
    }

    #[tokio::test]
    async fn static_oracle_round_trip() {
        let oracle = StaticOracle::new();
        let fp = ca("CN=X", "CN=X").build().fingerprint().clone();

        assert_eq!(oracle.query(&fp).await.unwrap(), RevocationStatus::NotRevoked);
        oracle.revoke(fp.clone());
        assert_eq!(oracle.query(&fp).await.unwrap(), RevocationStatus::Revoked);
    }

    #[tokio::test]
    async fn clean_paths_pass() {
        let paths = two_paths();
        let oracle = ScriptedOracle::passing();
        check_paths(&paths, &oracle).await.unwrap();
    }

    #[tokio::test]
    async fn shared_certificates_queried_once() {
        let paths = two_paths();
        let oracle = ScriptedOracle::passing();
        check_paths(&paths, &oracle).await.unwrap();
        // Four distinct certificates across the two paths.
        assert_eq!(oracle.queries.load(Ordering::Relaxed), 4);
    }

    #[tokio::test]
    async fn revoked_certificate_names_itself() {
        let paths = two_paths();
        let target = paths[0][1].clone();
        let oracle = ScriptedOracle {
            queries: AtomicUsize::new(0),
            revoked: Some(target.fingerprint().clone()),
            fail: false,
        };

        let err = check_paths(&paths, &oracle).await.unwrap_err();
        match err {
            TrustError::CertificateRevoked { subject, .. } => {
                assert_eq!(subject, target.subject());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn oracle_failure_rejects() {
        let paths = two_paths();
        let oracle = ScriptedOracle {
            queries: AtomicUsize::new(0),
            revoked: None,
            fail: true,
        };

        let err = check_paths(&paths, &oracle).await.unwrap_err();
        assert!(matches!(err, TrustError::OracleUnavailable(_)));
    }
}
