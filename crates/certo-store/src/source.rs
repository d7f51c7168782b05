//! Certificate sources for bulk loading.
//!
//! A source only does I/O and PEM un-armoring: it hands back raw DER
//! blobs. Parsing, dedup and counting happen in the trust store's bulk
//! loader, so one bad certificate never aborts a batch while an I/O
//! failure of the source as a whole does.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use certo_core::{Result, TrustError};

/// A supplier of raw DER certificate blobs.
#[async_trait]
pub trait CertificateSource: Send + Sync {
    /// List every certificate blob this source holds.
    async fn list(&self) -> Result<Vec<Vec<u8>>>;
}

/// A single PEM bundle file containing any number of `CERTIFICATE`
/// blocks. Non-certificate blocks (keys, CRLs) are skipped.
pub struct PemFileSource {
    path: PathBuf,
}

impl PemFileSource {
    /// Source reading from the given bundle file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CertificateSource for PemFileSource {
    async fn list(&self) -> Result<Vec<Vec<u8>>> {
        let content = tokio::fs::read(&self.path).await?;
        read_pem_bundle(&content, &self.path)
    }
}

/// A directory of certificate files (`.crt`, `.pem`, `.cer`, `.der`).
///
/// Each file is read as a PEM bundle; a file without PEM armor is taken
/// as a single raw DER blob. Files with other extensions are ignored.
pub struct DirectorySource {
    path: PathBuf,
}

impl DirectorySource {
    /// Source scanning the given directory (non-recursive).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CertificateSource for DirectorySource {
    async fn list(&self) -> Result<Vec<Vec<u8>>> {
        let mut blobs = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.path).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !matches!(ext, "crt" | "pem" | "cer" | "der") {
                continue;
            }

            let content = tokio::fs::read(&path).await?;
            match pem::parse_many(&content) {
                Ok(blocks) if !blocks.is_empty() => {
                    for block in &blocks {
                        if block.tag() == "CERTIFICATE" {
                            blobs.push(block.contents().to_vec());
                        } else {
                            debug!(
                                path = %path.display(),
                                tag = block.tag(),
                                "skipping non-certificate block"
                            );
                        }
                    }
                }
                // No PEM armor found: treat the file as one DER blob.
                _ => blobs.push(content),
            }
        }

        Ok(blobs)
    }
}

/// Un-armor a PEM bundle, keeping `CERTIFICATE` blocks only.
fn read_pem_bundle(content: &[u8], path: &Path) -> Result<Vec<Vec<u8>>> {
    let blocks = pem::parse_many(content).map_err(|e| {
        TrustError::ParseError(format!("{}: {e}", path.display()))
    })?;

    let mut blobs = Vec::new();
    for block in &blocks {
        if block.tag() == "CERTIFICATE" {
            blobs.push(block.contents().to_vec());
        } else {
            debug!(
                path = %path.display(),
                tag = block.tag(),
                "skipping non-certificate block"
            );
        }
    }
    Ok(blobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use rcgen::{
        BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
        KeyUsagePurpose,
    };

    fn self_signed_pem(name: &str) -> String {
        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, name);
        params.distinguished_name = dn;
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![KeyUsagePurpose::KeyCertSign];
        params.self_signed(&key).unwrap().pem()
    }

    #[tokio::test]
    async fn bundle_file_lists_all_certificates() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "{}{}", self_signed_pem("Bundle A"), self_signed_pem("Bundle B")).unwrap();
        tmp.flush().unwrap();

        let source = PemFileSource::new(tmp.path());
        let blobs = source.list().await.unwrap();
        assert_eq!(blobs.len(), 2);
    }

    #[tokio::test]
    async fn missing_bundle_file_is_an_io_error() {
        let source = PemFileSource::new("/nonexistent/bundle.pem");
        let err = source.list().await.unwrap_err();
        assert!(matches!(err, TrustError::Io(_)));
    }

    #[tokio::test]
    async fn directory_scan_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.crt"), self_signed_pem("Dir One")).unwrap();
        std::fs::write(dir.path().join("two.pem"), self_signed_pem("Dir Two")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a certificate").unwrap();

        let source = DirectorySource::new(dir.path());
        let blobs = source.list().await.unwrap();
        assert_eq!(blobs.len(), 2);
    }

    #[tokio::test]
    async fn directory_scan_passes_garbage_through() {
        // A .crt file without PEM armor comes back as one raw blob; the
        // store's loader is what rejects it.
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("junk.crt"), b"garbage").unwrap();

        let source = DirectorySource::new(dir.path());
        let blobs = source.list().await.unwrap();
        assert_eq!(blobs.len(), 1);
    }

    #[tokio::test]
    async fn not_a_directory_is_an_io_error() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let source = DirectorySource::new(tmp.path());
        let err = source.list().await.unwrap_err();
        assert!(matches!(err, TrustError::Io(_)));
    }
}
