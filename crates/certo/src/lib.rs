//! Trust-evaluation engine for X.509 certificates.
//!
//! certo maintains a fingerprint-keyed certificate store with a set of
//! trusted roots, discovers every certification path from a leaf to a
//! root (cross-certification included), and enforces a usage policy --
//! key usage, basic constraints, criticality, path length, revocation --
//! over all of them before a certificate may be used for a declared
//! purpose.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use certo::{IntendedUsage, StaticOracle, TrustStore, DirectorySource};
//!
//! #[tokio::main]
//! async fn main() -> certo::Result<()> {
//!     let store = TrustStore::new(Arc::new(StaticOracle::new()));
//!
//!     // Load a directory of .crt/.pem files and pick a root to trust.
//!     store.add_all_from_source(&DirectorySource::new("/etc/pki/mesh")).await?;
//!     store.mark_trusted("AB:CD:...".parse()?);
//!
//!     // Resolve a certificate for key wrapping; every path to a trusted
//!     // root must pass the whole policy, and nothing may be revoked.
//!     let cert = store.use_certificate(&leaf_fp, Some(IntendedUsage::WrapKey)).await?;
//!     println!("validated: {}", cert.subject());
//!
//!     Ok(())
//! }
//! ```

// Re-export core types
pub use certo_core::*;

// Re-export the engine
pub use certo_store::{
    build_all_paths, build_unique_path, check_path, CertPath, CertificateSource, DirectorySource,
    PemFileSource, RevocationOracle, RevocationStatus, RingVerifier, SignatureVerifier,
    StaticOracle, TrustStore, ValidationOptions,
};

// Re-export runtime for convenience
pub use serde;
pub use tokio;
