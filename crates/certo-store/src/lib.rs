//! # certo-store
//!
//! Trust store, certification-path construction and usage-policy
//! enforcement for X.509 certificates.
//!
//! Don't hand out a certificate you wouldn't act on. A certificate is
//! resolved for a declared usage only after **every** certification path
//! from it to a trusted root satisfies the whole policy and no
//! certificate on any path is revoked. One bad path rejects; an
//! unreachable revocation oracle rejects; ambiguity in legacy unique-path
//! mode rejects.
//!
//! ## Validation pipeline
//!
//! ```text
//! use_certificate(fingerprint, Some(usage))
//!   -> snapshot store        (consistent view, lock released)
//!   -> build_all_paths()     (exhaustive: forks, loops, cross-certs)
//!   -> check_path() per path (signatures, windows, constraints, usage)
//!   -> revocation gate       (every cert of every path, fail-closed)
//!   -> Arc<Certificate>
//! ```
//!
//! Signature verification and revocation lookups are injected
//! capabilities ([`SignatureVerifier`], [`RevocationOracle`]); the store
//! itself never talks to the network except through the oracle, and never
//! while holding its lock.

pub mod chain;
pub mod options;
pub mod policy;
pub mod revocation;
pub mod source;
pub mod store;
pub mod verify;

#[cfg(test)]
pub(crate) mod testutil;

pub use chain::{build_all_paths, build_unique_path, CertPath};
pub use options::ValidationOptions;
pub use policy::check_path;
pub use revocation::{RevocationOracle, RevocationStatus, StaticOracle};
pub use source::{CertificateSource, DirectorySource, PemFileSource};
pub use store::TrustStore;
pub use verify::{RingVerifier, SignatureVerifier};
