//! Core types for the certo certificate trust engine.
//!
//! This crate provides the foundational value types shared across the
//! certo library:
//!
//! - **[`Fingerprint`]**: SHA-1 identity of a certificate's DER encoding,
//!   the key type of the trust store
//! - **[`Certificate`]**: owned, immutable certificate values with typed
//!   extension content
//! - **[`IntendedUsage`]**: the closed set of key usages an application
//!   may declare, and the policy relating them to certificate constraints
//! - **Errors**: the full validation error taxonomy in [`TrustError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use certo_core::{Certificate, Fingerprint, Result};
//!
//! fn identify(der: Vec<u8>) -> Result<Fingerprint> {
//!     let cert = Certificate::from_der(der)?;
//!     Ok(cert.fingerprint().clone())
//! }
//! ```

mod certificate;
mod error;
mod extensions;
mod fingerprint;
mod usage;

pub use certificate::{Certificate, CertificateParts};
pub use error::{Result, TrustError};
pub use extensions::{BasicConstraints, CertExtension, ExtendedKeyUsage, KeyUsage, RawExtension};
pub use fingerprint::{Fingerprint, FINGERPRINT_LEN};
pub use usage::{is_allowed_by, IntendedUsage};
