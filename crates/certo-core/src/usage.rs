//! Intended key usages and the policy tying them to certificate
//! constraints.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::extensions::{BasicConstraints, KeyUsage};

/// Intended use of the public key in a certificate, from the application's
/// point of view.
///
/// A certificate encodes the allowed uses of its key in the
/// basic-constraints and key-usage extensions; [`is_allowed_by`] relates
/// the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntendedUsage {
    /// Act as a CA certificate: sign other certificates.
    Ca,
    /// Produce or verify digital signatures.
    Signature,
    /// Encipher (wrap) symmetric session keys.
    WrapKey,
}

impl fmt::Display for IntendedUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ca => write!(f, "ca"),
            Self::Signature => write!(f, "signature"),
            Self::WrapKey => write!(f, "wrap-key"),
        }
    }
}

/// Tests whether the constraint extensions of a certificate allow the
/// intended key usage.
///
/// All three policy bodies live in this one function so they can be
/// audited together:
/// - `Ca` requires the CA flag and the certificate-signing ability;
/// - `Signature` requires the digital-signature ability, independent of
///   the CA flag (a CA certificate may also sign data if it advertises
///   that bit);
/// - `WrapKey` requires the key-encipherment ability.
#[must_use]
pub fn is_allowed_by(usage: IntendedUsage, basic: BasicConstraints, key_usage: KeyUsage) -> bool {
    match usage {
        IntendedUsage::Ca => basic.is_ca && key_usage.key_cert_sign(),
        IntendedUsage::Signature => key_usage.digital_signature(),
        IntendedUsage::WrapKey => key_usage.key_encipherment(),
    }
}
