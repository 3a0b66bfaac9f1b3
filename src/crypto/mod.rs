//! OpenPGP public-key encryption of byte streams.
//!
//! This module defines the [`Encrypter`] capability and its OpenPGP
//! implementation, [`PgpEncrypter`]:
//!
//! - **Keys**: generation under a pinned [`Profile`], loading, serialization and zeroing
//! - **Encryption**: streaming PKESK + SEIPDv1 (AES-256 with MDC) envelopes
//! - **Decryption**: streaming envelope parsing bound to the held private key

use pgp::composed::KeyType;
use pgp::crypto::ecc_curve::ECCCurve;
use pgp::crypto::sym::SymmetricKeyAlgorithm;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use subtle::ConstantTimeEq;

use crate::error::Result;

pub mod encryption;
pub mod keys;

pub use encryption::PgpEncrypter;
pub use keys::KeyPair;

/// Symmetric cipher used for every SEIPDv1 session this crate creates
pub const SESSION_CIPHER: SymmetricKeyAlgorithm = SymmetricKeyAlgorithm::AES256;

/// A public-key cryptosystem that encrypts to, and decrypts with, a key it holds.
///
/// Callers depend on this trait rather than on a concrete implementation, so
/// another cryptosystem can be swapped in without changing them. The trait is
/// object safe.
pub trait Encrypter: Send + Sync {
    /// Encrypts the whole of `data` into a complete envelope written to `encrypted`.
    ///
    /// The input is streamed. It is never buffered in full. On error `encrypted`
    /// may hold a truncated envelope that must be discarded.
    fn encrypt(&self, data: &mut (dyn Read + Send), encrypted: &mut dyn Write) -> Result<()>;

    /// Decrypts a complete envelope and returns the recovered plaintext.
    fn decrypt(&self, encrypted: &mut (dyn Read + Send)) -> Result<Vec<u8>>;
}

impl<E: Encrypter + ?Sized> Encrypter for Box<E> {
    fn encrypt(&self, data: &mut (dyn Read + Send), encrypted: &mut dyn Write) -> Result<()> {
        (**self).encrypt(data, encrypted)
    }

    fn decrypt(&self, encrypted: &mut (dyn Read + Send)) -> Result<Vec<u8>> {
        (**self).decrypt(encrypted)
    }
}

/// Key generation profile.
///
/// Each variant pins the primary and encryption subkey algorithms. The name
/// is part of the version, so a profile never changes meaning once it ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    /// Ed25519 (legacy EdDSA) primary key with an ECDH Curve25519 encryption subkey
    #[default]
    Curve25519Legacy,
    /// RSA-3072 primary key with an RSA-3072 encryption subkey
    #[serde(rename = "rsa-3072")]
    Rsa3072,
}

impl Profile {
    /// Returns the profile name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Profile::Curve25519Legacy => "curve25519-legacy",
            Profile::Rsa3072 => "rsa-3072",
        }
    }

    /// Key type of the certifying primary key
    pub fn primary_key_type(&self) -> KeyType {
        match self {
            Profile::Curve25519Legacy => KeyType::Ed25519Legacy,
            Profile::Rsa3072 => KeyType::Rsa(3072),
        }
    }

    /// Key type of the encryption subkey
    pub fn encryption_key_type(&self) -> KeyType {
        match self {
            Profile::Curve25519Legacy => KeyType::ECDH(ECCCurve::Curve25519),
            Profile::Rsa3072 => KeyType::Rsa(3072),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Constant-time comparison of two key fingerprints
pub fn fingerprints_equal(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_properties() {
        assert_eq!(Profile::default(), Profile::Curve25519Legacy);
        assert_eq!(Profile::Curve25519Legacy.name(), "curve25519-legacy");
        assert_eq!(Profile::Rsa3072.to_string(), "rsa-3072");
        assert!(matches!(
            Profile::Rsa3072.primary_key_type(),
            KeyType::Rsa(3072)
        ));
        assert!(matches!(
            Profile::Curve25519Legacy.encryption_key_type(),
            KeyType::ECDH(ECCCurve::Curve25519)
        ));
    }

    #[test]
    fn test_profile_config_names_match_display() {
        for profile in [Profile::Curve25519Legacy, Profile::Rsa3072] {
            let json = serde_json::to_string(&profile).unwrap();
            assert_eq!(json, format!("\"{}\"", profile.name()));
            let parsed: Profile = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, profile);
        }

        let parsed: Profile = serde_json::from_str("\"rsa-3072\"").unwrap();
        assert_eq!(parsed, Profile::Rsa3072);
        assert!(serde_json::from_str::<Profile>("\"rsa3072\"").is_err());
        assert!(serde_json::from_str::<Profile>("\"rsa-1024\"").is_err());
    }

    #[test]
    fn test_fingerprints_equal() {
        let a = [0xAAu8; 20];
        let mut b = a;
        assert!(fingerprints_equal(&a, &b));

        b[19] ^= 1;
        assert!(!fingerprints_equal(&a, &b));
        assert!(!fingerprints_equal(&a, &a[..19]));
    }
}
