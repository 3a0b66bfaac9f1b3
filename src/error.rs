//! Error types for encrypter operations.

use std::io;
use thiserror::Error;

/// Result type alias for encrypter operations.
pub type Result<T> = std::result::Result<T, EncryptError>;

/// Main error type for encrypter operations.
///
/// Messages name the failing operation and stage. They never carry key bytes.
#[derive(Error, Debug)]
pub enum EncryptError {
    /// Fresh key generation failed (bad identity input or engine failure)
    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    /// Serialized key bytes could not be parsed
    #[error("Key parse error: {0}")]
    KeyParse(String),

    /// A parsed key carries no private material
    #[error("Not a private key: {0}")]
    NotAPrivateKey(String),

    /// The public key could not be derived from the private key
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// The private key could not be encoded for persistence
    #[error("Key serialization error: {0}")]
    KeySerialization(String),

    /// The output stream rejected a write after `written` bytes were accepted
    #[error("Write error after {written} bytes: {source}")]
    Write {
        /// Bytes accepted by the sink before the failure
        written: u64,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// The input stream failed
    #[error("Read error: {0}")]
    Read(#[source] io::Error),

    /// Session setup, writer setup, copy or finalize failed during encryption
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Envelope malformed, addressed to another key, or failed integrity checks
    #[error("Decryption error: {0}")]
    Decryption(String),

    /// Decryption attempted after the private key material was scrubbed
    #[error("Private key material has been cleared")]
    KeyCleared,

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

impl EncryptError {
    /// Creates a new key generation error.
    pub fn key_generation<T: ToString>(msg: T) -> Self {
        Self::KeyGeneration(msg.to_string())
    }

    /// Creates a new key parse error.
    pub fn key_parse<T: ToString>(msg: T) -> Self {
        Self::KeyParse(msg.to_string())
    }

    /// Creates a new not-a-private-key error.
    pub fn not_a_private_key<T: ToString>(msg: T) -> Self {
        Self::NotAPrivateKey(msg.to_string())
    }

    /// Creates a new key derivation error.
    pub fn key_derivation<T: ToString>(msg: T) -> Self {
        Self::KeyDerivation(msg.to_string())
    }

    /// Creates a new key serialization error.
    pub fn key_serialization<T: ToString>(msg: T) -> Self {
        Self::KeySerialization(msg.to_string())
    }

    /// Creates a new write error carrying the partial byte count.
    pub fn write(written: u64, source: io::Error) -> Self {
        Self::Write { written, source }
    }

    /// Creates a new read error.
    pub fn read(source: io::Error) -> Self {
        Self::Read(source)
    }

    /// Creates a new encryption error.
    pub fn encryption<T: ToString>(msg: T) -> Self {
        Self::Encryption(msg.to_string())
    }

    /// Creates a new decryption error.
    pub fn decryption<T: ToString>(msg: T) -> Self {
        Self::Decryption(msg.to_string())
    }

    /// Creates a new validation error.
    pub fn validation<T: ToString>(msg: T) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Bytes accepted by the sink before a write failure, if this is one.
    pub fn bytes_written(&self) -> Option<u64> {
        match self {
            Self::Write { written, .. } => Some(*written),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_reports_partial_count() {
        let err = EncryptError::write(42, io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert_eq!(err.bytes_written(), Some(42));
        assert!(err.to_string().contains("after 42 bytes"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_display_names_stage() {
        let err = EncryptError::decryption("creating decrypting reader: no matching key");
        assert_eq!(
            err.to_string(),
            "Decryption error: creating decrypting reader: no matching key"
        );
        assert_eq!(err.bytes_written(), None);
        assert_eq!(
            EncryptError::KeyCleared.to_string(),
            "Private key material has been cleared"
        );
    }
}
