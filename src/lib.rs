//! # pgp-encrypt - Streaming OpenPGP encryption behind a pluggable trait
//!
//! This library encrypts arbitrary byte streams to a single OpenPGP key pair
//! and decrypts them again. Callers program against the [`Encrypter`] trait.
//! [`PgpEncrypter`] implements it on top of the rPGP engine.
//!
//! ## Features
//!
//! - **Key lifecycle**: generate under a pinned [`Profile`], load from a
//!   serialized secret key, serialize (binary or armored), scrub from memory
//! - **Streaming**: plaintext is never buffered in full while encrypting
//! - **Standard envelopes**: binary OpenPGP messages (PKESK + SEIPDv1 with MDC)
//!
//! ## Examples
//!
//! ### Encryption and Decryption
//!
//! ```rust,no_run
//! use pgp_encrypt::{Encrypter, PgpEncrypter};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let encrypter = PgpEncrypter::generate("Alice", "alice@example.com")?;
//!
//! let mut encrypted = Vec::new();
//! encrypter.encrypt(&mut &b"Secret message"[..], &mut encrypted)?;
//!
//! let decrypted = encrypter.decrypt(&mut &encrypted[..])?;
//! assert_eq!(decrypted, b"Secret message");
//! # Ok(())
//! # }
//! ```
//!
//! ### Persisting and Scrubbing the Key
//!
//! ```rust,no_run
//! use pgp_encrypt::PgpEncrypter;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let encrypter = PgpEncrypter::generate("Alice", "alice@example.com")?;
//!
//! let mut stored = Vec::new();
//! encrypter.write_private_key(&mut stored)?;
//! encrypter.clear_private_params();
//!
//! let restored = PgpEncrypter::from_reader(&stored[..])?;
//! assert_eq!(restored.keys().fingerprint(), encrypter.keys().fingerprint());
//! # Ok(())
//! # }
//! ```

pub mod crypto;
pub mod error;
pub mod validation;

pub use crypto::{Encrypter, KeyPair, PgpEncrypter, Profile, SESSION_CIPHER};
pub use error::{EncryptError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
