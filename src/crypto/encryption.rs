//! Streaming OpenPGP encryption and decryption.
//!
//! Envelopes are binary OpenPGP messages: one PKESK addressed to the
//! recipient's encryption subkey followed by a SEIPDv1 packet (AES-256 with
//! MDC). Plaintext is pulled from the input in chunks and emitted as
//! partial-length packets, so neither direction holds the whole stream.

use crate::crypto::keys::KeyPair;
use crate::crypto::{Encrypter, Profile, SESSION_CIPHER};
use crate::error::{EncryptError, Result};
use pgp::composed::{Message, MessageBuilder};
use pgp::types::Password;
use std::fmt;
use std::io::{self, BufReader, Read, Write};
use tracing::{debug, info};
use zeroize::Zeroizing;

/// Size of the plaintext chunks moved through the decrypting reader
const CHUNK_SIZE: usize = 64 * 1024;

/// An [`Encrypter`] backed by a single OpenPGP key pair.
///
/// Encryption needs only the public key and keeps working after
/// [`PgpEncrypter::clear_private_params`]. Decryption fails with
/// [`EncryptError::KeyCleared`] from then on.
pub struct PgpEncrypter {
    keys: KeyPair,
}

impl PgpEncrypter {
    /// Generates a fresh key pair for `name <email>` under the default profile
    pub fn generate(name: &str, email: &str) -> Result<Self> {
        Self::generate_with_profile(name, email, Profile::default())
    }

    /// Generates a fresh key pair for `name <email>` under `profile`
    pub fn generate_with_profile(name: &str, email: &str, profile: Profile) -> Result<Self> {
        let keys = KeyPair::generate(name, email, profile)?;
        Ok(Self { keys })
    }

    /// Loads an encrypter from a serialized private key (binary or armored)
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let keys = KeyPair::from_reader(reader)?;
        Ok(Self { keys })
    }

    /// Returns the held key pair
    pub fn keys(&self) -> &KeyPair {
        &self.keys
    }

    /// Writes the private key as a binary transferable secret key.
    ///
    /// Returns the number of bytes written. If the sink fails part way, the
    /// error carries the count it accepted.
    pub fn write_private_key<W: Write + ?Sized>(&self, out: &mut W) -> Result<u64> {
        let bytes = self.keys.to_bytes()?;
        write_all_counted(out, &bytes, 0)?;
        out.flush()
            .map_err(|e| EncryptError::write(bytes.len() as u64, e))?;
        Ok(bytes.len() as u64)
    }

    /// Writes the private key as an ASCII-armored transferable secret key
    pub fn write_armored_private_key<W: Write + ?Sized>(&self, out: &mut W) -> Result<u64> {
        let armored = self.keys.to_armored()?;
        write_all_counted(out, armored.as_bytes(), 0)?;
        out.flush()
            .map_err(|e| EncryptError::write(armored.len() as u64, e))?;
        Ok(armored.len() as u64)
    }

    /// Decrypts an envelope straight into `out`, returning the plaintext length.
    ///
    /// On error `out` may already hold a plaintext prefix that must be discarded.
    pub fn decrypt_to<W: Write + ?Sized>(
        &self,
        encrypted: &mut (dyn Read + Send),
        out: &mut W,
    ) -> Result<u64> {
        // Held for the whole read so a concurrent clear waits for us
        let guard = self.keys.secret_key();
        let secret = guard.as_ref().ok_or(EncryptError::KeyCleared)?;

        let message = Message::from_bytes(BufReader::new(Stream(encrypted)))
            .map_err(|e| EncryptError::decryption(format!("parsing envelope: {}", e)))?;

        let mut message = message
            .decrypt(&Password::empty(), secret)
            .map_err(|e| EncryptError::decryption(format!("opening decrypting reader: {}", e)))?;

        if message.is_compressed() {
            message = message
                .decompress()
                .map_err(|e| EncryptError::decryption(format!("decompressing: {}", e)))?;
        }

        let mut chunk = Zeroizing::new(vec![0u8; CHUNK_SIZE]);
        let mut written: u64 = 0;
        loop {
            let n = match message.read(&mut chunk[..]) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(EncryptError::decryption(format!(
                        "reading plaintext: {}",
                        e
                    )))
                }
            };
            write_all_counted(out, &chunk[..n], written)?;
            written += n as u64;
        }
        out.flush().map_err(|e| EncryptError::write(written, e))?;

        debug!(
            "Decrypted {} bytes with {}",
            written,
            self.keys.fingerprint_hex()
        );
        Ok(written)
    }

    /// Scrubs the private key material.
    ///
    /// Waits for in-flight decryptions. Returns `true` if material was
    /// scrubbed by this call, `false` if it had already been cleared.
    pub fn clear_private_params(&self) -> bool {
        let cleared = self.keys.clear();
        if cleared {
            info!("Decryption disabled for {}", self.keys.fingerprint_hex());
        }
        cleared
    }

    /// Checks whether the private key has been scrubbed
    pub fn is_cleared(&self) -> bool {
        !self.keys.has_private_key()
    }
}

impl Encrypter for PgpEncrypter {
    fn encrypt(&self, data: &mut (dyn Read + Send), encrypted: &mut dyn Write) -> Result<()> {
        let recipient = self.keys.encryption_subkey()?;
        let mut rng = rand::thread_rng();

        let mut builder =
            MessageBuilder::from_reader("", Stream(data)).seipd_v1(&mut rng, SESSION_CIPHER);
        builder
            .encrypt_to_key(&mut rng, &recipient.key)
            .map_err(|e| EncryptError::encryption(format!("creating encryption session: {}", e)))?;

        builder
            .to_writer(&mut rng, &mut *encrypted)
            .map_err(|e| EncryptError::encryption(format!("encrypting data: {}", e)))?;

        encrypted
            .flush()
            .map_err(|e| EncryptError::encryption(format!("finalizing envelope: {}", e)))?;

        debug!("Encrypted stream to {}", self.keys.fingerprint_hex());
        Ok(())
    }

    fn decrypt(&self, encrypted: &mut (dyn Read + Send)) -> Result<Vec<u8>> {
        let mut plaintext = Vec::new();
        self.decrypt_to(encrypted, &mut plaintext)?;
        Ok(plaintext)
    }
}

impl fmt::Debug for PgpEncrypter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgpEncrypter")
            .field("fingerprint", &self.keys.fingerprint_hex())
            .field("cleared", &self.is_cleared())
            .finish()
    }
}

/// Caller-supplied stream handed to the engine, which wants `Debug` sources
struct Stream<'a>(&'a mut (dyn Read + Send));

impl Read for Stream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl fmt::Debug for Stream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Stream")
    }
}

/// Writes all of `bytes`, reporting `offset` plus the accepted prefix on failure
fn write_all_counted<W: Write + ?Sized>(out: &mut W, bytes: &[u8], offset: u64) -> Result<()> {
    let mut accepted = 0usize;
    while accepted < bytes.len() {
        match out.write(&bytes[accepted..]) {
            Ok(0) => {
                return Err(EncryptError::write(
                    offset + accepted as u64,
                    io::Error::new(io::ErrorKind::WriteZero, "sink accepted no bytes"),
                ))
            }
            Ok(n) => accepted += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(EncryptError::write(offset + accepted as u64, e)),
        }
    }
    Ok(())
}
