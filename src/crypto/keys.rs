//! OpenPGP key generation, loading, serialization and zeroing.
//!
//! A [`KeyPair`] always derives its public half from the secret key, never
//! from separately supplied material. The secret key lives behind a lock so it
//! can be scrubbed while the public half keeps serving encryption.

use crate::crypto::{fingerprints_equal, Profile};
use crate::error::{EncryptError, Result};
use crate::validation::{Validator, MAX_KEY_SIZE};
use pgp::composed::{
    Deserializable, SecretKeyParamsBuilder, SignedPublicKey, SignedPublicSubKey, SignedSecretKey,
    SubkeyParamsBuilder,
};
use pgp::ser::Serialize as _;
use pgp::types::{Fingerprint, KeyDetails, Password};
use std::fmt;
use std::io::Read;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};
use tracing::{info, warn};
use zeroize::Zeroizing;

const ARMOR_PREFIX: &[u8] = b"-----BEGIN";

/// An OpenPGP identity: a signed public key and, until cleared, its secret key
pub struct KeyPair {
    /// Public key derived from the secret key at construction
    public: SignedPublicKey,
    /// Secret key; `None` once cleared
    secret: RwLock<Option<SignedSecretKey>>,
    /// Primary key fingerprint, kept readable after a clear
    fingerprint: Fingerprint,
}

impl KeyPair {
    /// Generates a fresh key pair bound to `name <email>` under `profile`.
    ///
    /// The primary key certifies and signs. A single subkey encrypts.
    pub fn generate(name: &str, email: &str, profile: Profile) -> Result<Self> {
        let user_id = Validator::validate_identity(name, email)
            .map_err(|e| EncryptError::key_generation(format!("invalid identity: {}", e)))?;

        let mut encryption_subkey = SubkeyParamsBuilder::default();
        encryption_subkey
            .key_type(profile.encryption_key_type())
            .can_sign(false)
            .can_encrypt(true)
            .can_authenticate(false);

        let mut key_params = SecretKeyParamsBuilder::default();
        key_params
            .key_type(profile.primary_key_type())
            .can_certify(true)
            .can_sign(true)
            .can_encrypt(false)
            .primary_user_id(user_id)
            .subkeys(vec![encryption_subkey.build().map_err(|e| {
                EncryptError::key_generation(format!("building encryption subkey params: {}", e))
            })?]);

        let secret_key_params = key_params
            .build()
            .map_err(|e| EncryptError::key_generation(format!("building key params: {}", e)))?;

        let secret = secret_key_params
            .generate(rand::thread_rng())
            .map_err(|e| EncryptError::key_generation(format!("generating key: {}", e)))?
            .sign(rand::thread_rng(), &Password::empty())
            .map_err(|e| EncryptError::key_generation(format!("signing key: {}", e)))?;

        let keypair = Self::from_secret_key(secret)?;

        info!(
            "Generated {} key pair {}",
            profile,
            keypair.fingerprint_hex()
        );
        Ok(keypair)
    }

    /// Loads a key pair from a serialized secret key, binary or ASCII-armored.
    ///
    /// A blob that parses only as a public key is rejected with
    /// [`EncryptError::NotAPrivateKey`].
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut blob = Zeroizing::new(Vec::new());
        reader
            .take(MAX_KEY_SIZE as u64 + 1)
            .read_to_end(&mut blob)
            .map_err(EncryptError::read)?;

        Validator::validate_key_size(blob.len()).map_err(EncryptError::key_parse)?;

        let secret = match parse_secret_key(&blob) {
            Ok(secret) => secret,
            Err(parse_err) => {
                if parse_public_key(&blob).is_ok() {
                    warn!("Rejected key blob: public key without secret material");
                    return Err(EncryptError::not_a_private_key(
                        "key carries no secret key material",
                    ));
                }
                return Err(parse_err);
            }
        };

        let keypair = Self::from_secret_key(secret)?;

        info!("Loaded key pair {}", keypair.fingerprint_hex());
        Ok(keypair)
    }

    /// Derives the public half and checks it matches the secret key
    fn from_secret_key(secret: SignedSecretKey) -> Result<Self> {
        let public = secret.signed_public_key();

        let secret_fingerprint = secret.primary_key.fingerprint();
        let fingerprint = public.primary_key.fingerprint();
        if !fingerprints_equal(secret_fingerprint.as_bytes(), fingerprint.as_bytes()) {
            return Err(EncryptError::key_derivation(
                "derived public key fingerprint does not match secret key",
            ));
        }

        if encryption_subkey(&public).is_none() {
            return Err(EncryptError::key_derivation(
                "key has no encryption-capable subkey",
            ));
        }

        Ok(Self {
            public,
            secret: RwLock::new(Some(secret)),
            fingerprint,
        })
    }

    /// Returns the derived public key
    pub fn public_key(&self) -> &SignedPublicKey {
        &self.public
    }

    /// Returns the primary key fingerprint
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Returns the primary key fingerprint as uppercase hex
    pub fn fingerprint_hex(&self) -> String {
        hex::encode_upper(self.fingerprint.as_bytes())
    }

    /// Returns the User IDs bound to the public key
    pub fn user_ids(&self) -> Vec<String> {
        self.public
            .details
            .users
            .iter()
            .map(|user| user_id_text(user.id.id()))
            .collect()
    }

    /// Returns the subkey that encryption is addressed to
    pub fn encryption_subkey(&self) -> Result<&SignedPublicSubKey> {
        encryption_subkey(&self.public)
            .ok_or_else(|| EncryptError::encryption("key has no encryption-capable subkey"))
    }

    /// Checks whether secret key material is still held
    pub fn has_private_key(&self) -> bool {
        self.secret_key().is_some()
    }

    /// Read access to the secret key; `None` once cleared.
    ///
    /// Holding the guard keeps [`KeyPair::clear`] waiting.
    pub(crate) fn secret_key(&self) -> RwLockReadGuard<'_, Option<SignedSecretKey>> {
        self.secret.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Encodes the secret key as a binary transferable secret key
    pub fn to_bytes(&self) -> Result<Zeroizing<Vec<u8>>> {
        let guard = self.secret_key();
        let secret = guard.as_ref().ok_or(EncryptError::KeyCleared)?;

        secret
            .to_bytes()
            .map(Zeroizing::new)
            .map_err(|e| EncryptError::key_serialization(format!("encoding secret key: {}", e)))
    }

    /// Encodes the secret key as an ASCII-armored transferable secret key
    pub fn to_armored(&self) -> Result<Zeroizing<String>> {
        let guard = self.secret_key();
        let secret = guard.as_ref().ok_or(EncryptError::KeyCleared)?;

        secret
            .to_armored_string(Default::default())
            .map(Zeroizing::new)
            .map_err(|e| EncryptError::key_serialization(format!("armoring secret key: {}", e)))
    }

    /// Drops the secret key, zeroizing its parameters.
    ///
    /// Waits for in-flight readers of the secret key. Returns `false` if the
    /// key was already cleared.
    pub fn clear(&self) -> bool {
        let mut guard = self.secret.write().unwrap_or_else(PoisonError::into_inner);
        match guard.take() {
            Some(secret) => {
                drop(secret);
                info!("Cleared secret key material for {}", self.fingerprint_hex());
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("fingerprint", &self.fingerprint_hex())
            .field("user_ids", &self.user_ids())
            .field("has_private_key", &self.has_private_key())
            .finish()
    }
}

impl fmt::Display for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair({})", self.fingerprint_hex())
    }
}

/// First subkey whose binding signature allows encryption
fn encryption_subkey(public: &SignedPublicKey) -> Option<&SignedPublicSubKey> {
    public.public_subkeys.iter().find(|subkey| {
        subkey.signatures.iter().any(|signature| {
            let flags = signature.key_flags();
            flags.encrypt_comms() || flags.encrypt_storage()
        })
    })
}

fn is_armored(blob: &[u8]) -> bool {
    blob.trim_ascii_start().starts_with(ARMOR_PREFIX)
}

fn parse_secret_key(blob: &[u8]) -> Result<SignedSecretKey> {
    if is_armored(blob) {
        let text = std::str::from_utf8(blob)
            .map_err(|_| EncryptError::key_parse("armored key is not valid UTF-8"))?;
        let (secret, _headers) = SignedSecretKey::from_string(text)
            .map_err(|e| EncryptError::key_parse(format!("parsing armored secret key: {}", e)))?;
        Ok(secret)
    } else {
        SignedSecretKey::from_bytes(blob)
            .map_err(|e| EncryptError::key_parse(format!("parsing secret key: {}", e)))
    }
}

fn parse_public_key(blob: &[u8]) -> Result<SignedPublicKey> {
    if is_armored(blob) {
        let text = std::str::from_utf8(blob)
            .map_err(|_| EncryptError::key_parse("armored key is not valid UTF-8"))?;
        let (public, _headers) = SignedPublicKey::from_string(text)
            .map_err(|e| EncryptError::key_parse(format!("parsing armored public key: {}", e)))?;
        Ok(public)
    } else {
        SignedPublicKey::from_bytes(blob)
            .map_err(|e| EncryptError::key_parse(format!("parsing public key: {}", e)))
    }
}

fn user_id_text(raw: impl AsRef<[u8]>) -> String {
    String::from_utf8_lossy(raw.as_ref()).into_owned()
}
