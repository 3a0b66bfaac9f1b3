//! Input validation and resource limits for key material and identities.
//!
//! The OpenPGP engine accepts any User ID string, so identities are checked
//! here before a key is ever generated for them.

use crate::error::{EncryptError, Result};

/// Maximum allowed serialized key size (64KB)
///
/// An RSA-3072 transferable secret key is well under 8KB even when armored.
/// Anything larger is rejected before it reaches the packet parser.
pub const MAX_KEY_SIZE: usize = 64 * 1024;

/// Maximum allowed User ID length (1KB)
pub const MAX_USER_ID_LENGTH: usize = 1024;

/// Validation functions for input data
pub struct Validator;

impl Validator {
    /// Validate serialized key material size
    pub fn validate_key_size(len: usize) -> Result<()> {
        if len > MAX_KEY_SIZE {
            return Err(EncryptError::validation(format!(
                "Key material too large: exceeds maximum of {} bytes",
                MAX_KEY_SIZE
            )));
        }
        Ok(())
    }

    /// Validate a human identity and return the User ID it will be bound as.
    pub fn validate_identity(name: &str, email: &str) -> Result<String> {
        Self::validate_name(name)?;
        Self::validate_email(email)?;

        let user_id = format!("{} <{}>", name.trim(), email);
        if user_id.len() > MAX_USER_ID_LENGTH {
            return Err(EncryptError::validation(format!(
                "User ID too long: {} bytes exceeds maximum of {} bytes",
                user_id.len(),
                MAX_USER_ID_LENGTH
            )));
        }

        Ok(user_id)
    }

    /// Validate the display name part of an identity
    pub fn validate_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(EncryptError::validation("Name cannot be empty"));
        }

        Self::validate_user_id_chars("Name", name)
    }

    /// Validate the email part of an identity
    pub fn validate_email(email: &str) -> Result<()> {
        if email.is_empty() {
            return Err(EncryptError::validation("Email cannot be empty"));
        }

        Self::validate_user_id_chars("Email", email)?;

        if email.chars().any(char::is_whitespace) {
            return Err(EncryptError::validation("Email contains whitespace"));
        }

        let (local, domain) = match email.split_once('@') {
            Some(parts) => parts,
            None => return Err(EncryptError::validation("Email is missing '@'")),
        };

        if local.is_empty() {
            return Err(EncryptError::validation("Email local part is empty"));
        }

        if domain.contains('@') {
            return Err(EncryptError::validation("Email contains more than one '@'"));
        }

        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(EncryptError::validation(
                "Email domain must be a dotted host name",
            ));
        }

        Ok(())
    }

    /// Reject characters that would corrupt a `Name <email>` User ID
    fn validate_user_id_chars(field: &str, value: &str) -> Result<()> {
        if value.contains('\0') {
            return Err(EncryptError::validation(format!(
                "{} contains null bytes",
                field
            )));
        }

        if value.chars().any(char::is_control) {
            return Err(EncryptError::validation(format!(
                "{} contains control characters",
                field
            )));
        }

        if value.contains('<') || value.contains('>') {
            return Err(EncryptError::validation(format!(
                "{} contains angle brackets",
                field
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_size_validation() {
        assert!(Validator::validate_key_size(0).is_ok());
        assert!(Validator::validate_key_size(MAX_KEY_SIZE).is_ok());
        assert!(Validator::validate_key_size(MAX_KEY_SIZE + 1).is_err());
    }

    #[test]
    fn test_identity_builds_user_id() {
        let user_id = Validator::validate_identity("Alice", "alice@example.com").unwrap();
        assert_eq!(user_id, "Alice <alice@example.com>");

        // Surrounding whitespace in the name is dropped
        let user_id = Validator::validate_identity("  Bob Smith ", "bob@mail.example.org").unwrap();
        assert_eq!(user_id, "Bob Smith <bob@mail.example.org>");
    }

    #[test]
    fn test_name_validation() {
        assert!(Validator::validate_name("").is_err());
        assert!(Validator::validate_name("   ").is_err());
        assert!(Validator::validate_name("Alice\0").is_err());
        assert!(Validator::validate_name("Alice\x01").is_err());
        assert!(Validator::validate_name("Alice\nSmith").is_err());
        assert!(Validator::validate_name("Alice <evil>").is_err());
        assert!(Validator::validate_name("Zoë Ångström").is_ok());
    }

    #[test]
    fn test_email_validation() {
        assert!(Validator::validate_email("alice@example.com").is_ok());
        assert!(Validator::validate_email("a.b+tag@sub.example.co.uk").is_ok());

        assert!(Validator::validate_email("").is_err());
        assert!(Validator::validate_email("not-an-email").is_err());
        assert!(Validator::validate_email("@example.com").is_err());
        assert!(Validator::validate_email("alice@").is_err());
        assert!(Validator::validate_email("alice@localhost").is_err());
        assert!(Validator::validate_email("alice@.example.com").is_err());
        assert!(Validator::validate_email("alice@example.com.").is_err());
        assert!(Validator::validate_email("alice@@example.com").is_err());
        assert!(Validator::validate_email("alice@ex@ample.com").is_err());
        assert!(Validator::validate_email("alice smith@example.com").is_err());
        assert!(Validator::validate_email("<alice@example.com>").is_err());
    }

    #[test]
    fn test_oversized_identity_rejected() {
        let long_name = "A".repeat(MAX_USER_ID_LENGTH);
        let result = Validator::validate_identity(&long_name, "alice@example.com");

        match result {
            Err(EncryptError::Validation(msg)) => assert!(msg.contains("User ID too long")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }
}
