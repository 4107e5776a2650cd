//! Salted password hashing for stored credentials.
//!
//! Keys are derived with Argon2id, which is memory-hard: brute-forcing a
//! leaked credential table costs real CPU and RAM per guess. The derived key
//! and the salt are stored as separate hex columns, so the raw KDF entry
//! point is used here rather than the PHC string format.

use argon2::Argon2;
use rand_core::{OsRng, RngCore};
use thiserror::Error;

use fanfund_types::Credential;

use crate::constant_time_eq;

/// Salt length in raw bytes (doubled by hex encoding).
pub const SALT_LEN: usize = 16;
/// Derived key length in raw bytes.
pub const KEY_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("key derivation failed")]
    Derive,
}

/// Hashes a password into a fresh credential. Every call draws a new random
/// salt, so hashing the same password twice yields different credentials.
pub fn hash_password(password: &str) -> Result<Credential, PasswordError> {
    let mut salt_bytes = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt_bytes);
    let salt = hex::encode(salt_bytes);

    let key = derive_key(password, &salt)?;
    Ok(Credential {
        salt,
        hash: hex::encode(key),
    })
}

/// Checks a password against a stored credential. This is a pure predicate:
/// a missing or malformed credential reads as "wrong password", never an
/// error, so callers treat credential-less accounts uniformly.
pub fn verify_password(password: &str, credential: &Credential) -> bool {
    if credential.salt.is_empty() || credential.hash.is_empty() {
        return false;
    }

    let Ok(stored) = hex::decode(&credential.hash) else {
        return false;
    };
    let Ok(computed) = derive_key(password, &credential.salt) else {
        return false;
    };

    // constant_time_eq rejects length mismatches before comparing contents
    constant_time_eq(&computed, &stored)
}

// The hex salt string itself is the KDF salt input, matching how the
// credential was minted.
fn derive_key(password: &str, salt: &str) -> Result<[u8; KEY_LEN], PasswordError> {
    let mut key = [0u8; KEY_LEN];
    Argon2::default()
        .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut key)
        .map_err(|_| PasswordError::Derive)?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_verifies() {
        let credential = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &credential));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let credential = hash_password("hunter2").unwrap();
        assert!(!verify_password("hunter3", &credential));
        assert!(!verify_password("", &credential));
    }

    #[test]
    fn salts_are_unique_per_hash() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn credential_shape_is_hex() {
        let credential = hash_password("hunter2").unwrap();
        assert_eq!(credential.salt.len(), SALT_LEN * 2);
        assert_eq!(credential.hash.len(), KEY_LEN * 2);
        assert!(hex::decode(&credential.salt).is_ok());
        assert!(hex::decode(&credential.hash).is_ok());
    }

    #[test]
    fn missing_credential_fields_read_as_false() {
        let no_salt = Credential {
            salt: String::new(),
            hash: "ab".repeat(KEY_LEN),
        };
        let no_hash = Credential {
            salt: "ab".repeat(SALT_LEN),
            hash: String::new(),
        };
        assert!(!verify_password("hunter2", &no_salt));
        assert!(!verify_password("hunter2", &no_hash));
    }

    #[test]
    fn corrupt_stored_hash_reads_as_false() {
        let mut credential = hash_password("hunter2").unwrap();
        credential.hash = "not-hex-at-all".to_string();
        assert!(!verify_password("hunter2", &credential));
    }

    #[test]
    fn truncated_stored_hash_reads_as_false() {
        let mut credential = hash_password("hunter2").unwrap();
        credential.hash.truncate(KEY_LEN); // half the hex digits
        assert!(!verify_password("hunter2", &credential));
    }
}
