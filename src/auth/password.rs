/// Password Hashing and Verification
///
/// One-way digests via bcrypt. Each call salts independently, so the same
/// password never produces the same digest twice.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::PasswordError;

/// Hash a password using bcrypt
///
/// # Errors
/// Returns `PasswordError::HashingFailure` only on infrastructure failure
/// (never based on the password's content).
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash(password, DEFAULT_COST).map_err(|e| PasswordError::HashingFailure(e.to_string()))
}

/// Verify a password against its hash
///
/// A mismatch is `Ok(false)`, not an error; `PasswordError::VerificationFailure`
/// is reserved for unreadable digests so callers can keep the two apart.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    verify(password, hash).map_err(|e| PasswordError::VerificationFailure(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let password = "correct horse battery staple";
        let hash = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        // bcrypt digest marker
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_verify_password() {
        let password = "correct horse battery staple";
        let hash = hash_password(password).expect("Failed to hash password");

        let is_valid = verify_password(password, &hash).expect("Failed to verify password");
        assert!(is_valid);
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("correct horse battery staple").expect("Failed to hash password");

        let is_valid = verify_password("wrong password", &hash).expect("Failed to verify password");
        assert!(!is_valid);
    }

    #[test]
    fn test_salted_hashes_differ_but_both_verify() {
        let password = "same input twice";
        let first = hash_password(password).expect("Failed to hash password");
        let second = hash_password(password).expect("Failed to hash password");

        assert_ne!(first, second);
        assert!(verify_password(password, &first).unwrap());
        assert!(verify_password(password, &second).unwrap());
    }

    #[test]
    fn test_malformed_digest_is_an_error_not_a_mismatch() {
        let result = verify_password("anything", "not-a-bcrypt-digest");
        assert!(matches!(
            result,
            Err(PasswordError::VerificationFailure(_))
        ));
    }
}
