//! Shared passcode hashing and verification

use crate::error::Result;
use crate::limits::validate_passcode;

/// Default bcrypt work factor for tree passcodes
pub const DEFAULT_PASSCODE_COST: u32 = 10;

/// Hash a tree passcode with bcrypt
pub fn hash_passcode(passcode: &str, cost: u32) -> Result<String> {
    validate_passcode(passcode)?;
    let hashed = bcrypt::hash(passcode, cost)?;
    tracing::debug!("Hashed passcode with cost {}", cost);
    Ok(hashed)
}

/// Check a passcode attempt against a stored hash
pub fn verify_passcode(passcode: &str, hash: &str) -> Result<bool> {
    if passcode.is_empty() {
        return Ok(false);
    }
    Ok(bcrypt::verify(passcode, hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    // bcrypt's minimum cost keeps the tests fast
    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_passcode("blue-heron", TEST_COST).unwrap();
        assert_ne!(hash, "blue-heron");
        assert!(verify_passcode("blue-heron", &hash).unwrap());
        assert!(!verify_passcode("red-heron", &hash).unwrap());
    }

    #[test]
    fn test_empty_passcode_rejected() {
        assert!(matches!(hash_passcode("", TEST_COST), Err(Error::Validation(_))));

        let hash = hash_passcode("x", TEST_COST).unwrap();
        assert!(!verify_passcode("", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_passcode("anything", "not-a-bcrypt-hash").is_err());
    }
}
