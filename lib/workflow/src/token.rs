//! Signed action tokens for approval links.
//!
//! A token is derived from the process-wide secret and the record id, so it
//! cannot exist before the record does and cannot be transplanted onto
//! another record. Verification compares in constant time.

use postloop_core::PostId;
use sha2::{Digest, Sha256};

/// Signs and verifies action tokens.
#[derive(Debug, Clone)]
pub struct ActionTokenSigner {
    secret: String,
}

impl ActionTokenSigner {
    /// Creates a signer over the process-wide secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Derives the action token for a record.
    #[must_use]
    pub fn sign(&self, id: PostId) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b":");
        hasher.update(id.to_string().as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Verifies a presented token against the record id.
    ///
    /// The comparison is constant-time so a mismatch leaks nothing about
    /// how many leading characters matched.
    #[must_use]
    pub fn verify(&self, id: PostId, token: &str) -> bool {
        constant_time_eq(self.sign(id).as_bytes(), token.as_bytes())
    }
}

/// Compares two byte slices in constant time for equal-length inputs.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let signer = ActionTokenSigner::new("secret");
        let id = PostId::new();
        let token = signer.sign(id);
        assert!(signer.verify(id, &token));
    }

    #[test]
    fn tampered_token_fails() {
        let signer = ActionTokenSigner::new("secret");
        let id = PostId::new();
        let flipped: String = signer
            .sign(id)
            .chars()
            .map(|c| if c == '0' { '1' } else { '0' })
            .collect();
        assert!(!signer.verify(id, &flipped));
        assert!(!signer.verify(id, ""));
        assert!(!signer.verify(id, "not-a-token"));
    }

    #[test]
    fn token_is_bound_to_the_record() {
        let signer = ActionTokenSigner::new("secret");
        let id = PostId::new();
        let other = PostId::new();
        let token = signer.sign(id);
        assert!(!signer.verify(other, &token));
    }

    #[test]
    fn token_is_bound_to_the_secret() {
        let id = PostId::new();
        let token = ActionTokenSigner::new("secret-a").sign(id);
        assert!(!ActionTokenSigner::new("secret-b").verify(id, &token));
    }

    #[test]
    fn constant_time_eq_basics() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"", b""));
    }
}
