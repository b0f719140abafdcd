/// Refresh Token Bookkeeping
///
/// A user owns exactly one live refresh token. The store keeps only its
/// SHA-256 digest; presenting a token means hashing it and comparing against
/// that single slot, so rotating or clearing the slot revokes every older
/// token at once. There is no history and no per-device list.

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};

const TOKEN_ID_LENGTH: usize = 32;

/// Random alphanumeric nonce used as the `jti` claim
pub fn generate_token_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_ID_LENGTH)
        .map(char::from)
        .collect()
}

/// SHA-256 hex digest of a refresh token, the form it is persisted in
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Does the presented token match the stored slot?
///
/// An empty or missing slot (logged out) never matches.
pub fn matches_stored(stored_hash: Option<&str>, presented: &str) -> bool {
    match stored_hash {
        Some(stored) if !stored.is_empty() => {
            constant_time_eq(stored.as_bytes(), hash_token(presented).as_bytes())
        }
        _ => false,
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_id() {
        let id = generate_token_id();

        assert_eq!(id.len(), TOKEN_ID_LENGTH);
        assert!(id.chars().all(|c| c.is_alphanumeric()));
        assert_ne!(id, generate_token_id());
    }

    #[test]
    fn test_token_hashing() {
        let hash1 = hash_token("some.jwt.value");
        let hash2 = hash_token("some.jwt.value");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, "some.jwt.value");
        assert_eq!(hash1.len(), 64);
        assert_ne!(hash1, hash_token("some.jwt.other"));
    }

    #[test]
    fn test_matches_stored() {
        let stored = hash_token("current");

        assert!(matches_stored(Some(&stored), "current"));
        assert!(!matches_stored(Some(&stored), "previous"));
        assert!(!matches_stored(Some(""), "current"));
        assert!(!matches_stored(None, "current"));
    }
}
