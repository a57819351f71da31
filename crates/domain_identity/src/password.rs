//! PBKDF2 password hashing
//!
//! Stored format: `base64(hash):base64(salt):iterations:SHA256`. The
//! iteration count and key length are read back from the stored value, so
//! hashes produced with other parameters still verify.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

pub const SALT_SIZE: usize = 16;
pub const KEY_SIZE: usize = 32;
pub const ITERATIONS: u32 = 10_000;
pub const ALGORITHM: &str = "SHA256";

const DELIMITER: char = ':';

/// Hashes and verifies passwords
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Hashes a password with a fresh random salt
    pub fn hash(password: &str) -> String {
        let mut salt = [0u8; SALT_SIZE];
        rand::thread_rng().fill_bytes(&mut salt);
        Self::hash_with_salt(password, &salt)
    }

    fn hash_with_salt(password: &str, salt: &[u8]) -> String {
        let mut key = [0u8; KEY_SIZE];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, ITERATIONS, &mut key);
        format!(
            "{}{d}{}{d}{}{d}{}",
            STANDARD.encode(key),
            STANDARD.encode(salt),
            ITERATIONS,
            ALGORITHM,
            d = DELIMITER
        )
    }

    /// Checks a password against a stored hash
    ///
    /// Malformed stored values never verify.
    pub fn verify(password: &str, stored: &str) -> bool {
        let Some(parts) = StoredHash::parse(stored) else {
            return false;
        };
        let mut candidate = vec![0u8; parts.hash.len()];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), &parts.salt, parts.iterations, &mut candidate);
        constant_time_eq(&parts.hash, &candidate)
    }
}

struct StoredHash {
    hash: Vec<u8>,
    salt: Vec<u8>,
    iterations: u32,
}

impl StoredHash {
    fn parse(stored: &str) -> Option<Self> {
        let mut segments = stored.split(DELIMITER);
        let hash = STANDARD.decode(segments.next()?).ok()?;
        let salt = STANDARD.decode(segments.next()?).ok()?;
        let iterations = segments.next()?.parse::<u32>().ok().filter(|n| *n > 0)?;
        let algorithm = segments.next()?;
        if !algorithm.eq_ignore_ascii_case(ALGORITHM)
            || segments.next().is_some()
            || hash.is_empty()
        {
            return None;
        }
        Some(Self {
            hash,
            salt,
            iterations,
        })
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
    fn test_hash_has_four_segments() {
        let stored = PasswordHasher::hash("Admin123");
        let segments: Vec<&str> = stored.split(':').collect();

        assert_eq!(segments.len(), 4);
        assert_eq!(STANDARD.decode(segments[0]).unwrap().len(), KEY_SIZE);
        assert_eq!(STANDARD.decode(segments[1]).unwrap().len(), SALT_SIZE);
        assert_eq!(segments[2], "10000");
        assert_eq!(segments[3], "SHA256");
    }

    #[test]
    fn test_verify_accepts_only_the_original_password() {
        let stored = PasswordHasher::hash("correct horse");
        assert!(PasswordHasher::verify("correct horse", &stored));
        assert!(!PasswordHasher::verify("correct horse ", &stored));
    }

    #[test]
    fn test_salts_differ_between_hashes() {
        assert_ne!(PasswordHasher::hash("same"), PasswordHasher::hash("same"));
    }

    #[test]
    fn test_same_salt_is_deterministic() {
        let salt = [7u8; SALT_SIZE];
        assert_eq!(
            PasswordHasher::hash_with_salt("pw", &salt),
            PasswordHasher::hash_with_salt("pw", &salt)
        );
    }

    #[test]
    fn test_malformed_values_never_verify() {
        assert!(!PasswordHasher::verify("pw", ""));
        assert!(!PasswordHasher::verify("pw", "abc:def"));
        assert!(!PasswordHasher::verify("pw", "AAAA:AAAA:0:SHA256"));
        assert!(!PasswordHasher::verify("pw", "AAAA:AAAA:10:MD5"));
        assert!(!PasswordHasher::verify("pw", "%%%:AAAA:10:SHA256"));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
    }
}
