//! Salted one-way password hashing.
//!
//! The core never stores or compares plaintext passwords. This module is the
//! single collaborator seam for credential verification: a 16-byte random
//! salt plus a `blake3` digest over `salt || password`. Verification
//! recomputes the digest and compares [`blake3::Hash`] values, whose
//! `PartialEq` runs in constant time.
//!
//! A deployment that wants a memory-hard KDF (argon2, scrypt) swaps this
//! module out; nothing outside it knows the digest shape.

use rand::RngCore;

const SALT_LEN: usize = 16;

/// A salted one-way hash of a password.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    salt: [u8; SALT_LEN],
    digest: blake3::Hash,
}

impl PasswordHash {
    /// Hash a password under a fresh random salt.
    #[must_use]
    pub fn new(password: &str) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        Self::with_salt(password, salt)
    }

    fn with_salt(password: &str, salt: [u8; SALT_LEN]) -> Self {
        Self {
            salt,
            digest: digest(&salt, password),
        }
    }

    /// Whether the candidate password matches. Constant-time over the
    /// digest comparison.
    #[must_use]
    pub fn verify(&self, candidate: &str) -> bool {
        digest(&self.salt, candidate) == self.digest
    }
}

// Keep hashes out of debug output wholesale; a salted digest is not a
// secret, but log lines have no business carrying it.
impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

fn digest(salt: &[u8; SALT_LEN], password: &str) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize()
}
