use crate::error::AppError;
use bcrypt::{hash, verify};
use lazy_static::lazy_static;

/// bcrypt work factor. Fixed so every instance of the service verifies hashes
/// at the same cost.
pub const HASH_COST: u32 = bcrypt::DEFAULT_COST;

/// bcrypt only reads this many bytes of input; anything past it is ignored.
pub const MAX_PASSWORD_BYTES: usize = 72;

lazy_static! {
    // Well-formed hash used to burn the same CPU time when the stored hash is unusable.
    static ref DECOY_HASH: Option<String> = hash("decoy-credential", HASH_COST).ok();
}

/// One-way credential hashing.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produces a salted, algorithm-tagged hash. Succeeds for any input of at
    /// most `MAX_PASSWORD_BYTES`, including the empty string. Callers bound
    /// the length before hashing.
    fn hash(&self, plaintext: &str) -> Result<String, AppError>;

    /// True iff `plaintext` matches `hashed`. Never errors: a malformed or
    /// foreign hash is simply a mismatch.
    fn verify(&self, hashed: &str, plaintext: &str) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BcryptHasher;

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        hash(plaintext, HASH_COST).map_err(|e| {
            log::error!("bcrypt hashing failed: {}", e);
            AppError::HashingFailed
        })
    }

    fn verify(&self, hashed: &str, plaintext: &str) -> bool {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            // Would be truncated to a prefix, which is not the password.
            burn_decoy();
            return false;
        }

        match verify(plaintext, hashed) {
            Ok(matches) => matches,
            Err(_) => {
                burn_decoy();
                false
            }
        }
    }
}

/// Keeps a rejected comparison as slow as a real one.
fn burn_decoy() {
    if let Some(decoy) = DECOY_HASH.as_deref() {
        let _ = verify("decoy-attempt", decoy);
    }
}
