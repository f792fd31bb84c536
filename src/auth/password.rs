//! Password hashing.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};

use super::errors::{AuthError, AuthResult};

/// One-way password hashing with verification
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into an opaque, self-describing string
    fn hash(&self, plaintext: &str) -> AuthResult<String>;

    /// Check a plaintext password against a hash produced by [`PasswordHasher::hash`].
    ///
    /// Malformed hashes verify as `false`.
    fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

/// Argon2id hasher with a random per-password salt and a server-side pepper
#[derive(Clone)]
pub struct Argon2Hasher {
    pepper: String,
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new(pepper: String) -> Self {
        Self {
            pepper,
            argon2: Argon2::default(),
        }
    }

    /// Use explicit Argon2 parameters instead of the crate defaults
    pub fn with_params(pepper: String, params: argon2::Params) -> Self {
        Self {
            pepper,
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        }
    }

    fn peppered(&self, plaintext: &str) -> String {
        format!("{}{}", plaintext, self.pepper)
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        Ok(self
            .argon2
            .hash_password(self.peppered(plaintext).as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        self.argon2
            .verify_password(self.peppered(plaintext).as_bytes(), &parsed_hash)
            .is_ok()
    }
}
