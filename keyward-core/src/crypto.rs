use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use hmac::{Hmac, Mac};
use password_hash::Error as PasswordHashError;
use rand::{TryRngCore, rngs::OsRng};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::session::token::TOKEN_LENGTH;

type HmacSha256 = Hmac<Sha256>;

/// Number of digest bytes kept for a session token (two hex chars each).
const TOKEN_DIGEST_BYTES: usize = TOKEN_LENGTH / 2;

/// Argon2id cost parameters.
///
/// The default is the "strong" server profile: ~64 MiB of memory and three
/// passes. Tests and constrained hosts can dial it down with
/// [`HashCost::minimal`] or explicit values from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes over memory.
    pub iterations: u32,
    /// Degree of parallelism (lanes).
    pub parallelism: u32,
}

impl HashCost {
    /// ~64 MiB memory, 3 iterations, single lane.
    pub const STRONG: Self = Self {
        memory_kib: 64 * 1024,
        iterations: 3,
        parallelism: 1,
    };

    /// Smallest parameters Argon2 accepts. Only suitable for tests.
    pub const fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }

    /// Reject parameters Argon2 would refuse, without building a hasher.
    pub fn check(&self) -> Result<(), CryptoError> {
        self.params().map(|_| ())
    }

    fn params(&self) -> Result<Params, CryptoError> {
        // Params::new multiplies the lane count before bounding it.
        if self.parallelism > Params::MAX_P_COST {
            return Err(CryptoError::InvalidHashCost(format!(
                "parallelism must be at most {}",
                Params::MAX_P_COST
            )));
        }
        Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(32),
        )
        .map_err(|err| CryptoError::InvalidHashCost(err.to_string()))
    }
}

impl Default for HashCost {
    fn default() -> Self {
        Self::STRONG
    }
}

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("password pepper must not be empty")]
    EmptyPasswordPepper,
    #[error("token key must not be empty")]
    EmptyTokenKey,
    #[error("invalid Argon2 parameters: {0}")]
    InvalidHashCost(String),
    #[error("password hashing error: {0}")]
    PasswordHash(String),
    #[error("system randomness unavailable: {0}")]
    Entropy(String),
}

impl From<PasswordHashError> for CryptoError {
    fn from(err: PasswordHashError) -> Self {
        CryptoError::PasswordHash(err.to_string())
    }
}

/// Centralized hashing for credentials and session tokens.
///
/// - Argon2id with a random salt and a server-side pepper for passwords.
/// - HMAC-SHA-256 keyed with a server secret for minting session tokens.
///
/// Keeping both in one place guarantees consistent parameter choices across
/// every store that needs them.
pub struct AuthCrypto {
    argon2: Argon2<'static>,
    cost: HashCost,
    password_pepper: Zeroizing<Vec<u8>>,
    token_key: Zeroizing<Vec<u8>>,
}

impl AuthCrypto {
    const SALT_LENGTH: usize = password_hash::Salt::RECOMMENDED_LENGTH;
    const TOKEN_SALT_LENGTH: usize = 32;

    /// Build a helper with the strong default cost.
    pub fn new(
        password_pepper: impl AsRef<[u8]>,
        token_key: impl AsRef<[u8]>,
    ) -> Result<Self, CryptoError> {
        Self::with_cost(password_pepper, token_key, HashCost::default())
    }

    /// Build a helper with caller-specified Argon2 cost.
    pub fn with_cost(
        password_pepper: impl AsRef<[u8]>,
        token_key: impl AsRef<[u8]>,
        cost: HashCost,
    ) -> Result<Self, CryptoError> {
        let pepper = password_pepper.as_ref();
        if pepper.is_empty() {
            return Err(CryptoError::EmptyPasswordPepper);
        }

        let key = token_key.as_ref();
        if key.is_empty() {
            return Err(CryptoError::EmptyTokenKey);
        }

        let params = cost.params()?;

        let argon2 =
            Argon2::new(Algorithm::Argon2id, Version::default(), params);

        Ok(Self {
            argon2,
            cost,
            password_pepper: Zeroizing::new(pepper.to_vec()),
            token_key: Zeroizing::new(key.to_vec()),
        })
    }

    pub fn cost(&self) -> HashCost {
        self.cost
    }

    /// Hash a password with Argon2id, a random salt and the shared pepper.
    /// The resulting PHC string is the only form ever stored.
    pub fn hash_password(&self, password: &str) -> Result<String, CryptoError> {
        let material = self.peppered(password);

        let mut salt_bytes = [0u8; Self::SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|err| CryptoError::Entropy(err.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)?;

        Ok(self.argon2.hash_password(&material, &salt)?.to_string())
    }

    /// Verify a candidate password against a stored PHC string.
    ///
    /// A stored hash that does not parse verifies as `false`.
    pub fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(password_hash) else {
            return false;
        };

        let material = self.peppered(password);
        self.argon2.verify_password(&material, &parsed).is_ok()
    }

    /// Mint an opaque session token bound to `identity`.
    ///
    /// HMAC-SHA-256 over the identity and 32 fresh random bytes, truncated to
    /// 128 bits and rendered as 32 lowercase hex characters.
    pub fn mint_token(&self, identity: &str) -> Result<String, CryptoError> {
        let mut salt = [0u8; Self::TOKEN_SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|err| CryptoError::Entropy(err.to_string()))?;

        let mut mac = HmacSha256::new_from_slice(&self.token_key)
            .map_err(|_| CryptoError::EmptyTokenKey)?;
        mac.update(identity.as_bytes());
        mac.update(&salt);

        let digest = mac.finalize().into_bytes();
        Ok(hex::encode(&digest[..TOKEN_DIGEST_BYTES]))
    }

    fn peppered(&self, password: &str) -> Zeroizing<Vec<u8>> {
        let mut material = Zeroizing::new(Vec::with_capacity(
            password.len() + self.password_pepper.len(),
        ));
        material.extend_from_slice(password.as_bytes());
        material.extend_from_slice(&self.password_pepper);
        material
    }
}

impl fmt::Debug for AuthCrypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCrypto")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}
