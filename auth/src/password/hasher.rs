use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use argon2::password_hash::Output;
use argon2::Argon2;

use super::errors::PasswordError;

/// Length in bytes of the derived key embedded in the stored form.
pub const DERIVED_KEY_LENGTH: usize = 64;

/// Smallest salt the key-derivation function accepts.
pub const MIN_SALT_LENGTH: usize = argon2::MIN_SALT_LEN;

const SEPARATOR: char = '.';

/// Password hashing implementation.
///
/// Derives a fixed-size key with Argon2id (memory-hard) from the plaintext
/// and a fresh random salt. The stored form is `hex(key).hex(salt)`; the
/// `.` separator can never appear inside a hex component.
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a new password hasher instance.
    ///
    /// # Returns
    /// PasswordHasher instance configured with Argon2id default parameters
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Hash a plaintext secret with a freshly generated salt.
    ///
    /// # Arguments
    /// * `plaintext` - Secret to hash (password or refresh token)
    /// * `salt_length` - Number of random salt bytes to generate
    ///
    /// # Returns
    /// Stored form `hex(derived_key).hex(salt)`
    ///
    /// # Errors
    /// * `SaltTooShort` - `salt_length` is below the KDF minimum
    /// * `HashingFailed` - Key derivation failed
    pub fn hash(&self, plaintext: &str, salt_length: usize) -> Result<String, PasswordError> {
        if salt_length < MIN_SALT_LENGTH {
            return Err(PasswordError::SaltTooShort {
                min: MIN_SALT_LENGTH,
                actual: salt_length,
            });
        }

        let mut salt = vec![0u8; salt_length];
        OsRng.fill_bytes(&mut salt);

        let key = self
            .derive(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        Ok(format!(
            "{}{}{}",
            hex::encode(key),
            SEPARATOR,
            hex::encode(&salt)
        ))
    }

    /// Well-formed stored form that no plaintext is expected to match.
    ///
    /// Comparing against it runs the same key derivation as a real
    /// comparison, so a lookup miss costs as much as a wrong password.
    /// Salt lengths below the KDF minimum are raised to it.
    pub fn placeholder(&self, salt_length: usize) -> String {
        let mut salt = vec![0u8; salt_length.max(MIN_SALT_LENGTH)];
        OsRng.fill_bytes(&mut salt);

        format!(
            "{}{}{}",
            hex::encode([0u8; DERIVED_KEY_LENGTH]),
            SEPARATOR,
            hex::encode(&salt)
        )
    }

    /// Check a supplied plaintext against a stored form.
    ///
    /// The derived keys are compared in constant time. Malformed stored
    /// forms yield `false` rather than an error.
    ///
    /// # Arguments
    /// * `stored` - Stored form produced by [`PasswordHasher::hash`]
    /// * `supplied` - Plaintext to verify
    ///
    /// # Returns
    /// True if the plaintext matches, false otherwise
    pub fn compare(&self, stored: &str, supplied: &str) -> bool {
        let Some((key_hex, salt_hex)) = stored.split_once(SEPARATOR) else {
            return false;
        };

        let (Ok(expected), Ok(salt)) = (hex::decode(key_hex), hex::decode(salt_hex)) else {
            return false;
        };

        if expected.len() != DERIVED_KEY_LENGTH {
            return false;
        }

        let Ok(derived) = self.derive(supplied.as_bytes(), &salt) else {
            return false;
        };

        // Output equality is constant-time
        match (Output::new(&expected), Output::new(&derived)) {
            (Ok(expected), Ok(derived)) => expected == derived,
            _ => false,
        }
    }

    fn derive(
        &self,
        secret: &[u8],
        salt: &[u8],
    ) -> Result<[u8; DERIVED_KEY_LENGTH], argon2::Error> {
        let mut key = [0u8; DERIVED_KEY_LENGTH];
        self.argon2.hash_password_into(secret, salt, &mut key)?;
        Ok(key)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
