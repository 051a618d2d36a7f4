//! Key derivation using PBKDF2-HMAC-SHA-256
//!
//! Turns a password and a 16-byte salt into 48 bytes of key material: a
//! 32-byte AES-256 key followed by a 16-byte IV. The iteration count is
//! deliberately high; this is the only slow step in the store.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{VaultError, VaultResult};

/// Length of the random salt stored at the head of every durable file
pub const SALT_LEN: usize = 16;

/// Length of the symmetric key
pub const KEY_LEN: usize = 32;

/// Length of the derived IV
pub const IV_LEN: usize = 16;

/// Total bytes produced by one derivation
pub const DERIVED_LEN: usize = KEY_LEN + IV_LEN;

/// Iteration count used for every durable file
pub const DEFAULT_ITERATIONS: u32 = 600_000;

/// Parameters for key derivation
///
/// The file format does not record the iteration count, so a store can only
/// be opened with the params it was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// Params with a custom iteration count
    pub fn with_iterations(iterations: u32) -> Self {
        Self { iterations }
    }
}

/// Derived key and IV, wiped on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
}

impl KeyMaterial {
    /// Build key material from raw parts
    pub fn from_parts(key: [u8; KEY_LEN], iv: [u8; IV_LEN]) -> Self {
        Self { key, iv }
    }

    /// Get the key bytes
    pub fn key(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    /// Get the IV bytes
    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyMaterial([REDACTED])")
    }
}

/// Generate a fresh random salt
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive key and IV from a password and salt
///
/// Only rejects inputs that indicate a programming or configuration error:
/// an empty password, a salt of the wrong size, or zero iterations.
pub fn derive_key_material(
    password: &str,
    salt: &[u8],
    params: &KdfParams,
) -> VaultResult<KeyMaterial> {
    if password.is_empty() {
        return Err(VaultError::Encryption("Password must not be empty".to_string()));
    }
    if salt.len() != SALT_LEN {
        return Err(VaultError::Encryption(format!(
            "Invalid salt size: expected {}, got {}",
            SALT_LEN,
            salt.len()
        )));
    }
    if params.iterations == 0 {
        return Err(VaultError::Encryption(
            "Iteration count must be positive".to_string(),
        ));
    }

    let mut derived = [0u8; DERIVED_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, params.iterations, &mut derived);

    let mut key = [0u8; KEY_LEN];
    let mut iv = [0u8; IV_LEN];
    key.copy_from_slice(&derived[..KEY_LEN]);
    iv.copy_from_slice(&derived[KEY_LEN..]);
    derived.zeroize();

    Ok(KeyMaterial { key, iv })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> KdfParams {
        KdfParams::with_iterations(1_000)
    }

    #[test]
    fn test_default_iterations() {
        assert_eq!(KdfParams::default().iterations, 600_000);
    }

    #[test]
    fn test_derive_splits_key_and_iv() {
        let salt = [7u8; SALT_LEN];
        let km = derive_key_material("test_passphrase", &salt, &fast()).unwrap();
        assert_eq!(km.key().len() + km.iv().len(), DERIVED_LEN);
        assert_ne!(km.key()[..IV_LEN], km.iv()[..]);
    }

    #[test]
    fn test_same_inputs_same_output() {
        let salt = generate_salt();
        let a = derive_key_material("test_passphrase", &salt, &fast()).unwrap();
        let b = derive_key_material("test_passphrase", &salt, &fast()).unwrap();
        assert_eq!(a.key(), b.key());
        assert_eq!(a.iv(), b.iv());
    }

    #[test]
    fn test_different_salt_different_output() {
        let a = derive_key_material("same", &[1u8; SALT_LEN], &fast()).unwrap();
        let b = derive_key_material("same", &[2u8; SALT_LEN], &fast()).unwrap();
        assert_ne!(a.key(), b.key());
        assert_ne!(a.iv(), b.iv());
    }

    #[test]
    fn test_different_password_different_output() {
        let salt = [3u8; SALT_LEN];
        let a = derive_key_material("passphrase1", &salt, &fast()).unwrap();
        let b = derive_key_material("passphrase2", &salt, &fast()).unwrap();
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(derive_key_material("", &[0u8; SALT_LEN], &fast()).is_err());
        assert!(derive_key_material("pw", &[0u8; 8], &fast()).is_err());
        assert!(derive_key_material("pw", &[0u8; SALT_LEN], &KdfParams::with_iterations(0)).is_err());
    }

    #[test]
    fn test_salts_are_random() {
        assert_ne!(generate_salt(), generate_salt());
    }

    #[test]
    fn test_debug_redacts() {
        let km = KeyMaterial::from_parts([9u8; KEY_LEN], [9u8; IV_LEN]);
        assert!(!format!("{:?}", km).contains('9'));
    }
}
