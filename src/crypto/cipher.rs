//! AES-256-GCM encryption/decryption of opaque buffers
//!
//! The nonce is the first 12 bytes of the derived IV. Every durable write
//! derives fresh key material from a fresh salt, so a key never sees the
//! same nonce twice.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};

use crate::error::{VaultError, VaultResult};

use super::KeyMaterial;

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// Size of the authentication tag appended to every ciphertext
pub const TAG_SIZE: usize = 16;

fn cipher_for(key: &KeyMaterial) -> VaultResult<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.key())
        .map_err(|e| VaultError::Encryption(format!("Failed to create cipher: {}", e)))
}

/// Encrypt plaintext with the given key material
///
/// Output is the ciphertext followed by a 16-byte tag.
pub fn encrypt(plaintext: &[u8], key: &KeyMaterial) -> VaultResult<Vec<u8>> {
    let cipher = cipher_for(key)?;
    let nonce = Nonce::from_slice(&key.iv()[..NONCE_SIZE]);

    cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| VaultError::Encryption(format!("Encryption failed: {}", e)))
}

/// Decrypt and authenticate a ciphertext
///
/// Any mismatch in key, IV or ciphertext bytes yields
/// [`VaultError::AuthFailure`]; partial plaintext is never returned.
pub fn decrypt(ciphertext: &[u8], key: &KeyMaterial) -> VaultResult<Vec<u8>> {
    if ciphertext.len() < TAG_SIZE {
        return Err(VaultError::AuthFailure);
    }

    let cipher = cipher_for(key)?;
    let nonce = Nonce::from_slice(&key.iv()[..NONCE_SIZE]);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| VaultError::AuthFailure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::key_derivation::{IV_LEN, KEY_LEN};

    fn key(byte: u8) -> KeyMaterial {
        KeyMaterial::from_parts([byte; KEY_LEN], [byte.wrapping_add(1); IV_LEN])
    }

    #[test]
    fn test_round_trip_sizes() {
        let k = key(1);
        for len in [0usize, 1, 15, 16, 17, 64, 10_000] {
            let plaintext: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let ct = encrypt(&plaintext, &k).unwrap();
            assert_eq!(ct.len(), len + TAG_SIZE);
            assert_eq!(decrypt(&ct, &k).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_wrong_key_fails() {
        let ct = encrypt(b"Hello, World!", &key(1)).unwrap();
        assert!(matches!(decrypt(&ct, &key(2)), Err(VaultError::AuthFailure)));
    }

    #[test]
    fn test_wrong_iv_fails() {
        let k1 = KeyMaterial::from_parts([5; KEY_LEN], [1; IV_LEN]);
        let k2 = KeyMaterial::from_parts([5; KEY_LEN], [2; IV_LEN]);
        let ct = encrypt(b"Hello, World!", &k1).unwrap();
        assert!(decrypt(&ct, &k2).is_err());
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let k = key(3);
        let mut ct = encrypt(b"Hello, World!", &k).unwrap();
        ct[0] ^= 0xFF;
        assert!(matches!(decrypt(&ct, &k), Err(VaultError::AuthFailure)));
    }

    #[test]
    fn test_truncated_ciphertext_fails() {
        let k = key(4);
        let ct = encrypt(b"abc", &k).unwrap();
        assert!(decrypt(&ct[..ct.len() - 1], &k).is_err());
        assert!(decrypt(&ct[..4], &k).is_err());
    }
}
