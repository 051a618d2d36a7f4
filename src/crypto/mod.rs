//! Cryptographic functions for vaultbook
//!
//! PBKDF2-HMAC-SHA-256 key derivation, AES-256-GCM encryption, and the
//! salt-prefixed durable file format built on top of them.

pub mod cipher;
pub mod file_codec;
pub mod key_derivation;
pub mod password_policy;
pub mod secure_memory;

pub use cipher::{decrypt, encrypt};
pub use key_derivation::{derive_key_material, generate_salt, KdfParams, KeyMaterial};
pub use password_policy::{PasswordCheck, Strength};
pub use secure_memory::{SecureBytes, SecureString};
