//! Encrypted durable file framing
//!
//! Layout is `[16-byte salt][ciphertext + tag]`: no magic number, no version.
//! Writes go to a `.new` sibling first and are renamed into place, so the
//! canonical path only ever holds a complete file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{VaultError, VaultResult};
use crate::storage::file_io::write_bytes_atomic;

use super::key_derivation::{derive_key_material, generate_salt, KdfParams, SALT_LEN};
use super::{cipher, SecureBytes};

/// Path of the staging sibling used while saving
pub fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".new");
    PathBuf::from(name)
}

/// Read and decrypt a durable file
///
/// Returns [`VaultError::CorruptFile`] when the file cannot even hold a salt,
/// and [`VaultError::WrongPasswordOrCorrupt`] for every decryption failure.
pub fn open(path: &Path, password: &str, params: &KdfParams) -> VaultResult<SecureBytes> {
    let data = fs::read(path)
        .map_err(|e| VaultError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

    if data.len() <= SALT_LEN {
        warn!(path = %path.display(), size = data.len(), "durable file too short");
        return Err(VaultError::CorruptFile(format!(
            "{} is only {} bytes",
            path.display(),
            data.len()
        )));
    }

    let (salt, ciphertext) = data.split_at(SALT_LEN);
    let key = derive_key_material(password, salt, params)?;

    match cipher::decrypt(ciphertext, &key) {
        Ok(plaintext) => {
            debug!(path = %path.display(), bytes = plaintext.len(), "decrypted durable file");
            Ok(SecureBytes::new(plaintext))
        }
        Err(_) => {
            warn!(path = %path.display(), "authentication failed while decrypting durable file");
            Err(VaultError::WrongPasswordOrCorrupt)
        }
    }
}

/// Encrypt a snapshot and atomically replace the durable file
///
/// An empty snapshot is refused so a broken store can never overwrite good
/// data with nothing.
pub fn save(path: &Path, password: &str, plaintext: &[u8], params: &KdfParams) -> VaultResult<()> {
    if plaintext.is_empty() {
        return Err(VaultError::EmptySnapshot);
    }

    let salt = generate_salt();
    let key = derive_key_material(password, &salt, params)?;
    let ciphertext = cipher::encrypt(plaintext, &key)?;

    let mut framed = Vec::with_capacity(SALT_LEN + ciphertext.len());
    framed.extend_from_slice(&salt);
    framed.extend_from_slice(&ciphertext);

    write_bytes_atomic(path, &staging_path(path), &framed)?;
    debug!(path = %path.display(), bytes = framed.len(), "saved durable file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fast() -> KdfParams {
        KdfParams::with_iterations(1_000)
    }

    #[test]
    fn test_save_and_open() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("alice.enc");

        save(&path, "pw", b"{\"hello\":1}", &fast()).unwrap();
        let plaintext = open(&path, "pw", &fast()).unwrap();
        assert_eq!(plaintext.as_bytes(), b"{\"hello\":1}");
    }

    #[test]
    fn test_layout_has_salt_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("alice.enc");

        save(&path, "pw", b"x", &fast()).unwrap();
        let raw = fs::read(&path).unwrap();
        assert_eq!(raw.len(), SALT_LEN + 1 + cipher::TAG_SIZE);
    }

    #[test]
    fn test_fresh_salt_every_save() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("alice.enc");

        save(&path, "pw", b"same", &fast()).unwrap();
        let first = fs::read(&path).unwrap();
        save(&path, "pw", b"same", &fast()).unwrap();
        let second = fs::read(&path).unwrap();

        assert_ne!(first[..SALT_LEN], second[..SALT_LEN]);
        assert_ne!(first, second);
    }

    #[test]
    fn test_wrong_password() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("alice.enc");

        save(&path, "right", b"secret data", &fast()).unwrap();
        let result = open(&path, "wrong", &fast());
        assert!(matches!(result, Err(VaultError::WrongPasswordOrCorrupt)));
    }

    #[test]
    fn test_flipped_byte_is_detected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("alice.enc");

        save(&path, "pw", b"secret data", &fast()).unwrap();
        let mut raw = fs::read(&path).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        fs::write(&path, &raw).unwrap();

        assert!(matches!(
            open(&path, "pw", &fast()),
            Err(VaultError::WrongPasswordOrCorrupt)
        ));
    }

    #[test]
    fn test_short_file_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("short.enc");

        fs::write(&path, [0u8; SALT_LEN]).unwrap();
        assert!(matches!(
            open(&path, "pw", &fast()),
            Err(VaultError::CorruptFile(_))
        ));
    }

    #[test]
    fn test_empty_snapshot_refused() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("alice.enc");

        save(&path, "pw", b"keep me", &fast()).unwrap();
        assert!(matches!(
            save(&path, "pw", b"", &fast()),
            Err(VaultError::EmptySnapshot)
        ));
        assert_eq!(open(&path, "pw", &fast()).unwrap().as_bytes(), b"keep me");
    }

    #[test]
    fn test_no_staging_file_left() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("alice.enc");

        save(&path, "pw", b"data", &fast()).unwrap();
        assert!(path.exists());
        assert!(!staging_path(&path).exists());
        assert_eq!(
            staging_path(&path),
            temp_dir.path().join("alice.enc.new")
        );
    }
}
