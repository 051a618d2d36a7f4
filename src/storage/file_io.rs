//! Atomic file replacement and plaintext removal
//!
//! Every file vaultbook writes goes through a staging sibling and a rename,
//! so readers see either the old content or the new, never a torn write.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::VaultError;

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, VaultError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| VaultError::Io(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|e| VaultError::Json(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write JSON to a file atomically (write to temp, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), VaultError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let bytes = serde_json::to_vec_pretty(data)
        .map_err(|e| VaultError::Json(format!("Failed to serialize data: {}", e)))?;
    write_bytes_atomic(path, &path.with_extension("json.tmp"), &bytes)
}

/// Write bytes to `path` by way of `staging`
///
/// The staging file is created with owner-only permissions, synced, then
/// renamed over `path`. On failure the staging file is removed and `path`
/// is left untouched.
pub fn write_bytes_atomic(path: &Path, staging: &Path, bytes: &[u8]) -> Result<(), VaultError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            VaultError::Io(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let written = write_private(staging, bytes);
    if let Err(e) = written {
        let _ = fs::remove_file(staging);
        return Err(e);
    }

    fs::rename(staging, path).map_err(|e| {
        let _ = fs::remove_file(staging);
        VaultError::Io(format!("Failed to rename {}: {}", staging.display(), e))
    })?;

    Ok(())
}

fn write_private(path: &Path, bytes: &[u8]) -> Result<(), VaultError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .map_err(|e| VaultError::Io(format!("Failed to create {}: {}", path.display(), e)))?;

    file.write_all(bytes)
        .map_err(|e| VaultError::Io(format!("Failed to write {}: {}", path.display(), e)))?;

    file.sync_all()?;
    Ok(())
}

/// Overwrite a file with zeros, then delete it
///
/// Missing files are not an error. Best effort on the overwrite: journaling
/// or copy-on-write filesystems may keep older blocks around.
pub fn secure_remove(path: &Path) -> Result<(), VaultError> {
    let len = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(VaultError::Io(format!(
                "Failed to stat {}: {}",
                path.display(),
                e
            )))
        }
    };

    if let Ok(mut file) = OpenOptions::new().write(true).open(path) {
        let zeros = vec![0u8; 8192];
        let mut remaining = len;
        while remaining > 0 {
            let chunk = remaining.min(zeros.len() as u64) as usize;
            if file.write_all(&zeros[..chunk]).is_err() {
                break;
            }
            remaining -= chunk as u64;
        }
        let _ = file.sync_all();
    }

    fs::remove_file(path)
        .map_err(|e| VaultError::Io(format!("Failed to remove {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize, Default)]
    struct Owners {
        slugs: Vec<String>,
    }

    #[test]
    fn test_missing_json_reads_as_default() {
        let temp_dir = TempDir::new().unwrap();
        let owners: Owners = read_json(temp_dir.path().join("identifiers.json")).unwrap();
        assert!(owners.slugs.is_empty());
    }

    #[test]
    fn test_json_survives_rewrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("identifiers.json");

        write_json_atomic(&path, &Owners { slugs: vec!["alice".into()] }).unwrap();
        write_json_atomic(&path, &Owners { slugs: vec!["alice".into(), "bob".into()] }).unwrap();

        let owners: Owners = read_json(&path).unwrap();
        assert_eq!(owners.slugs, ["alice", "bob"]);
        assert!(!temp_dir.path().join("identifiers.json.tmp").exists());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("identifiers.json");
        fs::write(&path, b"{ not json").unwrap();

        let result: Result<Owners, _> = read_json(&path);
        assert!(matches!(result, Err(VaultError::Json(_))));
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("out.bin");
        let staging = temp_dir.path().join("nested").join("dir").join("out.bin.new");

        write_bytes_atomic(&path, &staging, b"abc").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"abc");
        assert!(!staging.exists());
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.bin");
        let staging = temp_dir.path().join("out.bin.new");

        fs::write(&path, b"old").unwrap();
        write_bytes_atomic(&path, &staging, b"new").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_rename_leaves_no_staging_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("alice.enc");
        let staging = temp_dir.path().join("alice.enc.new");

        // A non-empty directory in the way cannot be replaced by a file
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"x").unwrap();

        let err = write_bytes_atomic(&path, &staging, b"ciphertext").unwrap_err();
        assert!(matches!(err, VaultError::Io(_)));
        assert!(!staging.exists());
        assert!(path.join("keep").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_written_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.bin");
        write_bytes_atomic(&path, &temp_dir.path().join("out.tmp"), b"abc").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_secure_remove() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plain.db");

        fs::write(&path, b"plaintext").unwrap();
        secure_remove(&path).unwrap();
        assert!(!path.exists());

        // Removing again is fine
        secure_remove(&path).unwrap();
    }
}
