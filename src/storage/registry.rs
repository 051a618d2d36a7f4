//! Identifier registry
//!
//! Remembers which display name owns each slug so that two different
//! identifiers (say "Alice!" and "Alice?") cannot silently share one
//! durable file.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::paths::sanitize_identifier;
use crate::error::{VaultError, VaultResult};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RegistryData {
    #[serde(default)]
    identifiers: BTreeMap<String, String>,
}

/// Slug → display name map persisted next to the durable files
#[derive(Debug)]
pub struct IdentifierRegistry {
    path: PathBuf,
    data: RegistryData,
}

fn normalize(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

impl IdentifierRegistry {
    /// Load the registry, empty if the file doesn't exist yet
    pub fn load(path: PathBuf) -> VaultResult<Self> {
        let data = read_json(&path)?;
        Ok(Self { path, data })
    }

    /// Sanitize `identifier` and make sure its slug isn't owned by a
    /// different name
    ///
    /// Names that differ only in case or surrounding whitespace count as the
    /// same identifier.
    pub fn resolve(&self, identifier: &str) -> VaultResult<String> {
        let slug = sanitize_identifier(identifier);
        if let Some(existing) = self.data.identifiers.get(&slug) {
            if normalize(existing) != normalize(identifier) {
                return Err(VaultError::IdentifierCollision {
                    requested: identifier.to_string(),
                    existing: existing.clone(),
                    slug,
                });
            }
        }
        Ok(slug)
    }

    /// Whether a slug already has an owner
    pub fn owner(&self, slug: &str) -> Option<&str> {
        self.data.identifiers.get(slug).map(String::as_str)
    }

    /// Record `identifier` as the owner of `slug` and save
    pub fn register(&mut self, identifier: &str, slug: &str) -> VaultResult<()> {
        if self.owner(slug).is_some() {
            return Ok(());
        }
        self.data
            .identifiers
            .insert(slug.to_string(), identifier.trim().to_string());
        write_json_atomic(&self.path, &self.data)
    }
}
