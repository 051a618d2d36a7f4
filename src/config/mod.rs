//! Configuration module for vaultbook
//!
//! - Data directory resolution and identifier → file mapping
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::{sanitize_identifier, VaultPaths};
pub use settings::Settings;
