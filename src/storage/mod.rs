//! Storage layer for vaultbook
//!
//! The plaintext side of the store: the JSON document, the working store
//! that edits it, atomic file writes, and the identifier registry.

pub mod document;
pub mod file_io;
pub mod registry;
pub mod working_store;

pub use document::StoreDocument;
pub use file_io::{read_json, secure_remove, write_bytes_atomic, write_json_atomic};
pub use registry::IdentifierRegistry;
pub use working_store::WorkingStore;
