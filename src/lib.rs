//! vaultbook - password-encrypted local store for a personal budget tracker
//!
//! Income, fixed expenses, variable expenses and their categories live in a
//! single file that is unreadable without the user's password. While a
//! session is open the store is mounted as a private plaintext working copy;
//! every change is re-encrypted into the durable file right away and the
//! working copy is deleted when the session closes.
//!
//! # Architecture
//!
//! - `crypto`: key derivation, authenticated encryption, the durable file
//!   format, password policy and zeroizing buffers
//! - `storage`: the working store document, atomic file writes and the
//!   identifier registry
//! - `session`: the open/mutate/close lifecycle tying the two together
//! - `models`: categories, income, expenses and money
//! - `config`: paths and user settings
//! - `cli` / `display`: the command-line front end
//!
//! # Example
//!
//! ```rust,ignore
//! use vaultbook::config::VaultPaths;
//! use vaultbook::Session;
//!
//! let session = Session::new(VaultPaths::new()?);
//! session.open_session("alice", "Str0ng!Pass")?;
//! println!("{}", session.summary()?.balance);
//! session.close_session()?;
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod models;
pub mod session;
pub mod storage;

pub use error::{VaultError, VaultResult};
pub use session::{Session, Summary};
