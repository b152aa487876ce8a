//! Authentication module for the admin session.
//!
//! This module provides:
//! - `SessionStore`: credential lifecycle across persistent and session scope
//! - `KeyValueStore` backends: in-memory, JSON file, and OS keychain
//! - `Navigator`: the host hook used to return to the login screen
//!
//! A session is considered active whenever a non-empty access token is
//! stored in either scope; persistent scope takes precedence.

pub mod navigator;
pub mod session;
pub mod storage;

pub use navigator::{HeadlessNavigator, Navigator, LOGIN_PATH};
pub use session::{CredentialBundle, SessionState, SessionStore, SESSION_KEYS};
pub use storage::{FileStore, KeyValueStore, KeyringStore, MemoryStore, StorageScope};
