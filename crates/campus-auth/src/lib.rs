//! Authentication layer for the campus platform client
//!
//! Provides the identity/token data model, typed wrappers over the remote
//! auth endpoints, and durable credential storage with corruption
//! recovery. This crate is a standalone library with no dependency on the
//! session layer — it can be tested and used independently.
//!
//! Credential flow:
//! 1. Session layer calls `endpoints::login()` / `endpoints::register()`
//! 2. Identity + token pair persisted via `CredentialStore::save()`
//! 3. Refresh scheduler calls `endpoints::refresh()` before expiry
//! 4. Rotated tokens saved again via `CredentialStore::save()`
//! 5. `CredentialStore::load()` restores the pair across restarts;
//!    corrupt entries are wiped and reported as "no session"

pub mod endpoints;
pub mod error;
pub mod store;
pub mod types;

pub use error::{Error, Result};
pub use store::{CredentialStore, StoredSession};
pub use types::{
    AuthResponse, ChangePasswordRequest, Identity, LoginRequest, ProfileUpdate, RegisterRequest,
    Role, TokenPair,
};
