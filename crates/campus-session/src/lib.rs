//! Session state machine for the campus platform client
//!
//! Owns the authoritative in-memory representation of "who is logged in"
//! and every transition of it. All mutation flows through a single
//! reducer dispatch; consuming views read snapshots or subscribe to a
//! watch channel.
//!
//! Session lifecycle:
//! 1. `SessionManager::restore()` replays a stored session at startup
//! 2. `login()`/`register()` authenticate and persist identity + tokens
//! 3. The refresh scheduler rotates the token pair before expiry
//! 4. Refresh failure, `logout()`, `change_password()` success, and
//!    `revoke_all_tokens()` success all tear the session down: storage
//!    cleared, bearer removed, pending refresh alarm cancelled

pub mod error;
pub mod reducer;
pub mod refresh;
pub mod session;

pub use error::{Error, Result};
pub use reducer::{SessionAction, SessionState, reduce};
pub use refresh::{DEFAULT_REFRESH_MARGIN, RefreshScheduler, refresh_delay};
pub use session::SessionManager;
