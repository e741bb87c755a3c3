//! Durable credential storage
//!
//! Persists the current identity and token pair as two JSON entries in a
//! storage directory: `auth_tokens.json` and `auth_user.json`. All writes
//! use atomic temp-file + rename to prevent corruption on crash, and a
//! tokio Mutex serializes writers. Entries are written 0600 since they
//! contain live tokens.
//!
//! A corrupted store must never crash startup: unparseable content, a
//! partial pair (one entry without the other), or an unreadable entry is
//! handled by wiping both entries and reporting "no session".

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::{Identity, TokenPair};

/// Durable entry holding the token pair.
pub const TOKENS_ENTRY: &str = "auth_tokens.json";

/// Durable entry holding the identity record.
pub const USER_ENTRY: &str = "auth_user.json";

/// A restored session: both entries present and parseable.
#[derive(Debug, Clone)]
pub struct StoredSession {
    pub user: Identity,
    pub tokens: TokenPair,
}

/// File-backed credential store for one client instance.
pub struct CredentialStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

/// Outcome of reading one durable entry.
enum Entry<T> {
    Present(T),
    Missing,
    Corrupt,
}

impl CredentialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn tokens_path(&self) -> PathBuf {
        self.dir.join(TOKENS_ENTRY)
    }

    fn user_path(&self) -> PathBuf {
        self.dir.join(USER_ENTRY)
    }

    /// Persist the identity and token pair as two durable entries.
    pub async fn save(&self, user: &Identity, tokens: &TokenPair) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::Storage(format!("creating storage directory: {e}")))?;
        write_atomic(&self.tokens_path(), tokens).await?;
        write_atomic(&self.user_path(), user).await?;
        debug!(user_id = user.id, "persisted credentials");
        Ok(())
    }

    /// Restore the stored session.
    ///
    /// Returns `None` when no session is stored. Corruption — unparseable
    /// content or one entry present without the other — wipes both entries
    /// and also returns `None`; it is never an error.
    pub async fn load(&self) -> Option<StoredSession> {
        let tokens = read_entry::<TokenPair>(&self.tokens_path()).await;
        let user = read_entry::<Identity>(&self.user_path()).await;

        match (user, tokens) {
            (Entry::Present(user), Entry::Present(tokens)) => {
                info!(user_id = user.id, "restored stored session");
                Some(StoredSession { user, tokens })
            }
            (Entry::Missing, Entry::Missing) => None,
            _ => {
                warn!(
                    dir = %self.dir.display(),
                    "credential entries corrupt or partial, resetting store"
                );
                self.clear().await;
                None
            }
        }
    }

    /// Unconditionally remove both entries. Best-effort: failures are
    /// logged, never propagated.
    pub async fn clear(&self) {
        let _guard = self.write_lock.lock().await;
        remove_entry(&self.tokens_path()).await;
        remove_entry(&self.user_path()).await;
        debug!(dir = %self.dir.display(), "cleared credential store");
    }
}

async fn read_entry<T: DeserializeOwned>(path: &Path) -> Entry<T> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(value) => Entry::Present(value),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unparseable credential entry");
                Entry::Corrupt
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Entry::Missing,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable credential entry");
            Entry::Corrupt
        }
    }
}

async fn remove_entry(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove credential entry"),
    }
}

/// Write one entry atomically: temp file in the same directory, 0600
/// permissions, then rename over the target.
async fn write_atomic<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| Error::Storage(format!("serializing credential entry: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Storage("credential path has no parent directory".into()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("entry");
    let tmp_path = dir.join(format!(".{name}.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Storage(format!("writing temp credential entry: {e}")))?;

    // Set 0600 permissions (unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Storage(format!("setting credential entry permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Storage(format!("renaming temp credential entry: {e}")))?;

    Ok(())
}
