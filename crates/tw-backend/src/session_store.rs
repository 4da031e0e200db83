//! Persisted-session storage.
//!
//! The token pair of the last sign-in survives process restart so
//! `bootstrap_session` can recover it. Priority: OS keychain →
//! `TRADEWIND_AUTH__SESSION` env → `~/.tradewind/session` file (0600).

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

const DEFAULT_KEYRING_SERVICE: &str = "tradewind";
const KEYRING_USER: &str = "session";
const SESSION_FILE_NAME: &str = "session";

/// The persisted part of a provider session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub refresh_token: String,
}

/// Returns the keyring service name.
///
/// Defaults to `"tradewind"`. Override via `TRADEWIND_KEYRING_SERVICE` env var
/// for testing to avoid touching production credentials.
fn keyring_service() -> String {
    std::env::var("TRADEWIND_KEYRING_SERVICE")
        .unwrap_or_else(|_| DEFAULT_KEYRING_SERVICE.to_string())
}

/// Store a session in the OS keychain. Falls back to file if keyring unavailable.
///
/// # Errors
///
/// Returns [`AuthError::SessionStoreError`] if both keyring and file storage fail.
pub fn store(session: &StoredSession) -> Result<(), AuthError> {
    let payload = serde_json::to_string(session)
        .map_err(|e| AuthError::SessionStoreError(format!("serialize session: {e}")))?;
    match keyring::Entry::new(&keyring_service(), KEYRING_USER) {
        Ok(entry) => match entry.set_password(&payload) {
            Ok(()) => Ok(()),
            Err(error) => {
                tracing::warn!(%error, "keyring store failed; falling back to file");
                store_file(&payload)
            }
        },
        Err(error) => {
            tracing::warn!(%error, "keyring unavailable; falling back to file");
            store_file(&payload)
        }
    }
}

/// Load a persisted session. Priority: keyring → `TRADEWIND_AUTH__SESSION` env → file.
#[must_use]
pub fn load() -> Option<StoredSession> {
    // 1. Keyring
    if let Ok(entry) = keyring::Entry::new(&keyring_service(), KEYRING_USER)
        && let Ok(payload) = entry.get_password()
        && let Some(session) = parse(&payload)
    {
        return Some(session);
    }

    // 2. Environment variable
    if let Ok(payload) = std::env::var("TRADEWIND_AUTH__SESSION")
        && let Some(session) = parse(&payload)
    {
        return Some(session);
    }

    // 3. File fallback
    load_file().as_deref().and_then(parse)
}

/// Delete the persisted session from keyring and file.
///
/// # Errors
///
/// Returns [`AuthError::SessionStoreError`] if the session file cannot be removed.
pub fn delete() -> Result<(), AuthError> {
    // Delete from keyring (ignore errors — may not exist)
    if let Ok(entry) = keyring::Entry::new(&keyring_service(), KEYRING_USER) {
        let _ = entry.delete_credential();
    }

    let path = session_path()?;
    if path.exists() {
        fs::remove_file(&path).map_err(|e| {
            AuthError::SessionStoreError(format!("failed to delete {}: {e}", path.display()))
        })?;
    }

    Ok(())
}

fn parse(payload: &str) -> Option<StoredSession> {
    serde_json::from_str(payload).ok()
}

// --- Private file helpers ---

fn session_path() -> Result<PathBuf, AuthError> {
    dirs::home_dir()
        .map(|h| h.join(".tradewind").join(SESSION_FILE_NAME))
        .ok_or_else(|| {
            AuthError::SessionStoreError("home directory not found — cannot store session".into())
        })
}

fn store_file(payload: &str) -> Result<(), AuthError> {
    let path = session_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AuthError::SessionStoreError(format!("mkdir {}: {e}", parent.display()))
        })?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(parent, fs::Permissions::from_mode(0o700)) {
                tracing::warn!("failed to chmod 0700 {}: {e}", parent.display());
            }
        }
    }
    fs::write(&path, payload)
        .map_err(|e| AuthError::SessionStoreError(format!("write {}: {e}", path.display())))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
            .map_err(|e| AuthError::SessionStoreError(format!("chmod {}: {e}", path.display())))?;
    }

    Ok(())
}

fn load_file() -> Option<String> {
    let path = session_path().ok()?;
    fs::read_to_string(&path)
        .ok()
        .filter(|s| !s.trim().is_empty())
}
