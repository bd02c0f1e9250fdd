//! Persisted Basic-auth credential storage.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;

/// The credential pair as persisted on disk: the base64-encoded
/// `username:password` for the Authorization header, plus the plaintext
/// username for display.
///
/// The encoding is reversible, not cryptographic - the file is
/// password-equivalent, which is why it lives under the user's data
/// directory and nowhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
  pub auth: String,
  pub user: String,
}

/// Encode a username/password pair for the `Authorization: Basic` header.
pub fn encode_basic(username: &str, password: &str) -> String {
  STANDARD.encode(format!("{username}:{password}"))
}

/// File-backed store for the session credential.
#[derive(Debug, Clone)]
pub struct CredentialStore {
  path: PathBuf,
}

impl CredentialStore {
  /// Open the store at the default location (`<data dir>/c9s/session.json`).
  pub fn open() -> Result<Self> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(Self {
      path: data_dir.join("c9s").join("session.json"),
    })
  }

  /// Open a store at an explicit path.
  pub fn at(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// Read the persisted credential, if any.
  pub fn load(&self) -> Result<Option<StoredCredentials>> {
    let contents = match std::fs::read_to_string(&self.path) {
      Ok(contents) => contents,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(e) => {
        return Err(eyre!(
          "Failed to read session file {}: {}",
          self.path.display(),
          e
        ))
      }
    };

    let stored: StoredCredentials = serde_json::from_str(&contents).map_err(|e| {
      eyre!(
        "Corrupt session file {}: {}",
        self.path.display(),
        e
      )
    })?;

    Ok(Some(stored))
  }

  /// Encode and persist a credential pair.
  ///
  /// Nothing is left behind on failure: the encode happens before any write,
  /// and a failed write never truncates an existing file partially because
  /// the whole payload is a handful of bytes written at once.
  pub fn save(&self, username: &str, password: &str) -> Result<StoredCredentials> {
    let stored = StoredCredentials {
      auth: encode_basic(username, password),
      user: username.to_string(),
    };

    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create session directory: {}", e))?;
    }

    let contents = serde_json::to_string(&stored)?;
    std::fs::write(&self.path, contents).map_err(|e| {
      eyre!(
        "Failed to write session file {}: {}",
        self.path.display(),
        e
      )
    })?;

    Ok(stored)
  }

  /// Remove the persisted credential. Removing an absent file is success.
  pub fn clear(&self) -> Result<()> {
    match std::fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(e) => Err(eyre!(
        "Failed to remove session file {}: {}",
        self.path.display(),
        e
      )),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn temp_store() -> (tempfile::TempDir, CredentialStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::at(dir.path().join("session.json"));
    (dir, store)
  }

  #[test]
  fn encode_matches_basic_auth_format() {
    // "admin:secret" in standard base64
    assert_eq!(encode_basic("admin", "secret"), "YWRtaW46c2VjcmV0");
  }

  #[test]
  fn load_before_save_is_none() {
    let (_dir, store) = temp_store();
    assert_eq!(store.load().unwrap(), None);
  }

  #[test]
  fn save_then_load_roundtrips() {
    let (_dir, store) = temp_store();
    let saved = store.save("admin", "secret").unwrap();
    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded.user, "admin");
    assert_eq!(loaded.auth, encode_basic("admin", "secret"));
  }

  #[test]
  fn clear_is_idempotent() {
    let (_dir, store) = temp_store();
    store.save("admin", "secret").unwrap();
    store.clear().unwrap();
    store.clear().unwrap();
    assert_eq!(store.load().unwrap(), None);
  }
}
