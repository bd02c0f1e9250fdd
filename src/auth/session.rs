//! Session state derived from the credential store.

use color_eyre::Result;

use super::credentials::{CredentialStore, StoredCredentials};

/// What the gate currently knows about the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
  /// Startup: persisted storage has not been read yet. Render a neutral
  /// splash in this state, never the login form - the whole point of
  /// distinguishing it from `SignedOut` is avoiding a login-screen flash
  /// before the restore completes.
  Unknown,
  SignedOut,
  SignedIn { username: String },
}

/// The gate in front of every protected view.
///
/// Authenticated-or-not is derived entirely from "is a credential present".
/// There is no expiry and no proactive validation; a revoked credential is
/// discovered only when an API call comes back authorization-denied.
pub struct SessionGate {
  store: CredentialStore,
  state: SessionState,
  credential: Option<String>,
}

impl SessionGate {
  /// A gate that has not read persisted storage yet.
  pub fn new(store: CredentialStore) -> Self {
    Self {
      store,
      state: SessionState::Unknown,
      credential: None,
    }
  }

  /// The underlying store, for the startup restore task.
  pub fn store(&self) -> &CredentialStore {
    &self.store
  }

  /// Apply the result of the startup restore read.
  pub fn apply_restored(&mut self, restored: Option<StoredCredentials>) {
    match restored {
      Some(stored) => {
        tracing::info!(user = %stored.user, "session restored");
        self.credential = Some(stored.auth);
        self.state = SessionState::SignedIn {
          username: stored.user,
        };
      }
      None => {
        self.credential = None;
        self.state = SessionState::SignedOut;
      }
    }
  }

  /// Persist a credential pair and activate the session. Returns the encoded
  /// credential for the API client.
  ///
  /// Never contacts the network; the login view verifies the pair against
  /// the server before calling this. On a persistence failure nothing
  /// changes - the gate still reads whatever it read before.
  pub fn login(&mut self, username: &str, password: &str) -> Result<String> {
    let stored = self.store.save(username, password)?;
    self.credential = Some(stored.auth.clone());
    self.state = SessionState::SignedIn {
      username: stored.user,
    };
    tracing::info!(user = username, "signed in");
    Ok(stored.auth)
  }

  /// Sign out. Idempotent.
  ///
  /// The in-memory flip happens first, so the gate reads signed-out from the
  /// caller's next line on, even if removing the persisted file then fails.
  pub fn logout(&mut self) -> Result<()> {
    self.state = SessionState::SignedOut;
    self.credential = None;
    self.store.clear()?;
    tracing::info!("signed out");
    Ok(())
  }

  pub fn state(&self) -> &SessionState {
    &self.state
  }

  pub fn is_authenticated(&self) -> bool {
    matches!(self.state, SessionState::SignedIn { .. })
  }

  pub fn username(&self) -> Option<&str> {
    match &self.state {
      SessionState::SignedIn { username } => Some(username),
      _ => None,
    }
  }

  /// The encoded credential, or absent when signed out or unknown.
  pub fn credential(&self) -> Option<&str> {
    self.credential.as_deref()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::auth::credentials::encode_basic;

  fn temp_gate() -> (tempfile::TempDir, SessionGate) {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::at(dir.path().join("session.json"));
    (dir, SessionGate::new(store))
  }

  #[test]
  fn starts_unknown_not_signed_out() {
    let (_dir, gate) = temp_gate();
    assert_eq!(*gate.state(), SessionState::Unknown);
    assert!(!gate.is_authenticated());
  }

  #[test]
  fn restore_with_no_stored_credential_signs_out() {
    let (_dir, mut gate) = temp_gate();
    gate.apply_restored(None);
    assert_eq!(*gate.state(), SessionState::SignedOut);
    assert_eq!(gate.credential(), None);
  }

  #[test]
  fn login_activates_and_persists() {
    let (_dir, mut gate) = temp_gate();
    gate.apply_restored(None);

    let credential = gate.login("admin", "secret").unwrap();
    assert_eq!(credential, encode_basic("admin", "secret"));
    assert!(gate.is_authenticated());
    assert_eq!(gate.username(), Some("admin"));

    // A fresh gate over the same store sees the persisted session.
    let mut second = SessionGate::new(gate.store().clone());
    let restored = second.store().load().unwrap();
    second.apply_restored(restored);
    assert_eq!(second.username(), Some("admin"));
  }

  #[test]
  fn logout_flips_gate_and_clears_storage() {
    let (_dir, mut gate) = temp_gate();
    gate.apply_restored(None);
    gate.login("admin", "secret").unwrap();

    gate.logout().unwrap();
    assert_eq!(*gate.state(), SessionState::SignedOut);
    assert_eq!(gate.credential(), None);
    assert_eq!(gate.store().load().unwrap(), None);

    // Idempotent.
    gate.logout().unwrap();
    assert_eq!(*gate.state(), SessionState::SignedOut);
  }
}
