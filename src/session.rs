use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::token::TokenStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
  Unauthenticated,
  Checking,
  Authenticated,
  Redirecting,
}

// Owns the credential slot and every navigation decision tied to it.
// The request executor reports a 401 here instead of redirecting itself,
// so login routing lives in exactly one place.
pub struct Session {
  store: TokenStore,
  state: Mutex<SessionState>,
  redirects: AtomicU64,
}

impl Session {
  pub fn new(store: TokenStore) -> Self {
    Self {
      store,
      state: Mutex::new(SessionState::Unauthenticated),
      redirects: AtomicU64::new(0),
    }
  }

  pub fn state(&self) -> SessionState {
    *self.state.lock().unwrap_or_else(|e| e.into_inner())
  }

  fn set_state(&self, next: SessionState) {
    *self.state.lock().unwrap_or_else(|e| e.into_inner()) = next;
  }

  pub fn token(&self) -> Option<String> {
    self.store.get()
  }

  // Page-level gate: no token means nothing protected renders.
  pub fn guard(&self) -> SessionState {
    self.set_state(SessionState::Checking);
    let next = if self.store.get().is_some() {
      SessionState::Authenticated
    } else {
      self.redirects.fetch_add(1, Ordering::SeqCst);
      SessionState::Redirecting
    };
    self.set_state(next);
    next
  }

  pub fn establish(&self, token: &str) -> std::io::Result<()> {
    self.store.set(token)?;
    self.set_state(SessionState::Authenticated);
    Ok(())
  }

  pub fn logout(&self) -> std::io::Result<()> {
    self.store.clear()?;
    self.set_state(SessionState::Unauthenticated);
    Ok(())
  }

  // The 401 path: drop the credential and route to login. One redirect is
  // recorded per call, even when the slot was already empty.
  pub fn expire(&self) {
    let _ = self.store.clear();
    self.redirect_to_login();
  }

  // Route to login without touching the credential. Used when a 2xx
  // response turns out not to carry an identity.
  pub fn redirect_to_login(&self) {
    self.redirects.fetch_add(1, Ordering::SeqCst);
    self.set_state(SessionState::Redirecting);
  }

  pub fn redirect_count(&self) -> u64 {
    self.redirects.load(Ordering::SeqCst)
  }

  // Consumed by the UI loop when it lands back on the login entry point.
  pub fn take_redirect(&self) -> bool {
    let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
    if *state == SessionState::Redirecting {
      *state = SessionState::Unauthenticated;
      true
    } else {
      false
    }
  }
}
