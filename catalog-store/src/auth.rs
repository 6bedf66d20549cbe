//! Authentication state provider.
//!
//! Exposes the signed-in state to views through a watch channel. Token
//! issuance happens elsewhere; this store only records the outcome.

use catalog_core::AuthState;
use tokio::sync::watch;
use tracing::info;

/// Observable authentication state.
#[derive(Debug)]
pub struct AuthStore {
    state: watch::Sender<AuthState>,
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new(AuthState::anonymous())
    }
}

impl AuthStore {
    /// Creates a store with the given initial state.
    pub fn new(initial: AuthState) -> Self {
        let (state, _) = watch::channel(initial);
        Self { state }
    }

    /// Returns the current state.
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Returns true if a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    /// Records a successful sign-in.
    pub fn sign_in(&self, username: impl Into<String>) {
        let username = username.into();
        info!(username = %username, "Signed in");
        self.state.send_replace(AuthState::signed_in(username));
    }

    /// Records a sign-out.
    pub fn sign_out(&self) {
        info!("Signed out");
        self.state.send_replace(AuthState::anonymous());
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}
