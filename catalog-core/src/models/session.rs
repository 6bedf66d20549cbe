//! Authentication state as seen by the presentation layer.

use serde::{Deserialize, Serialize};

/// Snapshot of the current authentication state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    /// Whether a user is signed in.
    pub is_authenticated: bool,
    /// Signed-in user name, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl AuthState {
    /// An anonymous session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A signed-in session.
    pub fn signed_in(username: impl Into<String>) -> Self {
        Self {
            is_authenticated: true,
            username: Some(username.into()),
        }
    }
}
