//! Session snapshot and transition actions

use serde::{Deserialize, Serialize};
use topfive_api::User;

/// In-memory record of the current authentication status and identity.
///
/// `logged_in` with no `user` is a guest session; `user` is never retained in
/// a logged-out value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<User>,
    pub logged_in: bool,
}

/// The closed set of transitions. Every kind reduces to a full overwrite of
/// the session value, never a partial merge, so re-applying an action is a
/// no-op.
#[derive(Debug, Clone)]
pub enum AuthAction {
    /// Apply the server-reported pair from the session probe verbatim.
    GetLoggedIn { user: Option<User>, logged_in: bool },
    /// Enter the authenticated state. `user: None` is a guest session.
    SetLoggedIn { user: Option<User> },
    /// Return to the anonymous state.
    SetLoggedOut,
    /// First transition after account creation.
    RegisterUser { user: User },
}

impl Session {
    pub fn anonymous() -> Self {
        Self {
            user: None,
            logged_in: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.logged_in
    }

    pub fn is_guest(&self) -> bool {
        self.logged_in && self.user.is_none()
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }

    /// Reduce an action to the next session value. The match is total over
    /// the closed action set.
    pub fn reduce(&self, action: AuthAction) -> Session {
        match action {
            AuthAction::GetLoggedIn { user, logged_in } => Session {
                // A logged-out report never retains an identity.
                user: if logged_in { user } else { None },
                logged_in,
            },
            AuthAction::SetLoggedIn { user } => Session {
                user,
                logged_in: true,
            },
            AuthAction::SetLoggedOut => Session::anonymous(),
            AuthAction::RegisterUser { user } => Session {
                user: Some(user),
                logged_in: true,
            },
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}
