//! Navigation boundary between the login flow and the host's screen stack.

use std::fmt;

use crate::models::UserInfo;

/// Screens the login flow can route to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Account creation, prefilled with the freshly fetched profile
    Signup(UserInfo),
}

impl Route {
    /// Screen name as registered with the host navigator.
    pub const fn screen_name(&self) -> &'static str {
        match self {
            Self::Signup(_) => "Signup",
        }
    }

    pub const fn payload(&self) -> &UserInfo {
        match self {
            Self::Signup(user) => user,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.screen_name())
    }
}

/// Host navigator.
pub trait Navigator {
    fn navigate(&self, route: Route);
}
