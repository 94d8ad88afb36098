//! Session resolution: recognise a returning user from the local roster.

use crate::error::Result;
use crate::models::{parse_known_users, UserInfo};
use crate::state::UserInfoContext;
use crate::storage::{KeyValueStore, LocalUserStore};

/// Whether the fetched principal has been seen on this device before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionDecision {
    NewUser,
    ReturningUser,
}

/// Decide from the raw `@users` payload whether `fetched_id` is known.
///
/// An absent payload means no user was ever stored on this device. A payload
/// that is not a JSON list of user records is an error.
pub fn resolve(known_users_raw: Option<&str>, fetched_id: &str) -> Result<SessionDecision> {
    let Some(raw) = known_users_raw else {
        return Ok(SessionDecision::NewUser);
    };

    let known = parse_known_users(raw)?;
    if known.iter().any(|user| user.id == fetched_id) {
        Ok(SessionDecision::ReturningUser)
    } else {
        Ok(SessionDecision::NewUser)
    }
}

/// Terminal state of a resolved session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Unknown on this device; the host should collect signup details.
    SignupRequired(UserInfo),
    /// Known user; persisted as current and published to the context.
    Resumed(UserInfo),
}

/// Applies a `SessionDecision` against the local store and app context.
pub struct SessionResolver<'a, S> {
    users: &'a LocalUserStore<S>,
    context: &'a UserInfoContext,
}

impl<'a, S: KeyValueStore> SessionResolver<'a, S> {
    pub const fn new(users: &'a LocalUserStore<S>, context: &'a UserInfoContext) -> Self {
        Self { users, context }
    }

    /// Resolve `user` (freshly built from the provider) against `known_users_raw`.
    ///
    /// A returning user's fresh fields replace whatever was stored before.
    pub async fn resolve_session(
        &self,
        known_users_raw: Option<&str>,
        user: UserInfo,
    ) -> Result<Resolution> {
        match resolve(known_users_raw, &user.id)? {
            SessionDecision::NewUser => {
                tracing::debug!("User {} is not known on this device", user.id);
                Ok(Resolution::SignupRequired(user))
            }
            SessionDecision::ReturningUser => {
                self.users.set_current_user(&user).await?;
                self.context.update_user_info(user.clone());
                Ok(Resolution::Resumed(user))
            }
        }
    }
}
