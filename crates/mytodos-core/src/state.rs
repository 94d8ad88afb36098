//! Application-wide user-info state.

use std::sync::Arc;

use tokio::sync::watch;

use crate::models::UserInfo;

/// Shared handle to the signed-in user, passed explicitly to whoever updates
/// or observes it. Clones share the same state.
#[derive(Debug, Clone)]
pub struct UserInfoContext {
    sender: Arc<watch::Sender<Option<UserInfo>>>,
}

impl Default for UserInfoContext {
    fn default() -> Self {
        Self::new()
    }
}

impl UserInfoContext {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publish `user` to every observer.
    pub fn update_user_info(&self, user: UserInfo) {
        tracing::debug!("Publishing user info for {}", user.id);
        self.sender.send_replace(Some(user));
    }

    pub fn clear(&self) {
        self.sender.send_replace(None);
    }

    #[must_use]
    pub fn user_info(&self) -> Option<UserInfo> {
        self.sender.borrow().clone()
    }

    /// Observe future updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<UserInfo>> {
        self.sender.subscribe()
    }
}
