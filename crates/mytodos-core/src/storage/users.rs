//! Typed access to the known-users roster and the current-user record.

use crate::error::Result;
use crate::models::{parse_known_users, render_known_users, UserInfo};

use super::KeyValueStore;

/// Key holding the serialized list of users seen on this device.
pub const KNOWN_USERS_KEY: &str = "@users";
/// Key holding the serialized active user.
pub const CURRENT_USER_KEY: &str = "@currentUser";

/// User roster backed by any `KeyValueStore`.
#[derive(Debug, Clone)]
pub struct LocalUserStore<S> {
    store: S,
}

impl<S: KeyValueStore> LocalUserStore<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub const fn inner(&self) -> &S {
        &self.store
    }

    /// Raw `@users` payload; `None` when no user was ever stored on this device.
    pub async fn known_users_raw(&self) -> Result<Option<String>> {
        self.store.get(KNOWN_USERS_KEY).await
    }

    pub async fn known_users(&self) -> Result<Vec<UserInfo>> {
        match self.known_users_raw().await? {
            Some(raw) => parse_known_users(&raw),
            None => Ok(Vec::new()),
        }
    }

    pub async fn current_user(&self) -> Result<Option<UserInfo>> {
        let Some(raw) = self.store.get(CURRENT_USER_KEY).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Overwrite the current-user record wholesale.
    pub async fn set_current_user(&self, user: &UserInfo) -> Result<()> {
        let serialized = serde_json::to_string(user)?;
        self.store.set(CURRENT_USER_KEY, &serialized).await
    }

    pub async fn clear_current_user(&self) -> Result<()> {
        self.store.remove(CURRENT_USER_KEY).await
    }

    /// Complete a signup: upsert `user` into the roster by id, then make it current.
    ///
    /// An existing record with the same id is replaced in place, so the roster
    /// never holds two entries for one id.
    pub async fn register_user(&self, user: &UserInfo) -> Result<()> {
        let mut users = self.known_users().await?;
        if let Some(existing) = users.iter_mut().find(|known| known.id == user.id) {
            *existing = user.clone();
        } else {
            users.push(user.clone());
        }

        let serialized = render_known_users(&users)?;
        self.store.set(KNOWN_USERS_KEY, &serialized).await?;
        self.set_current_user(user).await?;
        tracing::info!("Registered user {} ({} known)", user.id, users.len());
        Ok(())
    }
}
