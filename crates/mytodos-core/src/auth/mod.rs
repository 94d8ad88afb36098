//! Identity provider seam for the social login handshake.

use std::fmt;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::graph::GraphClient;
use crate::util::normalize_text_option;

/// The only scope the login screen asks for.
pub const PUBLIC_PROFILE_SCOPE: &str = "public_profile";

/// Short-lived credential returned by the identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("AccessToken([REDACTED])")
    }
}

/// Result of the interactive login handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginResponse {
    pub is_cancelled: bool,
}

impl LoginResponse {
    pub const fn completed() -> Self {
        Self {
            is_cancelled: false,
        }
    }

    pub const fn cancelled() -> Self {
        Self { is_cancelled: true }
    }
}

/// Profile data the provider keeps for the signed-in principal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderProfile {
    pub image_url: Option<String>,
}

/// External identity provider consumed by the login flow.
#[allow(async_fn_in_trait)]
pub trait IdentityProvider {
    /// Run the login handshake, suspending until the user completes or cancels it.
    async fn log_in_with_permissions(&self, scopes: &[&str]) -> Result<LoginResponse>;

    /// Credential produced by the last successful handshake.
    async fn current_access_token(&self) -> Result<Option<AccessToken>>;

    /// Provider-side profile of the signed-in principal.
    async fn current_profile(&self) -> Result<Option<ProviderProfile>>;
}

/// Where a `TokenIdentityProvider` obtains a user access token.
///
/// Returning `Ok(None)` means the user declined to provide one.
#[allow(async_fn_in_trait)]
pub trait TokenSource {
    async fn obtain_token(&self, scopes: &[&str]) -> Result<Option<String>>;
}

/// Token source with a fixed answer (flag, env var, tests).
#[derive(Debug, Clone, Default)]
pub struct StaticTokenSource {
    token: Option<String>,
}

impl StaticTokenSource {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: normalize_text_option(token),
        }
    }
}

impl TokenSource for StaticTokenSource {
    async fn obtain_token(&self, _scopes: &[&str]) -> Result<Option<String>> {
        Ok(self.token.clone())
    }
}

/// Identity provider for hosts without a native login SDK.
///
/// The handshake consists of obtaining a user access token from a
/// `TokenSource`; an empty answer is treated as a cancelled login. The
/// provider profile (picture URL) is read back through the Graph API.
pub struct TokenIdentityProvider<T> {
    source: T,
    graph: GraphClient,
    token: Mutex<Option<AccessToken>>,
}

impl<T: TokenSource> TokenIdentityProvider<T> {
    pub const fn new(source: T, graph: GraphClient) -> Self {
        Self {
            source,
            graph,
            token: Mutex::new(None),
        }
    }

    fn stored_token(&self) -> Result<Option<AccessToken>> {
        let guard = self
            .token
            .lock()
            .map_err(|error| Error::Provider(error.to_string()))?;
        Ok(guard.clone())
    }

    fn store_token(&self, token: Option<AccessToken>) -> Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|error| Error::Provider(error.to_string()))?;
        *guard = token;
        Ok(())
    }
}

impl<T: TokenSource> IdentityProvider for TokenIdentityProvider<T> {
    async fn log_in_with_permissions(&self, scopes: &[&str]) -> Result<LoginResponse> {
        let token = normalize_text_option(self.source.obtain_token(scopes).await?);
        match token {
            Some(token) => {
                self.store_token(Some(AccessToken::new(token)))?;
                Ok(LoginResponse::completed())
            }
            None => {
                self.store_token(None)?;
                Ok(LoginResponse::cancelled())
            }
        }
    }

    async fn current_access_token(&self) -> Result<Option<AccessToken>> {
        self.stored_token()
    }

    async fn current_profile(&self) -> Result<Option<ProviderProfile>> {
        let Some(token) = self.stored_token()? else {
            return Ok(None);
        };
        let image_url = self.graph.fetch_picture_url(token.as_str()).await?;
        Ok(Some(ProviderProfile { image_url }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(token: Option<&str>) -> TokenIdentityProvider<StaticTokenSource> {
        let graph = GraphClient::new("http://127.0.0.1:9", "v19.0").unwrap();
        TokenIdentityProvider::new(StaticTokenSource::new(token.map(str::to_string)), graph)
    }

    #[test]
    fn access_token_debug_redacts_value() {
        let token = AccessToken::new("EAAB-secret");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("EAAB-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn blank_token_is_a_cancelled_login() {
        let provider = provider(Some("   "));
        let response = provider
            .log_in_with_permissions(&[PUBLIC_PROFILE_SCOPE])
            .await
            .unwrap();

        assert!(response.is_cancelled);
        assert_eq!(provider.current_access_token().await.unwrap(), None);
        assert_eq!(provider.current_profile().await.unwrap(), None);
    }

    #[tokio::test]
    async fn provided_token_becomes_current() {
        let provider = provider(Some(" EAAB-token "));
        let response = provider
            .log_in_with_permissions(&[PUBLIC_PROFILE_SCOPE])
            .await
            .unwrap();

        assert!(!response.is_cancelled);
        assert_eq!(
            provider.current_access_token().await.unwrap(),
            Some(AccessToken::new("EAAB-token"))
        );
    }
}
