//! Login screen controller: social login, profile bootstrap, session routing.
//!
//! `LoginController::login` runs the whole flow sequentially:
//!
//! 1. login handshake with the identity provider (`public_profile` scope),
//! 2. `/me` profile request with the returned credential,
//! 3. session resolution against the local user roster, ending either in a
//!    Signup navigation or in a resumed session.
//!
//! Every failure ends the attempt and is surfaced through `LoginStatus`;
//! nothing is retried.

use crate::auth::{IdentityProvider, PUBLIC_PROFILE_SCOPE};
use crate::error::Result;
use crate::graph::{ProfileFetchResult, ProfileFetcher, PROFILE_FIELDS};
use crate::models::UserInfo;
use crate::navigation::{Navigator, Route};
use crate::session::{Resolution, SessionResolver};
use crate::state::UserInfoContext;
use crate::storage::{KeyValueStore, LocalUserStore};

pub const LOGIN_CANCELLED_MESSAGE: &str = "Login Cancelled";
pub const PROFILE_ERROR_MESSAGE: &str = "Login info has an error";
pub const EMAIL_REQUIRED_MESSAGE: &str = "Error: email access is needed";
pub const CREDENTIAL_UNAVAILABLE_MESSAGE: &str = "Error: access token is unavailable";

/// Transient error banner state read by the rendering layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginStatus {
    pub error: bool,
    pub message: String,
}

impl LoginStatus {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
        }
    }
}

/// How a login attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The user backed out of the provider login or the profile request
    Cancelled,
    /// The handshake completed without leaving a credential behind
    CredentialUnavailable,
    /// The profile request failed
    ProfileError(String),
    /// The provider did not share the user's email
    MissingEmail,
    /// Unknown user; routed to Signup with this record
    SignupRequired(UserInfo),
    /// Known user; persisted as current and published
    Resumed(UserInfo),
    /// Anything else (storage, parse, network)
    Failed(String),
}

impl LoginOutcome {
    /// Banner state for this outcome.
    pub fn status(&self) -> LoginStatus {
        match self {
            Self::Cancelled => LoginStatus::failed(LOGIN_CANCELLED_MESSAGE),
            Self::CredentialUnavailable => LoginStatus::failed(CREDENTIAL_UNAVAILABLE_MESSAGE),
            Self::ProfileError(_) => LoginStatus::failed(PROFILE_ERROR_MESSAGE),
            Self::MissingEmail => LoginStatus::failed(EMAIL_REQUIRED_MESSAGE),
            Self::Failed(details) => LoginStatus::failed(format!("Error: {details}")),
            Self::SignupRequired(_) | Self::Resumed(_) => LoginStatus::default(),
        }
    }
}

/// Orchestrates the login flow for one screen.
pub struct LoginController<P, F, S, N> {
    provider: P,
    fetcher: F,
    users: LocalUserStore<S>,
    context: UserInfoContext,
    navigator: N,
    status: LoginStatus,
}

impl<P, F, S, N> LoginController<P, F, S, N>
where
    P: IdentityProvider,
    F: ProfileFetcher,
    S: KeyValueStore,
    N: Navigator,
{
    pub fn new(
        provider: P,
        fetcher: F,
        users: LocalUserStore<S>,
        context: UserInfoContext,
        navigator: N,
    ) -> Self {
        Self {
            provider,
            fetcher,
            users,
            context,
            navigator,
            status: LoginStatus::default(),
        }
    }

    pub const fn status(&self) -> &LoginStatus {
        &self.status
    }

    pub const fn users(&self) -> &LocalUserStore<S> {
        &self.users
    }

    pub const fn context(&self) -> &UserInfoContext {
        &self.context
    }

    pub const fn navigator(&self) -> &N {
        &self.navigator
    }

    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Run one login attempt. Errors never escape; they end up in `status()`.
    pub async fn login(&mut self) -> LoginOutcome {
        self.status = LoginStatus::default();

        let outcome = match self.run().await {
            Ok(outcome) => outcome,
            Err(error) => LoginOutcome::Failed(error.to_string()),
        };

        self.status = outcome.status();
        match &outcome {
            LoginOutcome::Resumed(user) => tracing::info!("Resumed session for user {}", user.id),
            LoginOutcome::SignupRequired(user) => {
                tracing::info!("User {} routed to signup", user.id);
            }
            _ => tracing::warn!("Login ended: {}", self.status.message),
        }
        outcome
    }

    async fn run(&self) -> Result<LoginOutcome> {
        let response = self
            .provider
            .log_in_with_permissions(&[PUBLIC_PROFILE_SCOPE])
            .await?;
        if response.is_cancelled {
            return Ok(LoginOutcome::Cancelled);
        }

        let Some(token) = self.provider.current_access_token().await? else {
            return Ok(LoginOutcome::CredentialUnavailable);
        };
        tracing::debug!("Provider login completed");

        self.bootstrap_profile(token.as_str()).await
    }

    async fn bootstrap_profile(&self, token: &str) -> Result<LoginOutcome> {
        let profile = match self.fetcher.fetch_profile(token, &PROFILE_FIELDS).await {
            ProfileFetchResult::Profile(profile) => profile,
            ProfileFetchResult::Error(details) => {
                tracing::debug!("Profile request failed: {}", details);
                return Ok(LoginOutcome::ProfileError(details));
            }
            ProfileFetchResult::Cancelled => return Ok(LoginOutcome::Cancelled),
        };

        if !profile.has_email_field() {
            return Ok(LoginOutcome::MissingEmail);
        }

        let known_users_raw = self.users.known_users_raw().await?;
        let image_url = self
            .provider
            .current_profile()
            .await?
            .and_then(|provider_profile| provider_profile.image_url);

        let user = UserInfo {
            id: profile.id,
            name: profile.name.unwrap_or_default(),
            birthday: profile.birthday,
            image_url,
        };

        let resolver = SessionResolver::new(&self.users, &self.context);
        match resolver
            .resolve_session(known_users_raw.as_deref(), user)
            .await?
        {
            Resolution::SignupRequired(user) => {
                self.navigator.navigate(Route::Signup(user.clone()));
                Ok(LoginOutcome::SignupRequired(user))
            }
            Resolution::Resumed(user) => Ok(LoginOutcome::Resumed(user)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::auth::{
        AccessToken, LoginResponse, ProviderProfile, StaticTokenSource, TokenIdentityProvider,
    };
    use crate::error::Error;
    use crate::graph::{GraphClient, GraphProfile};
    use crate::storage::{MemoryKeyValueStore, CURRENT_USER_KEY, KNOWN_USERS_KEY};

    const IMAGE_URL: &str = "https://cdn.example.com/42.png";

    struct FakeProvider {
        cancelled: bool,
        token: Option<&'static str>,
        login_error: Option<&'static str>,
        logins: Cell<usize>,
        requested_scopes: RefCell<Vec<String>>,
    }

    impl FakeProvider {
        fn signed_in() -> Self {
            Self {
                cancelled: false,
                token: Some("EAAB-token"),
                login_error: None,
                logins: Cell::new(0),
                requested_scopes: RefCell::new(Vec::new()),
            }
        }

        fn cancelled() -> Self {
            Self {
                cancelled: true,
                token: None,
                ..Self::signed_in()
            }
        }
    }

    impl IdentityProvider for FakeProvider {
        async fn log_in_with_permissions(&self, scopes: &[&str]) -> Result<LoginResponse> {
            self.logins.set(self.logins.get() + 1);
            *self.requested_scopes.borrow_mut() = scopes.iter().map(ToString::to_string).collect();
            if let Some(message) = self.login_error {
                return Err(Error::Provider(message.to_string()));
            }
            Ok(LoginResponse {
                is_cancelled: self.cancelled,
            })
        }

        async fn current_access_token(&self) -> Result<Option<AccessToken>> {
            Ok(self.token.map(AccessToken::new))
        }

        async fn current_profile(&self) -> Result<Option<ProviderProfile>> {
            Ok(Some(ProviderProfile {
                image_url: Some(IMAGE_URL.to_string()),
            }))
        }
    }

    struct FakeFetcher {
        result: ProfileFetchResult,
        seen_fields: RefCell<Vec<String>>,
    }

    impl FakeFetcher {
        fn returning(result: ProfileFetchResult) -> Self {
            Self {
                result,
                seen_fields: RefCell::new(Vec::new()),
            }
        }

        fn profile(id: &str, email: Option<&str>) -> Self {
            Self::returning(ProfileFetchResult::Profile(GraphProfile {
                id: id.to_string(),
                name: Some("Ann R.".to_string()),
                first_name: Some("Ann".to_string()),
                last_name: Some("R.".to_string()),
                birthday: Some("01/01".to_string()),
                email: email.map(|email| Some(email.to_string())),
            }))
        }
    }

    impl ProfileFetcher for FakeFetcher {
        async fn fetch_profile(&self, _token: &str, fields: &[&str]) -> ProfileFetchResult {
            *self.seen_fields.borrow_mut() = fields.iter().map(ToString::to_string).collect();
            self.result.clone()
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        routes: RefCell<Vec<Route>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, route: Route) {
            self.routes.borrow_mut().push(route);
        }
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::Storage("disk unavailable".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Storage("disk unavailable".to_string()))
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            Err(Error::Storage("disk unavailable".to_string()))
        }
    }

    type TestController<S> = LoginController<FakeProvider, FakeFetcher, S, RecordingNavigator>;

    fn controller<S: KeyValueStore>(
        provider: FakeProvider,
        fetcher: FakeFetcher,
        store: S,
    ) -> TestController<S> {
        LoginController::new(
            provider,
            fetcher,
            LocalUserStore::new(store),
            UserInfoContext::new(),
            RecordingNavigator::default(),
        )
    }

    fn expected_user(id: &str) -> UserInfo {
        UserInfo::new(id, "Ann R.")
            .with_birthday(Some("01/01".to_string()))
            .with_image_url(Some(IMAGE_URL.to_string()))
    }

    #[tokio::test]
    async fn first_user_on_device_is_routed_to_signup() {
        let store = MemoryKeyValueStore::new();
        let mut login = controller(
            FakeProvider::signed_in(),
            FakeFetcher::profile("42", Some("a@x.com")),
            store.clone(),
        );

        let outcome = login.login().await;

        assert_eq!(outcome, LoginOutcome::SignupRequired(expected_user("42")));
        assert_eq!(
            *login.navigator().routes.borrow(),
            vec![Route::Signup(expected_user("42"))]
        );
        assert_eq!(login.status(), &LoginStatus::default());
        assert!(store.keys().unwrap().is_empty());
        assert_eq!(login.context().user_info(), None);
    }

    #[tokio::test]
    async fn returning_user_is_resumed_without_navigation() {
        let store =
            MemoryKeyValueStore::with_entries([(KNOWN_USERS_KEY, r#"[{"id":"42","name":"Ann"}]"#)]);
        let mut login = controller(
            FakeProvider::signed_in(),
            FakeFetcher::profile("42", Some("a@x.com")),
            store.clone(),
        );

        let outcome = login.login().await;

        assert_eq!(outcome, LoginOutcome::Resumed(expected_user("42")));
        assert!(login.navigator().routes.borrow().is_empty());
        assert_eq!(
            store.get(CURRENT_USER_KEY).await.unwrap().as_deref(),
            Some(
                r#"{"id":"42","name":"Ann R.","birthday":"01/01","imageURL":"https://cdn.example.com/42.png"}"#
            )
        );
        assert_eq!(login.context().user_info(), Some(expected_user("42")));
        assert_eq!(
            store.get(KNOWN_USERS_KEY).await.unwrap().as_deref(),
            Some(r#"[{"id":"42","name":"Ann"}]"#)
        );
    }

    #[tokio::test]
    async fn unknown_user_with_populated_roster_is_routed_to_signup() {
        let store =
            MemoryKeyValueStore::with_entries([(KNOWN_USERS_KEY, r#"[{"id":"7","name":"Bo"}]"#)]);
        let mut login = controller(
            FakeProvider::signed_in(),
            FakeFetcher::profile("42", Some("a@x.com")),
            store.clone(),
        );

        let outcome = login.login().await;

        assert_eq!(outcome, LoginOutcome::SignupRequired(expected_user("42")));
        assert_eq!(login.navigator().routes.borrow().len(), 1);
        assert_eq!(store.get(CURRENT_USER_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn cancelled_provider_login_stops_the_flow() {
        let store =
            MemoryKeyValueStore::with_entries([(KNOWN_USERS_KEY, r#"[{"id":"42","name":"Ann"}]"#)]);
        let mut login = controller(
            FakeProvider::cancelled(),
            FakeFetcher::profile("42", Some("a@x.com")),
            store.clone(),
        );

        let outcome = login.login().await;

        assert_eq!(outcome, LoginOutcome::Cancelled);
        assert_eq!(
            login.status(),
            &LoginStatus {
                error: true,
                message: "Login Cancelled".to_string(),
            }
        );
        assert!(login.navigator().routes.borrow().is_empty());
        assert_eq!(store.keys().unwrap(), vec![KNOWN_USERS_KEY.to_string()]);
        assert!(login.fetcher.seen_fields.borrow().is_empty());
    }

    #[tokio::test]
    async fn cancelled_profile_request_reports_cancellation() {
        let store =
            MemoryKeyValueStore::with_entries([(KNOWN_USERS_KEY, r#"[{"id":"42","name":"Ann"}]"#)]);
        let mut login = controller(
            FakeProvider::signed_in(),
            FakeFetcher::returning(ProfileFetchResult::Cancelled),
            store.clone(),
        );

        let outcome = login.login().await;

        assert_eq!(outcome, LoginOutcome::Cancelled);
        assert_eq!(
            login.status(),
            &LoginStatus {
                error: true,
                message: "Login Cancelled".to_string(),
            }
        );
        assert!(login.navigator().routes.borrow().is_empty());
        assert_eq!(store.keys().unwrap(), vec![KNOWN_USERS_KEY.to_string()]);
    }

    #[tokio::test]
    async fn missing_email_blocks_login() {
        let store =
            MemoryKeyValueStore::with_entries([(KNOWN_USERS_KEY, r#"[{"id":"42","name":"Ann"}]"#)]);
        let mut login = controller(
            FakeProvider::signed_in(),
            FakeFetcher::profile("42", None),
            store.clone(),
        );

        let outcome = login.login().await;

        assert_eq!(outcome, LoginOutcome::MissingEmail);
        assert_eq!(login.status().message, "Error: email access is needed");
        assert!(login.status().error);
        assert_eq!(store.get(CURRENT_USER_KEY).await.unwrap(), None);
        assert!(login.navigator().routes.borrow().is_empty());
    }

    #[tokio::test]
    async fn null_email_field_is_not_treated_as_missing() {
        let mut login = controller(
            FakeProvider::signed_in(),
            FakeFetcher::returning(ProfileFetchResult::Profile(GraphProfile {
                id: "42".to_string(),
                name: Some("Ann R.".to_string()),
                birthday: Some("01/01".to_string()),
                email: Some(None),
                ..GraphProfile::default()
            })),
            MemoryKeyValueStore::new(),
        );

        let outcome = login.login().await;

        assert_eq!(outcome, LoginOutcome::SignupRequired(expected_user("42")));
        assert_eq!(login.status(), &LoginStatus::default());
    }

    #[tokio::test]
    async fn failed_picture_lookup_keeps_token_out_of_banner() {
        let graph = GraphClient::new("http://127.0.0.1:9", "v19.0").unwrap();
        let provider = TokenIdentityProvider::new(
            StaticTokenSource::new(Some("SECRETTOKEN123".to_string())),
            graph,
        );
        let mut login = LoginController::new(
            provider,
            FakeFetcher::profile("42", Some("a@x.com")),
            LocalUserStore::new(MemoryKeyValueStore::new()),
            UserInfoContext::new(),
            RecordingNavigator::default(),
        );

        let outcome = login.login().await;

        assert!(matches!(outcome, LoginOutcome::Failed(_)));
        assert!(login.status().error);
        assert!(login.status().message.starts_with("Error: HTTP request failed"));
        assert!(!login.status().message.contains("SECRETTOKEN123"));
    }

    #[tokio::test]
    async fn profile_error_shows_generic_message() {
        let mut login = controller(
            FakeProvider::signed_in(),
            FakeFetcher::returning(ProfileFetchResult::Error("OAuthException".to_string())),
            MemoryKeyValueStore::new(),
        );

        let outcome = login.login().await;

        assert_eq!(
            outcome,
            LoginOutcome::ProfileError("OAuthException".to_string())
        );
        assert_eq!(login.status().message, "Login info has an error");
    }

    #[tokio::test]
    async fn missing_credential_is_surfaced() {
        let provider = FakeProvider {
            token: None,
            ..FakeProvider::signed_in()
        };
        let mut login = controller(
            provider,
            FakeFetcher::profile("42", Some("a@x.com")),
            MemoryKeyValueStore::new(),
        );

        let outcome = login.login().await;

        assert_eq!(outcome, LoginOutcome::CredentialUnavailable);
        assert_eq!(login.status().message, CREDENTIAL_UNAVAILABLE_MESSAGE);
        assert!(login.fetcher.seen_fields.borrow().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_is_caught() {
        let provider = FakeProvider {
            login_error: Some("SDK not initialised"),
            ..FakeProvider::signed_in()
        };
        let mut login = controller(
            provider,
            FakeFetcher::profile("42", Some("a@x.com")),
            MemoryKeyValueStore::new(),
        );

        let outcome = login.login().await;

        assert!(matches!(outcome, LoginOutcome::Failed(_)));
        assert_eq!(
            login.status().message,
            "Error: Identity provider error: SDK not initialised"
        );
    }

    #[tokio::test]
    async fn storage_failure_is_caught() {
        let mut login = controller(
            FakeProvider::signed_in(),
            FakeFetcher::profile("42", Some("a@x.com")),
            BrokenStore,
        );

        let outcome = login.login().await;

        assert_eq!(
            outcome,
            LoginOutcome::Failed("Storage error: disk unavailable".to_string())
        );
        assert_eq!(
            login.status(),
            &LoginStatus {
                error: true,
                message: "Error: Storage error: disk unavailable".to_string(),
            }
        );
        assert!(login.navigator().routes.borrow().is_empty());
    }

    #[tokio::test]
    async fn malformed_roster_is_caught() {
        let store = MemoryKeyValueStore::with_entries([(KNOWN_USERS_KEY, "not json")]);
        let mut login = controller(
            FakeProvider::signed_in(),
            FakeFetcher::profile("42", Some("a@x.com")),
            store,
        );

        let outcome = login.login().await;

        assert!(matches!(outcome, LoginOutcome::Failed(_)));
        assert!(login.status().message.starts_with("Error: Serialization error"));
    }

    #[tokio::test]
    async fn repeated_returning_login_is_stable() {
        let store =
            MemoryKeyValueStore::with_entries([(KNOWN_USERS_KEY, r#"[{"id":"42","name":"Ann"}]"#)]);
        let mut login = controller(
            FakeProvider::signed_in(),
            FakeFetcher::profile("42", Some("a@x.com")),
            store.clone(),
        );

        login.login().await;
        let first = store.get(CURRENT_USER_KEY).await.unwrap();
        login.login().await;
        let second = store.get(CURRENT_USER_KEY).await.unwrap();

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(
            store.get(KNOWN_USERS_KEY).await.unwrap().as_deref(),
            Some(r#"[{"id":"42","name":"Ann"}]"#)
        );
        assert_eq!(login.provider().logins.get(), 2);
    }

    #[tokio::test]
    async fn new_attempt_clears_previous_error() {
        let store =
            MemoryKeyValueStore::with_entries([(KNOWN_USERS_KEY, r#"[{"id":"42","name":"Ann"}]"#)]);
        let mut login = controller(
            FakeProvider::signed_in(),
            FakeFetcher::profile("42", Some("a@x.com")),
            store,
        );
        login.status = LoginStatus::failed(LOGIN_CANCELLED_MESSAGE);

        login.login().await;

        assert_eq!(login.status(), &LoginStatus::default());
    }

    #[tokio::test]
    async fn requests_public_profile_and_fixed_fields() {
        let mut login = controller(
            FakeProvider::signed_in(),
            FakeFetcher::profile("42", Some("a@x.com")),
            MemoryKeyValueStore::new(),
        );

        login.login().await;

        assert_eq!(
            *login.provider().requested_scopes.borrow(),
            vec!["public_profile".to_string()]
        );
        assert_eq!(
            *login.fetcher.seen_fields.borrow(),
            vec!["name", "first_name", "last_name", "birthday", "email"]
        );
    }
}
