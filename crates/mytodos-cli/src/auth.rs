//! CLI identity provider wiring: token sources and the terminal navigator.

use std::io::{self, BufRead, IsTerminal, Write};

use mytodos_core::auth::{StaticTokenSource, TokenSource};
use mytodos_core::navigation::{Navigator, Route};
use mytodos_core::util::normalize_text_option;
use mytodos_core::{Error, Result};

/// Asks for a user access token on stdin; a blank answer cancels the login.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptTokenSource;

impl TokenSource for PromptTokenSource {
    async fn obtain_token(&self, scopes: &[&str]) -> Result<Option<String>> {
        let prompt = format!(
            "Paste a user access token with scopes [{}] (leave blank to cancel): ",
            scopes.join(", ")
        );

        tokio::task::spawn_blocking(move || read_token_line(&prompt))
            .await
            .map_err(|error| Error::Provider(error.to_string()))?
    }
}

fn read_token_line(prompt: &str) -> Result<Option<String>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        let mut stderr = io::stderr();
        stderr.write_all(prompt.as_bytes())?;
        stderr.flush()?;
    }

    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    Ok(normalize_text_option(Some(line)))
}

/// Token from `--token`/env when present, otherwise an interactive prompt.
#[derive(Debug, Clone)]
pub enum CliTokenSource {
    Provided(StaticTokenSource),
    Prompt(PromptTokenSource),
}

impl CliTokenSource {
    pub fn resolve(flag: Option<String>, env_value: Option<String>) -> Self {
        match normalize_text_option(flag).or_else(|| normalize_text_option(env_value)) {
            Some(token) => Self::Provided(StaticTokenSource::new(Some(token))),
            None => Self::Prompt(PromptTokenSource),
        }
    }
}

impl TokenSource for CliTokenSource {
    async fn obtain_token(&self, scopes: &[&str]) -> Result<Option<String>> {
        match self {
            Self::Provided(source) => source.obtain_token(scopes).await,
            Self::Prompt(source) => source.obtain_token(scopes).await,
        }
    }
}

/// Prints where the host would navigate; the CLI has no screen stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!("Navigating to {}", route);
        let user = route.payload();
        println!("{route}: new user {} ({})", display_name(&user.name), user.id);
        println!("{}", signup_hint(route.payload()));
    }
}

pub fn display_name(name: &str) -> &str {
    if name.trim().is_empty() {
        "(no name)"
    } else {
        name
    }
}

/// Command line that completes signup for `user`.
pub fn signup_hint(user: &mytodos_core::UserInfo) -> String {
    let mut hint = format!(
        "Finish signup with: mytodos signup --id {} --name {:?}",
        user.id, user.name
    );
    if let Some(birthday) = &user.birthday {
        hint.push_str(&format!(" --birthday {birthday:?}"));
    }
    if let Some(image_url) = &user.image_url {
        hint.push_str(&format!(" --image-url {image_url:?}"));
    }
    hint
}
