use std::path::Path;

use mytodos_core::auth::TokenIdentityProvider;
use mytodos_core::config::{AppConfig, ENV_ACCESS_TOKEN};
use mytodos_core::db::LibSqlKeyValueRepository;
use mytodos_core::graph::GraphClient;
use mytodos_core::state::UserInfoContext;
use mytodos_core::storage::LocalUserStore;
use mytodos_core::{LoginController, LoginOutcome};

use crate::auth::{display_name, CliTokenSource, TerminalNavigator};
use crate::commands::common::open_database;
use crate::error::CliError;

pub async fn run_login(
    token: Option<String>,
    config: &AppConfig,
    db_path: &Path,
) -> Result<(), CliError> {
    let graph = GraphClient::new(config.graph_api_url(), config.graph_api_version())?;
    let source = CliTokenSource::resolve(token, std::env::var(ENV_ACCESS_TOKEN).ok());
    let provider = TokenIdentityProvider::new(source, graph.clone());

    let db = open_database(db_path).await?;
    let users = LocalUserStore::new(LibSqlKeyValueRepository::new(db.connection()));

    let mut controller = LoginController::new(
        provider,
        graph,
        users,
        UserInfoContext::new(),
        TerminalNavigator,
    );

    match controller.login().await {
        LoginOutcome::Resumed(user) => {
            println!("Signed in as {} ({})", display_name(&user.name), user.id);
            Ok(())
        }
        // TerminalNavigator already printed the signup route.
        LoginOutcome::SignupRequired(_) => Ok(()),
        _ => Err(CliError::Login(controller.status().message.clone())),
    }
}
