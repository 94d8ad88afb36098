//! MyTodos CLI - sign in with a social account from the terminal
//!
//! Runs the same login flow as the mobile Login screen against a local store.

mod auth;
mod cli;
mod commands;
mod error;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::common::{load_config, resolve_db_path};
use crate::commands::login::run_login;
use crate::commands::logout::run_logout;
use crate::commands::signup::{run_signup, SignupArgs};
use crate::commands::users::{run_users, run_whoami};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "mytodos=info".parse::<tracing_subscriber::filter::Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let db_path = resolve_db_path(cli.db_path, &config);

    match cli.command {
        Commands::Login { token } => run_login(token, &config, &db_path).await?,
        Commands::Signup {
            id,
            name,
            birthday,
            image_url,
        } => {
            let args = SignupArgs {
                id,
                name,
                birthday,
                image_url,
            };
            run_signup(args, &db_path).await?;
        }
        Commands::Whoami { json } => run_whoami(json, &db_path).await?,
        Commands::Users { json } => run_users(json, &db_path).await?,
        Commands::Logout => run_logout(&db_path).await?,
    }

    Ok(())
}
