use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mytodos")]
#[command(about = "Sign in to MyTodos with your social account")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Optional path to config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with a provider user access token
    Login {
        /// User access token (falls back to MYTODOS_ACCESS_TOKEN, then a prompt)
        #[arg(long, value_name = "TOKEN")]
        token: Option<String>,
    },
    /// Finish signup for a new user and make it the current user
    Signup {
        /// Provider user id
        #[arg(long)]
        id: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Birthday as reported by the provider
        #[arg(long)]
        birthday: Option<String>,
        /// Profile picture URL
        #[arg(long, value_name = "URL")]
        image_url: Option<String>,
    },
    /// Show the current user
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List users known on this device
    Users {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Forget the current user (known users are kept)
    Logout,
}
