use std::path::Path;

use mytodos_core::db::LibSqlKeyValueRepository;
use mytodos_core::storage::LocalUserStore;

use crate::commands::common::open_database;
use crate::error::CliError;

pub async fn run_logout(db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let users = LocalUserStore::new(LibSqlKeyValueRepository::new(db.connection()));

    match users.current_user().await? {
        Some(user) => {
            users.clear_current_user().await?;
            println!("Signed out {}", user.id);
        }
        None => println!("Not signed in."),
    }
    Ok(())
}
