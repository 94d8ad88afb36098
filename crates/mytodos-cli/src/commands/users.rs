use std::path::Path;

use mytodos_core::db::LibSqlKeyValueRepository;
use mytodos_core::storage::LocalUserStore;

use crate::commands::common::{
    format_user_line, format_user_lines, open_database, user_to_list_item, UserListItem,
};
use crate::error::CliError;

pub async fn run_whoami(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let users = LocalUserStore::new(LibSqlKeyValueRepository::new(db.connection()));

    let Some(current) = users.current_user().await? else {
        if as_json {
            println!("null");
        } else {
            println!("Not signed in.");
        }
        return Ok(());
    };

    if as_json {
        let item = user_to_list_item(&current, Some(current.id.as_str()));
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        println!("{}", format_user_line(&current, false).trim_start());
    }
    Ok(())
}

pub async fn run_users(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let users = LocalUserStore::new(LibSqlKeyValueRepository::new(db.connection()));

    let known = users.known_users().await?;
    let current = users.current_user().await?;
    let current_id = current.as_ref().map(|user| user.id.as_str());

    if as_json {
        let items = known
            .iter()
            .map(|user| user_to_list_item(user, current_id))
            .collect::<Vec<UserListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if known.is_empty() {
        println!("No users on this device.");
    } else {
        for line in format_user_lines(&known, current_id) {
            println!("{line}");
        }
    }
    Ok(())
}
