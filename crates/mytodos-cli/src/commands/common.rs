use std::path::{Path, PathBuf};

use mytodos_core::config::{default_config_path, AppConfig};
use mytodos_core::db::Database;
use mytodos_core::UserInfo;
use serde::Serialize;

use crate::auth::display_name;
use crate::error::CliError;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UserListItem {
    pub id: String,
    pub name: String,
    pub birthday: Option<String>,
    pub image_url: Option<String>,
    pub current: bool,
}

pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig, CliError> {
    let config = match config_path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => AppConfig::load_from_path(&path)?,
        None => AppConfig::default(),
    };
    Ok(config.with_env_overrides())
}

pub fn resolve_db_path(explicit: Option<PathBuf>, config: &AppConfig) -> PathBuf {
    explicit.unwrap_or_else(|| config.db_path())
}

pub async fn open_database(db_path: &Path) -> Result<Database, CliError> {
    Ok(Database::open(db_path).await?)
}

pub fn normalize_required(value: &str, field: &'static str) -> Result<String, CliError> {
    let value = value.trim();
    if value.is_empty() {
        Err(CliError::EmptyField(field))
    } else {
        Ok(value.to_string())
    }
}

pub fn user_to_list_item(user: &UserInfo, current_id: Option<&str>) -> UserListItem {
    UserListItem {
        id: user.id.clone(),
        name: user.name.clone(),
        birthday: user.birthday.clone(),
        image_url: user.image_url.clone(),
        current: current_id == Some(user.id.as_str()),
    }
}

pub fn format_user_line(user: &UserInfo, current: bool) -> String {
    let marker = if current { "*" } else { " " };
    let birthday = user
        .birthday
        .as_deref()
        .map_or_else(String::new, |birthday| format!("  born {birthday}"));
    format!("{marker} {}  {}{birthday}", user.id, display_name(&user.name))
}

pub fn format_user_lines(users: &[UserInfo], current_id: Option<&str>) -> Vec<String> {
    users
        .iter()
        .map(|user| format_user_line(user, current_id == Some(user.id.as_str())))
        .collect()
}
