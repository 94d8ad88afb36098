use std::path::Path;

use mytodos_core::db::LibSqlKeyValueRepository;
use mytodos_core::storage::LocalUserStore;
use mytodos_core::util::normalize_text_option;
use mytodos_core::UserInfo;

use crate::auth::display_name;
use crate::commands::common::{normalize_required, open_database};
use crate::error::CliError;

pub struct SignupArgs {
    pub id: String,
    pub name: String,
    pub birthday: Option<String>,
    pub image_url: Option<String>,
}

pub fn build_signup_user(args: SignupArgs) -> Result<UserInfo, CliError> {
    let id = normalize_required(&args.id, "User id")?;
    let name = normalize_required(&args.name, "Name")?;
    Ok(UserInfo::new(id, name)
        .with_birthday(normalize_text_option(args.birthday))
        .with_image_url(normalize_text_option(args.image_url)))
}

pub async fn run_signup(args: SignupArgs, db_path: &Path) -> Result<(), CliError> {
    let user = build_signup_user(args)?;

    let db = open_database(db_path).await?;
    let users = LocalUserStore::new(LibSqlKeyValueRepository::new(db.connection()));
    users.register_user(&user).await?;

    println!("Signed up {} ({})", display_name(&user.name), user.id);
    Ok(())
}
