//! Data models for MyTodos

mod user;

pub use user::{parse_known_users, render_known_users, UserInfo};
