//! mytodos-core - Core library for MyTodos
//!
//! This crate contains the login-and-profile-bootstrap flow, the local user
//! roster, and the storage and provider seams shared by every MyTodos host
//! (mobile shell, CLI).

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod login;
pub mod models;
pub mod navigation;
pub mod session;
pub mod state;
pub mod storage;
pub mod util;

pub use error::{Error, Result};
pub use login::{LoginController, LoginOutcome, LoginStatus};
pub use models::UserInfo;
