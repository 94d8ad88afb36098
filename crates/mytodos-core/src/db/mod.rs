//! Database layer for MyTodos

mod connection;
mod kv_repository;
mod migrations;

pub use connection::Database;
pub use kv_repository::LibSqlKeyValueRepository;
