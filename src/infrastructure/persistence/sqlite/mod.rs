//! SQLite Persistence - SQLite 数据库持久化实现

mod database;
mod snapshot_repo;

pub use database::*;
pub use snapshot_repo::*;
