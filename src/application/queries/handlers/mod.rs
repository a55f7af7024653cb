//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod editor_handlers;

pub use editor_handlers::*;
