//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod editor_handlers;

pub use editor_handlers::*;
