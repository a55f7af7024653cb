//! Book Context - 书籍（世界观）限界上下文
//!
//! 职责:
//! - 书籍身份与外观（标题、图标、主题色）
//! - 书籍目录

mod aggregate;
mod value_objects;

pub use aggregate::{BookCatalog, BookUniverse};
pub use value_objects::{AccentColor, BookId};
