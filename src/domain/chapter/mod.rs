//! Chapter Context - 章节树限界上下文
//!
//! 职责:
//! - 章节节点实体
//! - 持久化章节树及其修改操作
//! - 插入时的标题自动编号

mod entities;
mod numbering;
mod tree;

pub use entities::{Chapter, ChapterId};
pub use numbering::{derive_title, first_section_title, insert_numbered, SECTION_SUFFIX};
pub use tree::{ChapterTree, FlatEntry, InsertPosition};
