//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Book Context: 书籍（世界观）目录
//! - Chapter Context: 章节树
//!
//! 以及共享的纯函数服务：中文数字、标题递增、Markdown 导出、选中项

pub mod book;
pub mod chapter;
pub mod export;
pub mod numeral;
pub mod seed;
pub mod selection;
pub mod title_sequencer;

pub use export::{export_file_name, export_markdown};
pub use numeral::{chinese_to_integer, integer_to_chinese, NumeralError};
pub use selection::{Selection, SelectionController};
pub use title_sequencer::next_title;
