//! Editor Commands - 编辑会话相关命令

use crate::application::session::{ChapterEdit, TreeSource};
use crate::domain::chapter::ChapterId;
use crate::domain::Selection;

/// 打开编辑会话
#[derive(Debug, Clone, Default)]
pub struct OpenSessionCommand {
    pub user_id: Option<String>,
    /// 缺省时使用目录中的第一本书
    pub book_id: Option<String>,
}

/// 打开会话响应
#[derive(Debug, Clone)]
pub struct OpenSessionResponse {
    pub session_id: String,
    pub book_id: String,
    pub source: TreeSource,
}

/// 关闭会话命令
#[derive(Debug, Clone)]
pub struct CloseSessionCommand {
    pub session_id: String,
}

/// 关闭会话响应
#[derive(Debug, Clone)]
pub struct CloseSessionResponse {
    pub session_id: String,
}

/// 登录命令
#[derive(Debug, Clone)]
pub struct SignInCommand {
    pub session_id: String,
    pub user_id: String,
}

/// 登录响应
#[derive(Debug, Clone)]
pub struct SignInResponse {
    pub session_id: String,
    pub user_id: String,
    /// 是否采用了存储中的快照
    pub adopted_snapshot: bool,
}

/// 登出命令
#[derive(Debug, Clone)]
pub struct SignOutCommand {
    pub session_id: String,
}

/// 切换书籍命令
#[derive(Debug, Clone)]
pub struct SelectBookCommand {
    pub session_id: String,
    pub book_id: String,
}

/// 切换书籍响应
#[derive(Debug, Clone)]
pub struct SelectBookResponse {
    pub session_id: String,
    pub book_id: String,
    pub source: TreeSource,
    pub revision: u64,
}

/// 选中章节或封面
#[derive(Debug, Clone)]
pub struct SelectChapterCommand {
    pub session_id: String,
    pub selection: Selection,
}

/// 选中响应
#[derive(Debug, Clone)]
pub struct SelectChapterResponse {
    /// 章节不存在时为 false，选中项不变
    pub applied: bool,
    pub selection: Selection,
}

/// 编辑章节命令
#[derive(Debug, Clone)]
pub struct EditChapterCommand {
    pub session_id: String,
    pub edit: ChapterEdit,
}

/// 编辑章节响应
#[derive(Debug, Clone)]
pub struct EditChapterResponse {
    pub changed: bool,
    pub created: Option<ChapterId>,
    pub revision: u64,
}
