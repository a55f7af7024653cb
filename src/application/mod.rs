//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SnapshotStore、SnapshotSync、SessionManager）
//! - session: 编辑会话上下文
//! - loader: 书籍章节树加载（快照或默认内容）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod loader;
pub mod ports;
pub mod queries;
pub mod session;

// Re-exports
pub use commands::{
    handlers::{
        CloseSessionHandler, EditChapterHandler, OpenSessionHandler, SelectBookHandler,
        SelectChapterHandler, SignInHandler, SignOutHandler,
    },
    CloseSessionCommand, CloseSessionResponse, EditChapterCommand, EditChapterResponse,
    OpenSessionCommand, OpenSessionResponse, SelectBookCommand, SelectBookResponse,
    SelectChapterCommand, SelectChapterResponse, SignInCommand, SignInResponse, SignOutCommand,
};

pub use error::ApplicationError;
pub use loader::BookLoader;

pub use ports::{
    records_to_tree, tree_to_records, ChapterRecord, EditorSessionManagerPort, RepositoryError,
    SessionError, SnapshotEnvelope, SnapshotKey, SnapshotStorePort, SnapshotSyncPort,
    StoredSnapshot, SyncError, SyncOutcome, SyncReport, SyncStatus,
};

pub use queries::{
    handlers::{
        ExportMarkdownHandler, ExportResponse, FindChapterHandler, FlattenChaptersHandler,
        GetSessionHandler, ListBooksHandler, SessionView,
    },
    ExportMarkdown, FindChapter, FlattenChapters, GetSession, ListBooks,
};

pub use session::{ChapterEdit, EditOutcome, EditorSession, LoadedTree, TreeSource};
