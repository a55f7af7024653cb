//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use axum::extract::FromRef;

use crate::application::{
    // Command handlers
    CloseSessionHandler, EditChapterHandler, OpenSessionHandler, SelectBookHandler,
    SelectChapterHandler, SignInHandler, SignOutHandler,
    // Query handlers
    ExportMarkdownHandler, FindChapterHandler, FlattenChaptersHandler, GetSessionHandler,
    ListBooksHandler,
    // Ports
    BookLoader, EditorSessionManagerPort, SnapshotStorePort, SnapshotSyncPort,
};
use crate::domain::book::BookCatalog;
use crate::infrastructure::events::EventPublisher;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub session_manager: Arc<dyn EditorSessionManagerPort>,
    pub snapshot_store: Arc<dyn SnapshotStorePort>,
    pub sync: Arc<dyn SnapshotSyncPort>,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub open_session_handler: OpenSessionHandler,
    pub close_session_handler: CloseSessionHandler,
    pub sign_in_handler: SignInHandler,
    pub sign_out_handler: SignOutHandler,
    pub select_book_handler: SelectBookHandler,
    pub select_chapter_handler: SelectChapterHandler,
    pub edit_chapter_handler: EditChapterHandler,

    // ========== Query Handlers ==========
    pub get_session_handler: GetSessionHandler,
    pub find_chapter_handler: FindChapterHandler,
    pub flatten_chapters_handler: FlattenChaptersHandler,
    pub export_markdown_handler: ExportMarkdownHandler,
    pub list_books_handler: ListBooksHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        session_manager: Arc<dyn EditorSessionManagerPort>,
        snapshot_store: Arc<dyn SnapshotStorePort>,
        sync: Arc<dyn SnapshotSyncPort>,
        catalog: Arc<BookCatalog>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        let loader = Arc::new(BookLoader::new(snapshot_store.clone(), sync.clone()));

        Self {
            // Command handlers
            open_session_handler: OpenSessionHandler::new(
                session_manager.clone(),
                catalog.clone(),
                loader.clone(),
            ),
            close_session_handler: CloseSessionHandler::new(
                session_manager.clone(),
                event_publisher.clone(),
            ),
            sign_in_handler: SignInHandler::new(session_manager.clone(), loader.clone(), sync.clone()),
            sign_out_handler: SignOutHandler::new(session_manager.clone()),
            select_book_handler: SelectBookHandler::new(
                session_manager.clone(),
                catalog.clone(),
                loader,
                event_publisher.clone(),
            ),
            select_chapter_handler: SelectChapterHandler::new(session_manager.clone()),
            edit_chapter_handler: EditChapterHandler::new(
                session_manager.clone(),
                sync.clone(),
                event_publisher.clone(),
            ),

            // Query handlers
            get_session_handler: GetSessionHandler::new(session_manager.clone(), sync.clone()),
            find_chapter_handler: FindChapterHandler::new(session_manager.clone()),
            flatten_chapters_handler: FlattenChaptersHandler::new(session_manager.clone()),
            export_markdown_handler: ExportMarkdownHandler::new(session_manager.clone()),
            list_books_handler: ListBooksHandler::new(catalog),

            // Ports
            session_manager,
            snapshot_store,
            sync,
            event_publisher,
        }
    }
}

/// 快照存储状态
///
/// 快照接口既挂在完整应用上，也可以单独挂载。
#[derive(Clone)]
pub struct SnapshotStoreState(pub Arc<dyn SnapshotStorePort>);

impl FromRef<Arc<AppState>> for SnapshotStoreState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        Self(state.snapshot_store.clone())
    }
}
