//! Editor Query Handlers

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::error::ApplicationError;
use crate::application::ports::{EditorSessionManagerPort, SnapshotSyncPort, SyncStatus};
use crate::application::queries::{ExportMarkdown, FindChapter, FlattenChapters, GetSession, ListBooks};
use crate::application::session::{EditorSession, TreeSource};
use crate::domain::book::{BookCatalog, BookUniverse};
use crate::domain::chapter::{Chapter, ChapterTree, FlatEntry};
use crate::domain::{export_file_name, Selection};

// ============================================================================
// Response DTOs
// ============================================================================

/// 会话视图
#[derive(Debug, Clone)]
pub struct SessionView {
    pub session_id: String,
    pub user_id: Option<String>,
    pub book: BookUniverse,
    pub tree: ChapterTree,
    pub source: TreeSource,
    pub selection: Selection,
    pub revision: u64,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl SessionView {
    fn new(session: EditorSession, sync_status: SyncStatus) -> Self {
        Self {
            session_id: session.id().to_string(),
            user_id: session.user_id().map(String::from),
            book: session.book().clone(),
            tree: session.tree().clone(),
            source: session.source(),
            selection: session.selection().clone(),
            revision: session.revision(),
            sync_status,
            created_at: session.created_at(),
            last_activity: session.last_activity(),
        }
    }
}

/// Markdown 导出结果
#[derive(Debug, Clone)]
pub struct ExportResponse {
    pub book_id: String,
    pub file_name: String,
    pub content: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GetSession Handler
pub struct GetSessionHandler {
    session_manager: Arc<dyn EditorSessionManagerPort>,
    sync: Arc<dyn SnapshotSyncPort>,
}

impl GetSessionHandler {
    pub fn new(session_manager: Arc<dyn EditorSessionManagerPort>, sync: Arc<dyn SnapshotSyncPort>) -> Self {
        Self { session_manager, sync }
    }

    pub async fn handle(&self, query: GetSession) -> Result<SessionView, ApplicationError> {
        let session = self.session_manager.get(&query.session_id)?;
        let report = session.snapshot_key().and_then(|key| self.sync.report(&key));
        let status = session.sync_status(report.as_ref());
        Ok(SessionView::new(session, status))
    }
}

/// FindChapter Handler
pub struct FindChapterHandler {
    session_manager: Arc<dyn EditorSessionManagerPort>,
}

impl FindChapterHandler {
    pub fn new(session_manager: Arc<dyn EditorSessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(&self, query: FindChapter) -> Result<Chapter, ApplicationError> {
        let session = self.session_manager.get(&query.session_id)?;
        session
            .find_chapter(&query.chapter_id)
            .cloned()
            .ok_or_else(|| ApplicationError::not_found("Chapter", query.chapter_id.as_str()))
    }
}

/// FlattenChapters Handler
pub struct FlattenChaptersHandler {
    session_manager: Arc<dyn EditorSessionManagerPort>,
}

impl FlattenChaptersHandler {
    pub fn new(session_manager: Arc<dyn EditorSessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(&self, query: FlattenChapters) -> Result<Vec<FlatEntry>, ApplicationError> {
        let session = self.session_manager.get(&query.session_id)?;
        Ok(session.flatten())
    }
}

/// ExportMarkdown Handler
pub struct ExportMarkdownHandler {
    session_manager: Arc<dyn EditorSessionManagerPort>,
}

impl ExportMarkdownHandler {
    pub fn new(session_manager: Arc<dyn EditorSessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(&self, query: ExportMarkdown) -> Result<ExportResponse, ApplicationError> {
        let session = self.session_manager.get(&query.session_id)?;
        let content = session.export_markdown();

        tracing::debug!(
            session_id = %query.session_id,
            book_id = %session.book().id().as_str(),
            bytes = content.len(),
            "Markdown exported"
        );

        Ok(ExportResponse {
            book_id: session.book().id().as_str().to_string(),
            file_name: export_file_name(session.book().title()),
            content,
        })
    }
}

/// ListBooks Handler
pub struct ListBooksHandler {
    catalog: Arc<BookCatalog>,
}

impl ListBooksHandler {
    pub fn new(catalog: Arc<BookCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, _query: ListBooks) -> Result<Vec<BookUniverse>, ApplicationError> {
        Ok(self.catalog.books().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{SnapshotEnvelope, SnapshotKey, SyncError, SyncOutcome, SyncReport};
    use crate::application::session::LoadedTree;
    use crate::domain::chapter::ChapterId;
    use crate::infrastructure::memory::InMemoryEditorSessionManager;

    struct FixedReport(Option<SyncReport>);

    #[async_trait::async_trait]
    impl SnapshotSyncPort for FixedReport {
        fn submit(&self, _envelope: SnapshotEnvelope) -> Result<(), SyncError> {
            Ok(())
        }

        async fn flush(&self, _key: &SnapshotKey) {}

        fn latest_submitted(&self, _key: &SnapshotKey) -> Option<u64> {
            self.0.as_ref().map(|r| r.revision)
        }

        fn report(&self, _key: &SnapshotKey) -> Option<SyncReport> {
            self.0.clone()
        }
    }

    fn open(manager: &InMemoryEditorSessionManager, user_id: Option<&str>) -> String {
        let book = BookCatalog::default().get("iron-city").cloned().unwrap();
        let tree = ChapterTree::from_chapters(vec![
            Chapter::with_id(ChapterId::from("p"), "序章").with_content("雾"),
            Chapter::with_id(ChapterId::from("c1"), "第一章")
                .with_children(vec![Chapter::with_id(ChapterId::from("s1"), "1.1 新小节")]),
        ]);
        manager
            .create(EditorSession::new(book, LoadedTree::seeded(tree), user_id.map(String::from)))
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_session_reports_sync_status() {
        let manager = Arc::new(InMemoryEditorSessionManager::new());
        let session_id = open(&manager, Some("u1"));
        manager
            .modify(&session_id, &mut |s| {
                s.apply(crate::application::session::ChapterEdit::ToggleOpen { id: ChapterId::from("c1") });
            })
            .unwrap();

        let failed = FixedReport(Some(SyncReport {
            revision: 1,
            outcome: SyncOutcome::Failed("timeout".to_string()),
            at: Utc::now(),
        }));
        let view = GetSessionHandler::new(manager.clone(), Arc::new(failed))
            .handle(GetSession {
                session_id: session_id.clone(),
            })
            .await
            .unwrap();
        assert_eq!(view.sync_status, SyncStatus::Failed);
        assert_eq!(view.revision, 1);
        assert_eq!(view.book.id().as_str(), "iron-city");

        let anonymous = open(&manager, None);
        let view = GetSessionHandler::new(manager.clone(), Arc::new(FixedReport(None)))
            .handle(GetSession { session_id: anonymous })
            .await
            .unwrap();
        assert_eq!(view.sync_status, SyncStatus::LocalOnly);
    }

    #[tokio::test]
    async fn test_find_and_flatten() {
        let manager = Arc::new(InMemoryEditorSessionManager::new());
        let session_id = open(&manager, None);

        let chapter = FindChapterHandler::new(manager.clone())
            .handle(FindChapter {
                session_id: session_id.clone(),
                chapter_id: ChapterId::from("s1"),
            })
            .await
            .unwrap();
        assert_eq!(chapter.title(), "1.1 新小节");

        let missing = FindChapterHandler::new(manager.clone())
            .handle(FindChapter {
                session_id: session_id.clone(),
                chapter_id: ChapterId::from("zz"),
            })
            .await;
        assert!(matches!(missing, Err(ApplicationError::NotFound { .. })));

        let flat = FlattenChaptersHandler::new(manager.clone())
            .handle(FlattenChapters { session_id })
            .await
            .unwrap();
        let levels: Vec<_> = flat.iter().map(|e| (e.chapter.id().as_str().to_string(), e.level)).collect();
        assert_eq!(
            levels,
            vec![("p".to_string(), 0), ("c1".to_string(), 0), ("s1".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_export_markdown() {
        let manager = Arc::new(InMemoryEditorSessionManager::new());
        let session_id = open(&manager, None);

        let export = ExportMarkdownHandler::new(manager)
            .handle(ExportMarkdown { session_id })
            .await
            .unwrap();
        assert_eq!(export.file_name, "铁城往事.md");
        assert_eq!(export.book_id, "iron-city");
        assert_eq!(
            export.content,
            "# 铁城往事\n\n## 序章\n\n雾\n\n## 第一章\n\n### 1.1 新小节\n\n"
        );
    }

    #[tokio::test]
    async fn test_list_books() {
        let books = ListBooksHandler::new(Arc::new(BookCatalog::default()))
            .handle(ListBooks)
            .await
            .unwrap();
        let ids: Vec<_> = books.iter().map(|b| b.id().as_str()).collect();
        assert_eq!(ids, vec!["star-sea", "jade-court", "iron-city"]);
    }
}
