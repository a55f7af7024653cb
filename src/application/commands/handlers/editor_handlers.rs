//! Editor Command Handlers

use std::sync::Arc;

use crate::application::commands::editor_commands::*;
use crate::application::error::ApplicationError;
use crate::application::loader::BookLoader;
use crate::application::ports::{
    EditorSessionManagerPort, SnapshotEnvelope, SnapshotKey, SnapshotSyncPort,
};
use crate::application::session::EditorSession;
use crate::domain::book::{BookCatalog, BookUniverse};
use crate::infrastructure::events::EventPublisher;

/// 提交快照；队列异常只记录日志，后续修改会再次提交完整快照
fn submit_envelope(sync: &dyn SnapshotSyncPort, session_id: &str, envelope: SnapshotEnvelope) {
    let key = envelope.key.clone();
    let revision = envelope.revision;
    if let Err(e) = sync.submit(envelope) {
        tracing::warn!(
            session_id = %session_id,
            key = %key,
            revision = revision,
            error = %e,
            "Failed to submit snapshot"
        );
    }
}

fn resolve_book(catalog: &BookCatalog, book_id: Option<&str>) -> Result<BookUniverse, ApplicationError> {
    match book_id {
        Some(id) => catalog
            .get(id)
            .cloned()
            .ok_or_else(|| ApplicationError::not_found("Book", id)),
        None => catalog
            .default_book()
            .cloned()
            .ok_or_else(|| ApplicationError::invalid_state("Book catalog is empty")),
    }
}

fn validate_user_id(user_id: &str) -> Result<(), ApplicationError> {
    if user_id.trim().is_empty() {
        return Err(ApplicationError::validation("user_id must not be empty"));
    }
    Ok(())
}

// ============================================================================
// Session lifecycle
// ============================================================================

/// OpenSession Handler - 创建编辑会话并加载初始书籍
pub struct OpenSessionHandler {
    session_manager: Arc<dyn EditorSessionManagerPort>,
    catalog: Arc<BookCatalog>,
    loader: Arc<BookLoader>,
}

impl OpenSessionHandler {
    pub fn new(
        session_manager: Arc<dyn EditorSessionManagerPort>,
        catalog: Arc<BookCatalog>,
        loader: Arc<BookLoader>,
    ) -> Self {
        Self {
            session_manager,
            catalog,
            loader,
        }
    }

    pub async fn handle(&self, cmd: OpenSessionCommand) -> Result<OpenSessionResponse, ApplicationError> {
        if let Some(user_id) = &cmd.user_id {
            validate_user_id(user_id)?;
        }
        let book = resolve_book(&self.catalog, cmd.book_id.as_deref())?;

        let loaded = self.loader.load(cmd.user_id.as_deref(), &book).await;
        let source = loaded.source;
        let book_id = book.id().as_str().to_string();

        let session = EditorSession::new(book, loaded, cmd.user_id.clone());
        let session_id = self.session_manager.create(session)?;

        tracing::info!(
            session_id = %session_id,
            book_id = %book_id,
            user_id = ?cmd.user_id,
            source = source.as_str(),
            "Editor session opened"
        );

        Ok(OpenSessionResponse {
            session_id,
            book_id,
            source,
        })
    }
}

/// CloseSession Handler - 关闭会话
///
/// 已提交的快照仍会由同步端写入存储。
pub struct CloseSessionHandler {
    session_manager: Arc<dyn EditorSessionManagerPort>,
    event_publisher: Arc<EventPublisher>,
}

impl CloseSessionHandler {
    pub fn new(session_manager: Arc<dyn EditorSessionManagerPort>, event_publisher: Arc<EventPublisher>) -> Self {
        Self {
            session_manager,
            event_publisher,
        }
    }

    pub async fn handle(&self, cmd: CloseSessionCommand) -> Result<CloseSessionResponse, ApplicationError> {
        self.session_manager.close(&cmd.session_id)?;

        self.event_publisher.publish_session_closed(&cmd.session_id, "client_close");
        self.event_publisher.unregister_session(&cmd.session_id);

        tracing::info!(session_id = %cmd.session_id, "Editor session closed");

        Ok(CloseSessionResponse {
            session_id: cmd.session_id,
        })
    }
}

// ============================================================================
// Auth
// ============================================================================

/// SignIn Handler - 登录并加载该用户的当前书籍
pub struct SignInHandler {
    session_manager: Arc<dyn EditorSessionManagerPort>,
    loader: Arc<BookLoader>,
    sync: Arc<dyn SnapshotSyncPort>,
}

impl SignInHandler {
    pub fn new(
        session_manager: Arc<dyn EditorSessionManagerPort>,
        loader: Arc<BookLoader>,
        sync: Arc<dyn SnapshotSyncPort>,
    ) -> Self {
        Self {
            session_manager,
            loader,
            sync,
        }
    }

    pub async fn handle(&self, cmd: SignInCommand) -> Result<SignInResponse, ApplicationError> {
        validate_user_id(&cmd.user_id)?;

        let mut epoch = 0;
        let mut key = None;
        self.session_manager.modify(&cmd.session_id, &mut |session| {
            // 已是同一用户时不重新加载，避免覆盖未保存的修改
            if session.user_id() == Some(cmd.user_id.as_str()) {
                return;
            }
            epoch = session.begin_load();
            key = Some(SnapshotKey::new(cmd.user_id.clone(), session.book().id().as_str()));
        })?;

        let Some(key) = key else {
            return Ok(SignInResponse {
                session_id: cmd.session_id,
                user_id: cmd.user_id,
                adopted_snapshot: false,
            });
        };

        let mut stored = self.loader.load_stored(&key).await;
        let revision_floor = self.loader.revision_floor(&key);
        let adopted_snapshot = stored.is_some();

        let mut applied = false;
        let mut envelope = None;
        self.session_manager.modify(&cmd.session_id, &mut |session| {
            if !session.is_current_load(epoch) || session.book().id().as_str() != key.book_id {
                return;
            }
            envelope = session.sign_in(cmd.user_id.clone(), stored.take(), revision_floor);
            applied = true;
        })?;

        if !applied {
            return Err(ApplicationError::invalid_state(
                "Sign-in superseded by a newer request",
            ));
        }
        if let Some(envelope) = envelope {
            submit_envelope(self.sync.as_ref(), &cmd.session_id, envelope);
        }

        tracing::info!(
            session_id = %cmd.session_id,
            user_id = %cmd.user_id,
            adopted_snapshot = adopted_snapshot,
            "User signed in"
        );

        Ok(SignInResponse {
            session_id: cmd.session_id,
            user_id: cmd.user_id,
            adopted_snapshot,
        })
    }
}

/// SignOut Handler - 登出，章节树保留在本地
pub struct SignOutHandler {
    session_manager: Arc<dyn EditorSessionManagerPort>,
}

impl SignOutHandler {
    pub fn new(session_manager: Arc<dyn EditorSessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(&self, cmd: SignOutCommand) -> Result<(), ApplicationError> {
        self.session_manager
            .modify(&cmd.session_id, &mut |session| session.sign_out())?;

        tracing::info!(session_id = %cmd.session_id, "User signed out");
        Ok(())
    }
}

// ============================================================================
// Book switch
// ============================================================================

/// SelectBook Handler - 切换书籍
///
/// 多次快速切换时只应用最后一次请求的结果。
pub struct SelectBookHandler {
    session_manager: Arc<dyn EditorSessionManagerPort>,
    catalog: Arc<BookCatalog>,
    loader: Arc<BookLoader>,
    event_publisher: Arc<EventPublisher>,
}

impl SelectBookHandler {
    pub fn new(
        session_manager: Arc<dyn EditorSessionManagerPort>,
        catalog: Arc<BookCatalog>,
        loader: Arc<BookLoader>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            session_manager,
            catalog,
            loader,
            event_publisher,
        }
    }

    pub async fn handle(&self, cmd: SelectBookCommand) -> Result<SelectBookResponse, ApplicationError> {
        let book = resolve_book(&self.catalog, Some(&cmd.book_id))?;

        let mut epoch = 0;
        let mut user_id = None;
        self.session_manager.modify(&cmd.session_id, &mut |session| {
            epoch = session.begin_load();
            user_id = session.user_id().map(String::from);
        })?;

        let loaded = self.loader.load(user_id.as_deref(), &book).await;
        let source = loaded.source;
        let revision = loaded.revision;

        let mut pending = Some((book, loaded));
        self.session_manager.modify(&cmd.session_id, &mut |session| {
            if session.is_current_load(epoch) && session.user_id() == user_id.as_deref() {
                if let Some((book, loaded)) = pending.take() {
                    session.switch_book(book, loaded);
                }
            }
        })?;

        if pending.is_some() {
            return Err(ApplicationError::invalid_state(
                "Book switch superseded by a newer request",
            ));
        }

        self.event_publisher
            .publish_book_switched(&cmd.session_id, &cmd.book_id, source.as_str());

        tracing::info!(
            session_id = %cmd.session_id,
            book_id = %cmd.book_id,
            source = source.as_str(),
            revision = revision,
            "Book switched"
        );

        Ok(SelectBookResponse {
            session_id: cmd.session_id,
            book_id: cmd.book_id,
            source,
            revision,
        })
    }
}

// ============================================================================
// Selection / edits
// ============================================================================

/// SelectChapter Handler
pub struct SelectChapterHandler {
    session_manager: Arc<dyn EditorSessionManagerPort>,
}

impl SelectChapterHandler {
    pub fn new(session_manager: Arc<dyn EditorSessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(&self, cmd: SelectChapterCommand) -> Result<SelectChapterResponse, ApplicationError> {
        let mut applied = false;
        let mut selection = cmd.selection.clone();
        self.session_manager.modify(&cmd.session_id, &mut |session| {
            applied = session.select(cmd.selection.clone());
            selection = session.selection().clone();
        })?;

        if !applied {
            tracing::debug!(
                session_id = %cmd.session_id,
                selection = ?cmd.selection,
                "Selection ignored, chapter not in tree"
            );
        }

        Ok(SelectChapterResponse { applied, selection })
    }
}

/// EditChapter Handler - 应用编辑并提交快照
pub struct EditChapterHandler {
    session_manager: Arc<dyn EditorSessionManagerPort>,
    sync: Arc<dyn SnapshotSyncPort>,
    event_publisher: Arc<EventPublisher>,
}

impl EditChapterHandler {
    pub fn new(
        session_manager: Arc<dyn EditorSessionManagerPort>,
        sync: Arc<dyn SnapshotSyncPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            session_manager,
            sync,
            event_publisher,
        }
    }

    pub async fn handle(&self, cmd: EditChapterCommand) -> Result<EditChapterResponse, ApplicationError> {
        let kind = cmd.edit.kind();
        let mut edit = Some(cmd.edit);
        let mut outcome = None;
        let mut revision = 0;
        self.session_manager.modify(&cmd.session_id, &mut |session| {
            if let Some(edit) = edit.take() {
                outcome = Some(session.apply(edit));
                revision = session.revision();
            }
        })?;

        let outcome = outcome.ok_or_else(|| ApplicationError::internal("Edit was not applied"))?;

        if outcome.changed {
            if let Some(envelope) = outcome.envelope {
                submit_envelope(self.sync.as_ref(), &cmd.session_id, envelope);
            }
            self.event_publisher
                .publish_tree_changed(&cmd.session_id, revision, kind);

            tracing::debug!(
                session_id = %cmd.session_id,
                edit = kind,
                revision = revision,
                "Chapter tree changed"
            );
        } else {
            tracing::debug!(
                session_id = %cmd.session_id,
                edit = kind,
                "Edit referenced a missing chapter, tree unchanged"
            );
        }

        Ok(EditChapterResponse {
            changed: outcome.changed,
            created: outcome.created,
            revision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        tree_to_records, SnapshotStorePort, StoredSnapshot, SyncError, SyncOutcome, SyncReport,
        SyncStatus,
    };
    use crate::infrastructure::worker::{snapshot_sync_channel, SnapshotSyncConfig};
    use std::time::Duration;
    use crate::application::session::{ChapterEdit, TreeSource};
    use crate::domain::chapter::{Chapter, ChapterId, ChapterTree, InsertPosition};
    use crate::domain::Selection;
    use crate::infrastructure::memory::{InMemoryEditorSessionManager, InMemorySnapshotStore};
    use std::sync::Mutex;

    /// 只记录提交，从不写入存储
    #[derive(Default)]
    struct RecordingSync {
        submitted: Mutex<Vec<SnapshotEnvelope>>,
    }

    #[async_trait::async_trait]
    impl SnapshotSyncPort for RecordingSync {
        fn submit(&self, envelope: SnapshotEnvelope) -> Result<(), SyncError> {
            self.submitted.lock().unwrap().push(envelope);
            Ok(())
        }

        async fn flush(&self, _key: &SnapshotKey) {}

        fn latest_submitted(&self, key: &SnapshotKey) -> Option<u64> {
            self.submitted
                .lock()
                .unwrap()
                .iter()
                .filter(|e| &e.key == key)
                .map(|e| e.revision)
                .max()
        }

        fn report(&self, _key: &SnapshotKey) -> Option<SyncReport> {
            None
        }
    }

    struct Fixture {
        sessions: Arc<InMemoryEditorSessionManager>,
        store: Arc<InMemorySnapshotStore>,
        sync: Arc<RecordingSync>,
        catalog: Arc<BookCatalog>,
        loader: Arc<BookLoader>,
        events: Arc<EventPublisher>,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(InMemorySnapshotStore::new());
            let sync = Arc::new(RecordingSync::default());
            Self {
                sessions: Arc::new(InMemoryEditorSessionManager::new()),
                loader: Arc::new(BookLoader::new(store.clone(), sync.clone())),
                store,
                sync,
                catalog: Arc::new(BookCatalog::default()),
                events: EventPublisher::new().arc(),
            }
        }

        async fn open(&self, user_id: Option<&str>) -> String {
            OpenSessionHandler::new(self.sessions.clone(), self.catalog.clone(), self.loader.clone())
                .handle(OpenSessionCommand {
                    user_id: user_id.map(String::from),
                    book_id: None,
                })
                .await
                .unwrap()
                .session_id
        }

        fn edit_handler(&self) -> EditChapterHandler {
            EditChapterHandler::new(self.sessions.clone(), self.sync.clone(), self.events.clone())
        }

        fn select_book_handler(&self) -> SelectBookHandler {
            SelectBookHandler::new(
                self.sessions.clone(),
                self.catalog.clone(),
                self.loader.clone(),
                self.events.clone(),
            )
        }
    }

    async fn switch_book(handler: &SelectBookHandler, session_id: &str, book_id: &str) {
        handler
            .handle(SelectBookCommand {
                session_id: session_id.to_string(),
                book_id: book_id.to_string(),
            })
            .await
            .unwrap();
    }

    async fn rename_first_root(
        handler: &EditChapterHandler,
        sessions: &InMemoryEditorSessionManager,
        session_id: &str,
        title: &str,
    ) -> u64 {
        let id = sessions.get(session_id).unwrap().tree().first_root_id().cloned().unwrap();
        handler
            .handle(EditChapterCommand {
                session_id: session_id.to_string(),
                edit: ChapterEdit::Rename {
                    id,
                    title: title.to_string(),
                },
            })
            .await
            .unwrap()
            .revision
    }

    #[tokio::test]
    async fn test_open_session_with_unknown_book_fails() {
        let fx = Fixture::new();
        let result = OpenSessionHandler::new(fx.sessions.clone(), fx.catalog.clone(), fx.loader.clone())
            .handle(OpenSessionCommand {
                user_id: None,
                book_id: Some("missing".to_string()),
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_edit_submits_snapshot_when_signed_in() {
        let fx = Fixture::new();
        let session_id = fx.open(Some("u1")).await;

        let response = fx
            .edit_handler()
            .handle(EditChapterCommand {
                session_id: session_id.clone(),
                edit: ChapterEdit::Insert {
                    position: InsertPosition::Root,
                },
            })
            .await
            .unwrap();

        assert!(response.changed);
        assert!(response.created.is_some());
        assert_eq!(response.revision, 1);

        let submitted = fx.sync.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].key, SnapshotKey::new("u1", "star-sea"));
    }

    #[tokio::test]
    async fn test_edit_missing_chapter_submits_nothing() {
        let fx = Fixture::new();
        let session_id = fx.open(Some("u1")).await;

        let response = fx
            .edit_handler()
            .handle(EditChapterCommand {
                session_id,
                edit: ChapterEdit::Rename {
                    id: ChapterId::from("missing"),
                    title: "x".to_string(),
                },
            })
            .await
            .unwrap();

        assert!(!response.changed);
        assert_eq!(response.revision, 0);
        assert!(fx.sync.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_unknown_session_is_not_found() {
        let fx = Fixture::new();
        let result = fx
            .edit_handler()
            .handle(EditChapterCommand {
                session_id: "ghost".to_string(),
                edit: ChapterEdit::ToggleOpen {
                    id: ChapterId::from("x"),
                },
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_select_book_loads_stored_snapshot_and_resets_selection() {
        let fx = Fixture::new();
        let tree = ChapterTree::from_chapters(vec![Chapter::with_id(ChapterId::from("j1"), "第一章 宫门")]);
        fx.store
            .save_snapshot(
                &SnapshotKey::new("u1", "jade-court"),
                &StoredSnapshot {
                    revision: 5,
                    chapters: tree_to_records(&tree),
                },
            )
            .await
            .unwrap();

        let session_id = fx.open(Some("u1")).await;
        let first_root = fx.sessions.get(&session_id).unwrap().tree().first_root_id().cloned().unwrap();
        SelectChapterHandler::new(fx.sessions.clone())
            .handle(SelectChapterCommand {
                session_id: session_id.clone(),
                selection: Selection::Chapter(first_root),
            })
            .await
            .unwrap();

        let response = SelectBookHandler::new(
            fx.sessions.clone(),
            fx.catalog.clone(),
            fx.loader.clone(),
            fx.events.clone(),
        )
        .handle(SelectBookCommand {
            session_id: session_id.clone(),
            book_id: "jade-court".to_string(),
        })
        .await
        .unwrap();

        assert_eq!(response.source, TreeSource::Snapshot);
        assert_eq!(response.revision, 5);

        let session = fx.sessions.get(&session_id).unwrap();
        assert_eq!(session.tree(), &tree);
        assert!(session.selection().is_cover());
    }

    #[tokio::test]
    async fn test_sign_in_without_snapshot_uploads_local_tree() {
        let fx = Fixture::new();
        let session_id = fx.open(None).await;

        let response = SignInHandler::new(fx.sessions.clone(), fx.loader.clone(), fx.sync.clone())
            .handle(SignInCommand {
                session_id: session_id.clone(),
                user_id: "u1".to_string(),
            })
            .await
            .unwrap();

        assert!(!response.adopted_snapshot);
        let submitted = fx.sync.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].key, SnapshotKey::new("u1", "star-sea"));
    }

    #[tokio::test]
    async fn test_sign_in_rejects_blank_user() {
        let fx = Fixture::new();
        let session_id = fx.open(None).await;
        let result = SignInHandler::new(fx.sessions.clone(), fx.loader.clone(), fx.sync.clone())
            .handle(SignInCommand {
                session_id,
                user_id: "  ".to_string(),
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_sign_out_keeps_tree_and_stops_snapshots() {
        let fx = Fixture::new();
        let session_id = fx.open(Some("u1")).await;
        let before = fx.sessions.get(&session_id).unwrap().tree().clone();

        SignOutHandler::new(fx.sessions.clone())
            .handle(SignOutCommand {
                session_id: session_id.clone(),
            })
            .await
            .unwrap();

        let session = fx.sessions.get(&session_id).unwrap();
        assert!(session.user_id().is_none());
        assert_eq!(session.tree(), &before);

        fx.edit_handler()
            .handle(EditChapterCommand {
                session_id,
                edit: ChapterEdit::Insert {
                    position: InsertPosition::Root,
                },
            })
            .await
            .unwrap();
        assert!(fx.sync.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_close_session_removes_it() {
        let fx = Fixture::new();
        let session_id = fx.open(None).await;

        CloseSessionHandler::new(fx.sessions.clone(), fx.events.clone())
            .handle(CloseSessionCommand {
                session_id: session_id.clone(),
            })
            .await
            .unwrap();

        assert!(!fx.sessions.is_valid(&session_id));
    }

    #[tokio::test]
    async fn test_revision_keeps_rising_across_book_round_trip() {
        let fx = Fixture::new();
        let session_id = fx.open(Some("u1")).await;
        let edits = fx.edit_handler();
        let books = fx.select_book_handler();
        let key = SnapshotKey::new("u1", "star-sea");

        rename_first_root(&edits, &fx.sessions, &session_id, "第一章 初稿").await;
        switch_book(&books, &session_id, "jade-court").await;
        switch_book(&books, &session_id, "star-sea").await;
        let revision = rename_first_root(&edits, &fx.sessions, &session_id, "第一章 定稿").await;

        let earlier_max = fx
            .sync
            .submitted
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.key == key && e.revision != revision)
            .map(|e| e.revision)
            .max()
            .unwrap();
        assert!(revision > earlier_max);
        assert_eq!(fx.sync.latest_submitted(&key), Some(revision));

        let session = fx.sessions.get(&session_id).unwrap();
        let report = |revision, outcome| SyncReport {
            revision,
            outcome,
            at: chrono::Utc::now(),
        };
        assert_eq!(session.sync_status(None), SyncStatus::Pending);
        assert_eq!(
            session.sync_status(Some(&report(earlier_max, SyncOutcome::Saved))),
            SyncStatus::Pending
        );
        assert_eq!(
            session.sync_status(Some(&report(revision, SyncOutcome::Saved))),
            SyncStatus::Synced
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_edit_survives_switching_away_and_back() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let events = EventPublisher::new().arc();
        let config = SnapshotSyncConfig {
            debounce: Duration::from_millis(1500),
            max_retries: 0,
            queue_capacity: 16,
        };
        let (queue, worker) = snapshot_sync_channel(config, store.clone(), events.clone());
        let _worker = tokio::spawn(worker.run(std::future::pending::<()>()));
        let sync: Arc<dyn SnapshotSyncPort> = Arc::new(queue);

        let sessions = Arc::new(InMemoryEditorSessionManager::new());
        let catalog = Arc::new(BookCatalog::default());
        let loader = Arc::new(BookLoader::new(store.clone(), sync.clone()));
        let session_id = OpenSessionHandler::new(sessions.clone(), catalog.clone(), loader.clone())
            .handle(OpenSessionCommand {
                user_id: Some("u1".to_string()),
                book_id: Some("star-sea".to_string()),
            })
            .await
            .unwrap()
            .session_id;
        let edits = EditChapterHandler::new(sessions.clone(), sync.clone(), events.clone());
        let books = SelectBookHandler::new(sessions.clone(), catalog, loader, events);

        rename_first_root(&edits, &sessions, &session_id, "pre-1").await;
        rename_first_root(&edits, &sessions, &session_id, "pre-2").await;

        // 静默期内切走再切回
        switch_book(&books, &session_id, "jade-court").await;
        switch_book(&books, &session_id, "star-sea").await;

        let reloaded = sessions.get(&session_id).unwrap();
        assert_eq!(reloaded.tree().roots()[0].title(), "pre-2");
        assert_eq!(reloaded.revision(), 2);

        let revision = rename_first_root(&edits, &sessions, &session_id, "LATEST").await;
        assert_eq!(revision, 3);

        tokio::time::sleep(Duration::from_secs(5)).await;

        let key = SnapshotKey::new("u1", "star-sea");
        let stored = store.load_snapshot(&key).await.unwrap().unwrap();
        assert_eq!(stored.revision, 3);
        assert_eq!(stored.chapters[0].title, "LATEST");

        let session = sessions.get(&session_id).unwrap();
        assert_eq!(session.sync_status(sync.report(&key).as_ref()), SyncStatus::Synced);
    }
}
