//! Editor Session - 编辑会话上下文
//!
//! 每个编辑客户端一个会话，显式持有原本散落在界面全局状态中的内容：
//! 当前书籍、章节树、选中项、登录用户和同步进度。
//!
//! 会话本身是同步、单线程语义的：每个操作完整执行后才处理下一个。

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::ports::{
    SnapshotEnvelope, SnapshotKey, StoredSnapshot, SyncOutcome, SyncReport, SyncStatus,
    records_to_tree,
};
use crate::domain::book::BookUniverse;
use crate::domain::chapter::{insert_numbered, Chapter, ChapterId, ChapterTree, FlatEntry, InsertPosition};
use crate::domain::{export_markdown, Selection, SelectionController};

/// 章节树来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeSource {
    /// 从持久化快照加载
    Snapshot,
    /// 默认内容生成
    Seed,
}

impl TreeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreeSource::Snapshot => "snapshot",
            TreeSource::Seed => "seed",
        }
    }
}

/// 已加载的章节树
#[derive(Debug, Clone)]
pub struct LoadedTree {
    pub tree: ChapterTree,
    /// 会话从这个 revision 继续计数
    pub revision: u64,
    /// 存储中已有的 revision
    pub persisted_revision: u64,
    pub source: TreeSource,
}

impl LoadedTree {
    pub fn seeded(tree: ChapterTree) -> Self {
        Self {
            tree,
            revision: 0,
            persisted_revision: 0,
            source: TreeSource::Seed,
        }
    }

    pub fn from_snapshot(snapshot: StoredSnapshot) -> Self {
        Self {
            tree: records_to_tree(snapshot.chapters),
            revision: snapshot.revision,
            persisted_revision: snapshot.revision,
            source: TreeSource::Snapshot,
        }
    }

    /// 不让 revision 低于该键已提交过的 revision
    ///
    /// 否则重新加载后的修改会被同步端当作旧修改丢弃。
    pub fn with_revision_floor(mut self, floor: u64) -> Self {
        self.revision = self.revision.max(floor);
        self
    }
}

/// 章节编辑操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterEdit {
    Rename { id: ChapterId, title: String },
    SetContent { id: ChapterId, content: String },
    ToggleOpen { id: ChapterId },
    Insert { position: InsertPosition },
    Delete { id: ChapterId },
}

impl ChapterEdit {
    pub fn kind(&self) -> &'static str {
        match self {
            ChapterEdit::Rename { .. } => "rename",
            ChapterEdit::SetContent { .. } => "set_content",
            ChapterEdit::ToggleOpen { .. } => "toggle_open",
            ChapterEdit::Insert { .. } => "insert",
            ChapterEdit::Delete { .. } => "delete",
        }
    }
}

/// 编辑结果
#[derive(Debug, Clone, Default)]
pub struct EditOutcome {
    /// 章节树是否发生变化（引用不存在的 ID 时为 false）
    pub changed: bool,
    /// 新建章节的 ID
    pub created: Option<ChapterId>,
    /// 需要持久化的快照（仅登录且发生变化时）
    pub envelope: Option<SnapshotEnvelope>,
}

/// 编辑会话
#[derive(Debug, Clone)]
pub struct EditorSession {
    id: String,
    user_id: Option<String>,
    book: BookUniverse,
    tree: ChapterTree,
    source: TreeSource,
    selection: SelectionController,
    /// 每次真实修改递增
    revision: u64,
    /// 加载时存储中已有的 revision
    persisted_revision: u64,
    /// 异步加载序号，只有最新一次加载的结果会被应用
    load_epoch: u64,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl EditorSession {
    pub fn new(book: BookUniverse, loaded: LoadedTree, user_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            book,
            tree: loaded.tree,
            source: loaded.source,
            selection: SelectionController::new(),
            revision: loaded.revision,
            persisted_revision: loaded.persisted_revision,
            load_epoch: 0,
            created_at: now,
            last_activity: now,
        }
    }

    // ========================================================================
    // Getters
    // ========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn book(&self) -> &BookUniverse {
        &self.book
    }

    pub fn tree(&self) -> &ChapterTree {
        &self.tree
    }

    pub fn source(&self) -> TreeSource {
        self.source
    }

    pub fn selection(&self) -> &Selection {
        self.selection.current()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    pub fn find_chapter(&self, id: &ChapterId) -> Option<&Chapter> {
        self.tree.find(id)
    }

    pub fn flatten(&self) -> Vec<FlatEntry> {
        self.tree.flatten(0)
    }

    pub fn export_markdown(&self) -> String {
        export_markdown(self.book.title(), &self.tree)
    }

    /// 当前 (用户, 书籍) 快照键；未登录时为 None
    pub fn snapshot_key(&self) -> Option<SnapshotKey> {
        self.user_id
            .as_ref()
            .map(|user_id| SnapshotKey::new(user_id.clone(), self.book.id().as_str()))
    }

    /// 根据同步端的最近报告计算同步状态
    pub fn sync_status(&self, report: Option<&SyncReport>) -> SyncStatus {
        if self.user_id.is_none() {
            return SyncStatus::LocalOnly;
        }
        if self.revision == self.persisted_revision {
            return SyncStatus::Synced;
        }
        match report {
            Some(report) if report.revision >= self.revision => match report.outcome {
                SyncOutcome::Saved => SyncStatus::Synced,
                SyncOutcome::Failed(_) => SyncStatus::Failed,
            },
            _ => SyncStatus::Pending,
        }
    }

    // ========================================================================
    // Book / auth
    // ========================================================================

    /// 开始一次异步加载（切换书籍或登录），返回加载序号
    pub fn begin_load(&mut self) -> u64 {
        self.load_epoch += 1;
        self.load_epoch
    }

    /// 加载序号是否仍是最新的
    pub fn is_current_load(&self, epoch: u64) -> bool {
        self.load_epoch == epoch
    }

    /// 切换书籍：整体替换章节树，选中项回到封面
    pub fn switch_book(&mut self, book: BookUniverse, loaded: LoadedTree) {
        self.book = book;
        self.replace_tree(loaded);
        self.touch();
    }

    /// 登录
    ///
    /// 存储中已有该书快照时以快照为准；否则保留本地章节树并生成快照等待上传，
    /// 上传的 revision 高于 `revision_floor`（该键已提交过的最高 revision）。
    pub fn sign_in(
        &mut self,
        user_id: impl Into<String>,
        stored: Option<LoadedTree>,
        revision_floor: u64,
    ) -> Option<SnapshotEnvelope> {
        self.user_id = Some(user_id.into());
        self.touch();

        match stored {
            Some(loaded) => {
                self.replace_tree(loaded.with_revision_floor(revision_floor));
                None
            }
            None => {
                self.persisted_revision = 0;
                self.revision = self.revision.max(revision_floor) + 1;
                self.envelope()
            }
        }
    }

    /// 登出：保留章节树，之后的修改只在本地
    pub fn sign_out(&mut self) {
        self.user_id = None;
        self.touch();
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// 选中章节或封面；章节不存在时为空操作，返回 false
    pub fn select(&mut self, selection: Selection) -> bool {
        self.touch();
        if let Selection::Chapter(id) = &selection {
            if !self.tree.contains(id) {
                return false;
            }
        }
        self.selection.select(selection);
        true
    }

    // ========================================================================
    // Chapter edits
    // ========================================================================

    /// 应用一次章节编辑
    ///
    /// 新树完整构建后才替换当前树；引用不存在的 ID 时不产生任何变化。
    pub fn apply(&mut self, edit: ChapterEdit) -> EditOutcome {
        self.touch();

        let mut created = None;
        let updated = match edit {
            ChapterEdit::Rename { id, title } => self.tree.rename(&id, title),
            ChapterEdit::SetContent { id, content } => self.tree.set_content(&id, content),
            ChapterEdit::ToggleOpen { id } => self.tree.toggle_open(&id),
            ChapterEdit::Insert { position } => match insert_numbered(&self.tree, &position) {
                Some((tree, chapter)) => {
                    created = Some(chapter.id().clone());
                    tree
                }
                None => self.tree.clone(),
            },
            ChapterEdit::Delete { id } => {
                let tree = self.tree.delete_node(&id);
                self.selection.after_delete(&tree);
                tree
            }
        };

        if updated.same_version(&self.tree) {
            return EditOutcome::default();
        }

        self.tree = updated;
        self.revision += 1;

        EditOutcome {
            changed: true,
            created,
            envelope: self.envelope(),
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    fn replace_tree(&mut self, loaded: LoadedTree) {
        self.tree = loaded.tree;
        self.source = loaded.source;
        self.revision = loaded.revision;
        self.persisted_revision = loaded.persisted_revision;
        self.selection.reset_to_cover();
    }

    fn envelope(&self) -> Option<SnapshotEnvelope> {
        self.snapshot_key().map(|key| SnapshotEnvelope {
            key,
            revision: self.revision,
            tree: self.tree.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::tree_to_records;
    use crate::domain::book::BookCatalog;
    use crate::domain::seed::default_chapters;

    fn book(id: &str) -> BookUniverse {
        BookCatalog::default().get(id).cloned().unwrap()
    }

    fn session(user_id: Option<&str>) -> EditorSession {
        let book = book("star-sea");
        let tree = ChapterTree::from_chapters(vec![
            Chapter::with_id(ChapterId::from("p"), "序章"),
            Chapter::with_id(ChapterId::from("c1"), "第一章 启航")
                .with_children(vec![Chapter::with_id(ChapterId::from("s1"), "1.1 港口")]),
        ]);
        EditorSession::new(book, LoadedTree::seeded(tree), user_id.map(String::from))
    }

    fn id(s: &str) -> ChapterId {
        ChapterId::from(s)
    }

    #[test]
    fn test_new_session_starts_on_cover() {
        let session = session(None);
        assert!(session.selection().is_cover());
        assert_eq!(session.revision(), 0);
        assert_eq!(session.sync_status(None), SyncStatus::LocalOnly);
    }

    #[test]
    fn test_edit_bumps_revision_and_emits_envelope_when_signed_in() {
        let mut session = session(Some("u1"));
        let outcome = session.apply(ChapterEdit::Rename {
            id: id("c1"),
            title: "第一章 出发".to_string(),
        });

        assert!(outcome.changed);
        assert_eq!(session.revision(), 1);
        let envelope = outcome.envelope.unwrap();
        assert_eq!(envelope.key, SnapshotKey::new("u1", "star-sea"));
        assert_eq!(envelope.revision, 1);
        assert_eq!(envelope.tree.find(&id("c1")).unwrap().title(), "第一章 出发");
        assert_eq!(session.sync_status(None), SyncStatus::Pending);
    }

    #[test]
    fn test_local_only_edit_has_no_envelope() {
        let mut session = session(None);
        let outcome = session.apply(ChapterEdit::ToggleOpen { id: id("c1") });
        assert!(outcome.changed);
        assert!(outcome.envelope.is_none());
    }

    #[test]
    fn test_missing_id_is_noop() {
        let mut session = session(Some("u1"));
        let outcome = session.apply(ChapterEdit::Delete { id: id("missing") });
        assert!(!outcome.changed);
        assert!(outcome.envelope.is_none());
        assert_eq!(session.revision(), 0);

        let outcome = session.apply(ChapterEdit::Insert {
            position: InsertPosition::After(id("missing")),
        });
        assert!(!outcome.changed);
        assert!(outcome.created.is_none());
    }

    #[test]
    fn test_insert_derives_titles() {
        let mut session = session(None);

        let after_prologue = session.apply(ChapterEdit::Insert {
            position: InsertPosition::After(id("p")),
        });
        let created = after_prologue.created.unwrap();
        assert_eq!(session.find_chapter(&created).unwrap().title(), "第一章");

        let into = session.apply(ChapterEdit::Insert {
            position: InsertPosition::Into(id("c1")),
        });
        assert_eq!(session.find_chapter(&into.created.unwrap()).unwrap().title(), "1.2 港口");

        let root = session.apply(ChapterEdit::Insert {
            position: InsertPosition::Root,
        });
        assert_eq!(session.find_chapter(&root.created.unwrap()).unwrap().title(), "第二章 启航");
    }

    #[test]
    fn test_delete_selected_moves_selection() {
        let mut session = session(None);
        assert!(session.select(Selection::Chapter(id("s1"))));

        session.apply(ChapterEdit::Delete { id: id("c1") });
        assert_eq!(session.selection(), &Selection::Chapter(id("p")));

        session.apply(ChapterEdit::Delete { id: id("p") });
        assert_eq!(session.selection(), &Selection::Empty);
        assert!(session.tree().is_empty());
    }

    #[test]
    fn test_select_missing_chapter_is_noop() {
        let mut session = session(None);
        assert!(!session.select(Selection::Chapter(id("missing"))));
        assert!(session.selection().is_cover());
    }

    #[test]
    fn test_switch_book_resets_selection_and_tree() {
        let mut session = session(None);
        session.select(Selection::Chapter(id("c1")));

        let other = book("jade-court");
        let tree = default_chapters(other.id());
        session.switch_book(other, LoadedTree::seeded(tree));

        assert!(session.selection().is_cover());
        assert_eq!(session.book().id().as_str(), "jade-court");
        assert!(session.find_chapter(&id("c1")).is_none());
        assert_eq!(session.source(), TreeSource::Seed);
    }

    #[test]
    fn test_sign_in_adopts_stored_snapshot() {
        let mut session = session(None);
        let stored_tree = ChapterTree::from_chapters(vec![Chapter::with_id(id("remote"), "远端")]);
        let stored = StoredSnapshot {
            revision: 7,
            chapters: tree_to_records(&stored_tree),
        };

        let envelope = session.sign_in("u1", Some(LoadedTree::from_snapshot(stored)), 0);
        assert!(envelope.is_none());
        assert_eq!(session.revision(), 7);
        assert!(session.find_chapter(&id("remote")).is_some());
        assert_eq!(session.source(), TreeSource::Snapshot);
        assert_eq!(session.sync_status(None), SyncStatus::Synced);
    }

    #[test]
    fn test_sign_in_without_snapshot_uploads_local_tree() {
        let mut session = session(None);
        session.apply(ChapterEdit::SetContent {
            id: id("p"),
            content: "本地草稿".to_string(),
        });

        let envelope = session.sign_in("u1", None, 0).unwrap();
        assert_eq!(envelope.key, SnapshotKey::new("u1", "star-sea"));
        assert_eq!(envelope.tree.find(&id("p")).unwrap().content(), "本地草稿");
        assert_eq!(session.sync_status(None), SyncStatus::Pending);
    }

    #[test]
    fn test_sync_status_follows_reports() {
        let mut session = session(Some("u1"));
        session.apply(ChapterEdit::ToggleOpen { id: id("c1") });
        session.apply(ChapterEdit::ToggleOpen { id: id("c1") });

        let stale = SyncReport {
            revision: 1,
            outcome: SyncOutcome::Saved,
            at: Utc::now(),
        };
        assert_eq!(session.sync_status(Some(&stale)), SyncStatus::Pending);

        let failed = SyncReport {
            revision: 2,
            outcome: SyncOutcome::Failed("offline".to_string()),
            at: Utc::now(),
        };
        assert_eq!(session.sync_status(Some(&failed)), SyncStatus::Failed);

        let saved = SyncReport {
            revision: 2,
            outcome: SyncOutcome::Saved,
            at: Utc::now(),
        };
        assert_eq!(session.sync_status(Some(&saved)), SyncStatus::Synced);
    }

    #[test]
    fn test_sync_status_after_reload_waits_for_new_revision() {
        let mut session = session(Some("u1"));
        session.apply(ChapterEdit::ToggleOpen { id: id("c1") });
        session.apply(ChapterEdit::ToggleOpen { id: id("c1") });
        let submitted = session.revision();

        // 切走再切回，存储里还没有快照
        let other = book("jade-court");
        let other_tree = default_chapters(other.id());
        session.switch_book(other, LoadedTree::seeded(other_tree));
        let back = book("star-sea");
        let tree = default_chapters(back.id());
        session.switch_book(back, LoadedTree::seeded(tree).with_revision_floor(submitted));

        let outcome = session.apply(ChapterEdit::Insert {
            position: InsertPosition::Root,
        });
        let revision = outcome.envelope.unwrap().revision;
        assert!(revision > submitted);

        let report = |revision| SyncReport {
            revision,
            outcome: SyncOutcome::Saved,
            at: Utc::now(),
        };
        assert_eq!(session.sync_status(Some(&report(submitted))), SyncStatus::Pending);
        assert_eq!(session.sync_status(Some(&report(revision))), SyncStatus::Synced);
    }

    #[test]
    fn test_sign_in_upload_is_above_submitted_revisions() {
        let mut session = session(None);
        let envelope = session.sign_in("u1", None, 4).unwrap();
        assert_eq!(envelope.revision, 5);
    }

    #[test]
    fn test_only_latest_load_is_current() {
        let mut session = session(None);
        let first = session.begin_load();
        let second = session.begin_load();
        assert!(!session.is_current_load(first));
        assert!(session.is_current_load(second));
    }

    #[test]
    fn test_export_uses_book_title() {
        let session = session(None);
        assert!(session.export_markdown().starts_with("# 星海纪元\n\n## 序章\n\n"));
    }
}
