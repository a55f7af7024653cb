//! 当前选中项
//!
//! 选中项为以下三者之一：
//! - Cover: 封面视图（未打开任何章节）
//! - Chapter: 某个章节
//! - Empty: 无选中（树已被删空）

use serde::{Deserialize, Serialize};

use super::chapter::{ChapterId, ChapterTree};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "chapter_id", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    Cover,
    Chapter(ChapterId),
    Empty,
}

impl Selection {
    pub fn chapter_id(&self) -> Option<&ChapterId> {
        match self {
            Selection::Chapter(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_cover(&self) -> bool {
        matches!(self, Selection::Cover)
    }
}

/// 选中项控制器
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    current: Selection,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Selection {
        &self.current
    }

    pub fn select(&mut self, selection: Selection) {
        self.current = selection;
    }

    /// 切换书籍时调用
    pub fn reset_to_cover(&mut self) {
        self.current = Selection::Cover;
    }

    /// 删除节点后修正选中项
    ///
    /// 若当前选中的章节已不在新树中（被删除的节点或其后代），
    /// 回退到第一个根级章节；树为空时置为 Empty。
    pub fn after_delete(&mut self, tree: &ChapterTree) {
        let stale = match &self.current {
            Selection::Chapter(id) => !tree.contains(id),
            _ => false,
        };

        if stale {
            self.current = match tree.first_root_id() {
                Some(id) => Selection::Chapter(id.clone()),
                None => Selection::Empty,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chapter::Chapter;

    fn tree() -> ChapterTree {
        ChapterTree::from_chapters(vec![
            Chapter::with_id(ChapterId::from("c1"), "第一章")
                .with_children(vec![Chapter::with_id(ChapterId::from("s1"), "1.1")]),
            Chapter::with_id(ChapterId::from("c2"), "第二章"),
        ])
    }

    #[test]
    fn test_defaults_to_cover() {
        assert!(SelectionController::new().current().is_cover());
    }

    #[test]
    fn test_delete_selected_falls_back_to_first_root() {
        let mut selection = SelectionController::new();
        selection.select(Selection::Chapter(ChapterId::from("c2")));

        let updated = tree().delete_node(&ChapterId::from("c2"));
        selection.after_delete(&updated);
        assert_eq!(selection.current(), &Selection::Chapter(ChapterId::from("c1")));
    }

    #[test]
    fn test_delete_ancestor_of_selected_falls_back() {
        let mut selection = SelectionController::new();
        selection.select(Selection::Chapter(ChapterId::from("s1")));

        let updated = tree().delete_node(&ChapterId::from("c1"));
        selection.after_delete(&updated);
        assert_eq!(selection.current(), &Selection::Chapter(ChapterId::from("c2")));
    }

    #[test]
    fn test_delete_last_chapter_empties_selection() {
        let mut selection = SelectionController::new();
        let single = ChapterTree::from_chapters(vec![Chapter::with_id(ChapterId::from("only"), "x")]);
        selection.select(Selection::Chapter(ChapterId::from("only")));

        selection.after_delete(&single.delete_node(&ChapterId::from("only")));
        assert_eq!(selection.current(), &Selection::Empty);
    }

    #[test]
    fn test_delete_other_keeps_selection() {
        let mut selection = SelectionController::new();
        selection.select(Selection::Chapter(ChapterId::from("c1")));

        selection.after_delete(&tree().delete_node(&ChapterId::from("c2")));
        assert_eq!(selection.current(), &Selection::Chapter(ChapterId::from("c1")));
    }

    #[test]
    fn test_cover_survives_delete() {
        let mut selection = SelectionController::new();
        selection.after_delete(&ChapterTree::new());
        assert!(selection.current().is_cover());
    }

    #[test]
    fn test_selection_serialization() {
        let json = serde_json::to_string(&Selection::Chapter(ChapterId::from("c1"))).unwrap();
        assert_eq!(json, r#"{"kind":"chapter","chapter_id":"c1"}"#);
        assert_eq!(serde_json::to_string(&Selection::Cover).unwrap(), r#"{"kind":"cover"}"#);
    }
}
