//! Chapter Context - 章节树
//!
//! 持久化（不可变）树：所有修改操作返回一棵新树，旧树保持不变。
//! 修改时只复制从根到目标节点的路径，未受影响的子树通过 `Arc` 共享。
//!
//! 引用不存在的 ID 的操作一律视为空操作，返回与原树共享存储的同一版本。

use std::collections::HashSet;
use std::sync::Arc;

use super::{Chapter, ChapterId};

/// 插入位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertPosition {
    /// 作为指定节点之后的兄弟节点
    After(ChapterId),
    /// 作为指定节点的最后一个子节点
    Into(ChapterId),
    /// 追加到根级
    Root,
}

/// 先序遍历的扁平条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatEntry {
    /// base_level + 深度（根级深度为 0）
    pub level: usize,
    pub chapter: Arc<Chapter>,
}

/// 章节树
///
/// 不变量:
/// - 章节 ID 在整棵树内唯一
/// - 兄弟节点顺序只会被删除操作改变
/// - 折叠节点（is_open = false）仍完整保留子树
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterTree {
    roots: Arc<Vec<Arc<Chapter>>>,
}

impl ChapterTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_chapters(chapters: Vec<Chapter>) -> Self {
        Self::from_nodes(chapters.into_iter().map(Arc::new).collect())
    }

    fn from_nodes(nodes: Vec<Arc<Chapter>>) -> Self {
        Self {
            roots: Arc::new(nodes),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn roots(&self) -> &[Arc<Chapter>] {
        &self.roots
    }

    /// 根级章节数
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// 全部节点数（所有层级）
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[Arc<Chapter>]) -> usize {
            nodes.iter().map(|n| 1 + count(n.children())).sum()
        }
        count(&self.roots)
    }

    pub fn first_root_id(&self) -> Option<&ChapterId> {
        self.roots.first().map(|c| c.id())
    }

    pub fn last_root(&self) -> Option<&Chapter> {
        self.roots.last().map(|c| c.as_ref())
    }

    /// 先序深度优先查找，返回第一个匹配
    pub fn find(&self, id: &ChapterId) -> Option<&Chapter> {
        fn search<'a>(nodes: &'a [Arc<Chapter>], id: &ChapterId) -> Option<&'a Chapter> {
            for node in nodes {
                if node.id() == id {
                    return Some(node.as_ref());
                }
                if let Some(found) = search(node.children(), id) {
                    return Some(found);
                }
            }
            None
        }
        search(&self.roots, id)
    }

    pub fn contains(&self, id: &ChapterId) -> bool {
        self.find(id).is_some()
    }

    /// 是否与另一棵树为同一版本（共享同一根存储）
    ///
    /// 空操作返回的树与原树为同一版本。
    pub fn same_version(&self, other: &ChapterTree) -> bool {
        Arc::ptr_eq(&self.roots, &other.roots)
    }

    /// 检查 ID 唯一性（用于校验外部快照）
    pub fn has_unique_ids(&self) -> bool {
        fn visit<'a>(nodes: &'a [Arc<Chapter>], seen: &mut HashSet<&'a ChapterId>) -> bool {
            nodes
                .iter()
                .all(|n| seen.insert(n.id()) && visit(n.children(), seen))
        }
        visit(&self.roots, &mut HashSet::new())
    }

    /// 先序遍历，附带层级（base_level + 深度）
    pub fn flatten(&self, base_level: usize) -> Vec<FlatEntry> {
        fn walk(nodes: &[Arc<Chapter>], level: usize, out: &mut Vec<FlatEntry>) {
            for node in nodes {
                out.push(FlatEntry {
                    level,
                    chapter: node.clone(),
                });
                walk(node.children(), level + 1, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.roots, base_level, &mut out);
        out
    }

    // ========================================================================
    // Mutations (return a new tree)
    // ========================================================================

    pub fn rename(&self, id: &ChapterId, title: impl Into<String>) -> ChapterTree {
        let title = title.into();
        self.update(id, |chapter| chapter.set_title(title))
    }

    pub fn set_content(&self, id: &ChapterId, content: impl Into<String>) -> ChapterTree {
        let content = content.into();
        self.update(id, |chapter| chapter.set_content(content))
    }

    pub fn toggle_open(&self, id: &ChapterId) -> ChapterTree {
        self.update(id, |chapter| {
            let is_open = chapter.is_open();
            chapter.set_open(!is_open)
        })
    }

    /// 在 after_id 之后插入兄弟节点（任意层级）；after_id 不存在时为空操作
    pub fn insert_sibling(&self, after_id: &ChapterId, chapter: Chapter) -> ChapterTree {
        match insert_after(&self.roots, after_id, Arc::new(chapter)) {
            Some(nodes) => Self::from_nodes(nodes),
            None => self.clone(),
        }
    }

    /// 追加为 parent_id 的最后一个子节点，并强制展开父节点
    pub fn insert_child(&self, parent_id: &ChapterId, chapter: Chapter) -> ChapterTree {
        let child = Arc::new(chapter);
        self.update(parent_id, move |parent| {
            let mut children = parent.children().to_vec();
            children.push(child);
            parent.replace_children(children);
            parent.set_open(true);
        })
    }

    pub fn append_root(&self, chapter: Chapter) -> ChapterTree {
        let mut nodes = self.roots.as_ref().clone();
        nodes.push(Arc::new(chapter));
        Self::from_nodes(nodes)
    }

    /// 按位置插入
    pub fn insert(&self, position: &InsertPosition, chapter: Chapter) -> ChapterTree {
        match position {
            InsertPosition::After(id) => self.insert_sibling(id, chapter),
            InsertPosition::Into(id) => self.insert_child(id, chapter),
            InsertPosition::Root => self.append_root(chapter),
        }
    }

    /// 删除节点及其整个子树（子节点不会被提升）
    pub fn delete_node(&self, id: &ChapterId) -> ChapterTree {
        match remove(&self.roots, id) {
            Some(nodes) => Self::from_nodes(nodes),
            None => self.clone(),
        }
    }

    /// 对目标节点的副本应用修改，并复制祖先路径
    fn update(&self, id: &ChapterId, f: impl FnOnce(&mut Chapter)) -> ChapterTree {
        let mut f = Some(f);
        match update_path(&self.roots, id, &mut f) {
            Some(nodes) => Self::from_nodes(nodes),
            None => self.clone(),
        }
    }
}

// ============================================================================
// Path copying helpers
// ============================================================================

fn update_path<F: FnOnce(&mut Chapter)>(
    nodes: &[Arc<Chapter>],
    id: &ChapterId,
    f: &mut Option<F>,
) -> Option<Vec<Arc<Chapter>>> {
    for (index, node) in nodes.iter().enumerate() {
        let replacement = if node.id() == id {
            let mut updated = Chapter::clone(node);
            if let Some(f) = f.take() {
                f(&mut updated);
            }
            Some(updated)
        } else {
            update_path(node.children(), id, f).map(|children| with_children(node, children))
        };

        if let Some(updated) = replacement {
            let mut out = nodes.to_vec();
            out[index] = Arc::new(updated);
            return Some(out);
        }
    }
    None
}

fn insert_after(
    nodes: &[Arc<Chapter>],
    after_id: &ChapterId,
    chapter: Arc<Chapter>,
) -> Option<Vec<Arc<Chapter>>> {
    if let Some(index) = nodes.iter().position(|n| n.id() == after_id) {
        let mut out = nodes.to_vec();
        out.insert(index + 1, chapter);
        return Some(out);
    }

    for (index, node) in nodes.iter().enumerate() {
        if let Some(children) = insert_after(node.children(), after_id, chapter.clone()) {
            let mut out = nodes.to_vec();
            out[index] = Arc::new(with_children(node, children));
            return Some(out);
        }
    }
    None
}

fn remove(nodes: &[Arc<Chapter>], id: &ChapterId) -> Option<Vec<Arc<Chapter>>> {
    if let Some(index) = nodes.iter().position(|n| n.id() == id) {
        let mut out = nodes.to_vec();
        out.remove(index);
        return Some(out);
    }

    for (index, node) in nodes.iter().enumerate() {
        if let Some(children) = remove(node.children(), id) {
            let mut out = nodes.to_vec();
            out[index] = Arc::new(with_children(node, children));
            return Some(out);
        }
    }
    None
}

fn with_children(node: &Chapter, children: Vec<Arc<Chapter>>) -> Chapter {
    let mut copy = node.clone();
    copy.replace_children(children);
    copy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ChapterId {
        ChapterId::from(s)
    }

    fn leaf(s: &str) -> Chapter {
        Chapter::with_id(id(s), s.to_uppercase())
    }

    /// r1 [a [a1], b], r2
    fn sample_tree() -> ChapterTree {
        ChapterTree::from_chapters(vec![
            leaf("r1").with_children(vec![leaf("a").with_children(vec![leaf("a1")]), leaf("b")]),
            leaf("r2"),
        ])
    }

    fn ids(entries: &[FlatEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.chapter.id().as_str()).collect()
    }

    #[test]
    fn test_find_at_any_depth() {
        let tree = sample_tree();
        assert_eq!(tree.find(&id("r2")).unwrap().title(), "R2");
        assert_eq!(tree.find(&id("a1")).unwrap().title(), "A1");
        assert!(tree.find(&id("missing")).is_none());
    }

    #[test]
    fn test_flatten_is_pre_order_with_levels() {
        let tree = ChapterTree::from_chapters(vec![
            leaf("r").with_children(vec![leaf("a"), leaf("b")]),
        ]);
        let flat = tree.flatten(0);
        assert_eq!(ids(&flat), vec!["r", "a", "b"]);
        assert_eq!(flat.iter().map(|e| e.level).collect::<Vec<_>>(), vec![0, 1, 1]);

        let flat = sample_tree().flatten(2);
        assert_eq!(ids(&flat), vec!["r1", "a", "a1", "b", "r2"]);
        assert_eq!(
            flat.iter().map(|e| e.level).collect::<Vec<_>>(),
            vec![2, 3, 4, 3, 2]
        );
    }

    #[test]
    fn test_rename_nested_keeps_old_version() {
        let tree = sample_tree();
        let renamed = tree.rename(&id("a1"), "新标题");

        assert_eq!(renamed.find(&id("a1")).unwrap().title(), "新标题");
        assert_eq!(tree.find(&id("a1")).unwrap().title(), "A1");
        // 未受影响的兄弟子树共享存储
        assert!(Arc::ptr_eq(&tree.roots()[1], &renamed.roots()[1]));
        assert!(!Arc::ptr_eq(&tree.roots()[0], &renamed.roots()[0]));
    }

    #[test]
    fn test_rename_same_title_is_deep_equal() {
        let tree = sample_tree();
        let renamed = tree.rename(&id("b"), "B");
        assert_eq!(renamed, tree);
    }

    #[test]
    fn test_missing_id_is_noop() {
        let tree = sample_tree();
        let missing = id("missing");

        assert!(tree.rename(&missing, "x").same_version(&tree));
        assert!(tree.set_content(&missing, "x").same_version(&tree));
        assert!(tree.toggle_open(&missing).same_version(&tree));
        assert!(tree.insert_child(&missing, leaf("n")).same_version(&tree));
        assert!(tree.delete_node(&missing).same_version(&tree));
    }

    #[test]
    fn test_set_content_and_toggle() {
        let tree = sample_tree();
        let tree = tree.set_content(&id("b"), "正文");
        assert_eq!(tree.find(&id("b")).unwrap().content(), "正文");

        let toggled = tree.toggle_open(&id("r1"));
        assert!(!toggled.find(&id("r1")).unwrap().is_open());
        // 折叠不丢失子树
        assert_eq!(toggled.node_count(), tree.node_count());
        assert!(toggled.toggle_open(&id("r1")).find(&id("r1")).unwrap().is_open());
    }

    #[test]
    fn test_insert_sibling_nested() {
        let tree = sample_tree();
        let inserted = tree.insert_sibling(&id("a"), leaf("n"));

        let r1 = inserted.find(&id("r1")).unwrap();
        let children: Vec<&str> = r1.children().iter().map(|c| c.id().as_str()).collect();
        assert_eq!(children, vec!["a", "n", "b"]);
        // b 仍可找到，位置后移一位
        assert!(inserted.find(&id("b")).is_some());
    }

    #[test]
    fn test_insert_sibling_at_root() {
        let tree = sample_tree();
        let inserted = tree.insert_sibling(&id("r1"), leaf("n"));
        let roots: Vec<&str> = inserted.roots().iter().map(|c| c.id().as_str()).collect();
        assert_eq!(roots, vec!["r1", "n", "r2"]);
    }

    #[test]
    fn test_insert_sibling_missing_anchor_returns_equal_tree() {
        let tree = sample_tree();
        let result = tree.insert_sibling(&id("missing"), leaf("n"));
        assert_eq!(result, tree);
        assert!(result.find(&id("n")).is_none());
    }

    #[test]
    fn test_insert_child_forces_parent_open() {
        let tree = sample_tree().toggle_open(&id("b"));
        assert!(!tree.find(&id("b")).unwrap().is_open());

        let inserted = tree.insert_child(&id("b"), leaf("b1"));
        let parent = inserted.find(&id("b")).unwrap();
        assert!(parent.is_open());
        assert_eq!(parent.children().len(), 1);
        assert_eq!(parent.last_child().unwrap().id(), &id("b1"));
    }

    #[test]
    fn test_insert_child_appends_to_end() {
        let tree = sample_tree().insert_child(&id("r1"), leaf("c"));
        let r1 = tree.find(&id("r1")).unwrap();
        let children: Vec<&str> = r1.children().iter().map(|c| c.id().as_str()).collect();
        assert_eq!(children, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_append_root() {
        let tree = ChapterTree::new().append_root(leaf("x")).append_root(leaf("y"));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.last_root().unwrap().id(), &id("y"));
    }

    #[test]
    fn test_delete_root_and_nested() {
        let tree = sample_tree();

        let without_root = tree.delete_node(&id("r1"));
        assert!(without_root.find(&id("r1")).is_none());
        // 子节点随之删除，不会被提升
        assert!(without_root.find(&id("a")).is_none());
        assert!(without_root.find(&id("a1")).is_none());
        assert_eq!(without_root.first_root_id(), Some(&id("r2")));

        let without_nested = tree.delete_node(&id("a"));
        assert!(without_nested.find(&id("a")).is_none());
        assert!(without_nested.find(&id("a1")).is_none());
        let r1 = without_nested.find(&id("r1")).unwrap();
        let children: Vec<&str> = r1.children().iter().map(|c| c.id().as_str()).collect();
        assert_eq!(children, vec!["b"]);
    }

    #[test]
    fn test_delete_preserves_sibling_order() {
        let tree = ChapterTree::from_chapters(vec![leaf("1"), leaf("2"), leaf("3"), leaf("4")]);
        let tree = tree.delete_node(&id("2"));
        let roots: Vec<&str> = tree.roots().iter().map(|c| c.id().as_str()).collect();
        assert_eq!(roots, vec!["1", "3", "4"]);
    }

    #[test]
    fn test_insert_dispatch() {
        let tree = sample_tree();
        let tree = tree.insert(&InsertPosition::Root, leaf("r3"));
        let tree = tree.insert(&InsertPosition::Into(id("r3")), leaf("r3a"));
        let tree = tree.insert(&InsertPosition::After(id("r3a")), leaf("r3b"));

        let r3 = tree.find(&id("r3")).unwrap();
        assert_eq!(r3.children().len(), 2);
        assert_eq!(tree.node_count(), 8);
    }

    #[test]
    fn test_unique_ids_check() {
        assert!(sample_tree().has_unique_ids());
        let dup = ChapterTree::from_chapters(vec![leaf("x").with_children(vec![leaf("x")])]);
        assert!(!dup.has_unique_ids());
    }
}
