//! Chapter Context - 插入时的标题推导

use super::{Chapter, ChapterTree, InsertPosition};
use crate::domain::title_sequencer::{is_prologue, next_title, parse_chapter_marker, FALLBACK_TITLE};

/// 自动生成的小节标题后缀
pub const SECTION_SUFFIX: &str = "新小节";

/// 序言的小节编号前缀
const PROLOGUE_SECTION_PREFIX: &str = "序";

/// 根据父章节标题推导第一个小节的标题
///
/// - 第N章...   → "N.1 新小节"（N 统一为阿拉伯数字）
/// - 序言/序章  → "序.1 新小节"
/// - 其他       → "1.1 新小节"
pub fn first_section_title(parent_title: &str) -> String {
    let prefix = if is_prologue(parent_title) {
        PROLOGUE_SECTION_PREFIX.to_string()
    } else {
        parse_chapter_marker(parent_title)
            .and_then(|marker| marker.number())
            .unwrap_or_else(|| "1".to_string())
    };
    format!("{}.1 {}", prefix, SECTION_SUFFIX)
}

/// 推导新章节的标题
///
/// 锚点（兄弟或父节点）不存在时返回 None。
pub fn derive_title(tree: &ChapterTree, position: &InsertPosition) -> Option<String> {
    match position {
        InsertPosition::After(sibling_id) => {
            let sibling = tree.find(sibling_id)?;
            Some(next_title(sibling.title()))
        }
        InsertPosition::Into(parent_id) => {
            let parent = tree.find(parent_id)?;
            Some(match parent.last_child() {
                Some(last) => next_title(last.title()),
                None => first_section_title(parent.title()),
            })
        }
        InsertPosition::Root => Some(
            tree.last_root()
                .map(|last| next_title(last.title()))
                .unwrap_or_else(|| FALLBACK_TITLE.to_string()),
        ),
    }
}

/// 在指定位置新建一个自动编号的章节
///
/// 返回新树和新章节；锚点不存在时返回 None。
pub fn insert_numbered(
    tree: &ChapterTree,
    position: &InsertPosition,
) -> Option<(ChapterTree, Chapter)> {
    let title = derive_title(tree, position)?;
    let chapter = Chapter::new(title);
    let updated = tree.insert(position, chapter.clone());
    Some((updated, chapter))
}
