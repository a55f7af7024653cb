//! 文档导出
//!
//! 将章节树导出为扁平的 Markdown 文本：书名为一级标题，
//! 根级章节从二级标题开始，每深一层多一个 `#`（不做上限截断）。

use super::chapter::ChapterTree;

/// 根级章节的标题级别
pub const ROOT_HEADING_LEVEL: usize = 2;

/// 导出 Markdown
pub fn export_markdown(book_title: &str, tree: &ChapterTree) -> String {
    let mut out = format!("# {}\n\n", book_title);

    for entry in tree.flatten(ROOT_HEADING_LEVEL) {
        out.push_str(&"#".repeat(entry.level));
        out.push(' ');
        out.push_str(entry.chapter.title());
        out.push_str("\n\n");

        let content = entry.chapter.content();
        if !content.is_empty() {
            out.push_str(content);
            out.push_str("\n\n");
        }
    }

    out
}

/// 导出文件名
pub fn export_file_name(book_title: &str) -> String {
    let stem: String = book_title
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '"') { '_' } else { c })
        .collect();
    if stem.is_empty() {
        "book.md".to_string()
    } else {
        format!("{}.md", stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chapter::{Chapter, ChapterId};

    #[test]
    fn test_single_chapter() {
        let tree = ChapterTree::from_chapters(vec![Chapter::new("T").with_content("C")]);
        assert_eq!(export_markdown("Book", &tree), "# Book\n\n## T\n\nC\n\n");
    }

    #[test]
    fn test_empty_content_is_skipped() {
        let tree = ChapterTree::from_chapters(vec![Chapter::new("T")]);
        assert_eq!(export_markdown("Book", &tree), "# Book\n\n## T\n\n");
    }

    #[test]
    fn test_empty_tree() {
        assert_eq!(export_markdown("Book", &ChapterTree::new()), "# Book\n\n");
    }

    #[test]
    fn test_nested_headings_are_not_clamped() {
        // 6 层嵌套：根级 2 级 → 最深 7 级
        let mut node = Chapter::with_id(ChapterId::from("d5"), "L5");
        for depth in (0..5).rev() {
            node = Chapter::with_id(ChapterId::from(format!("d{}", depth)), format!("L{}", depth))
                .with_children(vec![node]);
        }
        let markdown = export_markdown("B", &ChapterTree::from_chapters(vec![node]));

        assert!(markdown.contains("\n## L0\n"));
        assert!(markdown.contains("\n### L1\n"));
        assert!(markdown.contains("\n####### L5\n"));
    }

    #[test]
    fn test_order_follows_pre_order() {
        let tree = ChapterTree::from_chapters(vec![
            Chapter::new("第一章").with_content("甲").with_children(vec![
                Chapter::new("1.1 起").with_content("乙"),
                Chapter::new("1.2 承"),
            ]),
            Chapter::new("第二章"),
        ]);
        assert_eq!(
            export_markdown("书", &tree),
            "# 书\n\n## 第一章\n\n甲\n\n### 1.1 起\n\n乙\n\n### 1.2 承\n\n## 第二章\n\n"
        );
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("星海纪元"), "星海纪元.md");
        assert_eq!(export_file_name("a/b"), "a_b.md");
        assert_eq!(export_file_name("  "), "book.md");
    }
}
