//! 默认内容生成
//!
//! 内置书籍目录，以及没有持久化快照时使用的示例章节树。
//! 每次生成都会分配新的章节 ID。

use super::book::{AccentColor, BookId, BookUniverse};
use super::chapter::{Chapter, ChapterTree};

struct BookSeed {
    id: &'static str,
    title: &'static str,
    icon: &'static str,
    accent: &'static str,
    chapters: &'static [ChapterSeed],
}

struct ChapterSeed {
    title: &'static str,
    content: &'static str,
    sections: &'static [(&'static str, &'static str)],
}

const BOOK_SEEDS: &[BookSeed] = &[
    BookSeed {
        id: "star-sea",
        title: "星海纪元",
        icon: "🌌",
        accent: "#3b82f6",
        chapters: &[
            ChapterSeed {
                title: "序章",
                content: "公元三千年，人类第一次收到来自银河彼端的回信。",
                sections: &[],
            },
            ChapterSeed {
                title: "第一章 启航",
                content: "",
                sections: &[
                    ("1.1 港口", "晨光中的轨道港口挤满了送行的人群。"),
                    ("1.2 舰长", "舰长在舰桥上最后一次核对航线。"),
                ],
            },
            ChapterSeed {
                title: "第二章 跃迁",
                content: "",
                sections: &[("2.1 失联", "跃迁结束后，舰队与地球的通讯中断了。")],
            },
        ],
    },
    BookSeed {
        id: "jade-court",
        title: "玉阙遗梦",
        icon: "🏯",
        accent: "#10b981",
        chapters: &[
            ChapterSeed {
                title: "序言",
                content: "此书记一座宫城的兴衰。",
                sections: &[("序.1 缘起", "旧档案中夹着一封未寄出的信。")],
            },
            ChapterSeed {
                title: "第一章 入宫",
                content: "",
                sections: &[
                    ("1.1 初雪", "那年的第一场雪落在新修的宫墙上。"),
                    ("1.2 旧识", ""),
                ],
            },
        ],
    },
    BookSeed {
        id: "iron-city",
        title: "铁城往事",
        icon: "⚙️",
        accent: "#f59e0b",
        chapters: &[
            ChapterSeed {
                title: "01. 烟囱",
                content: "城市从不熄灭的烟囱说起。",
                sections: &[],
            },
            ChapterSeed {
                title: "02. 工会",
                content: "",
                sections: &[("2.1 罢工", "")],
            },
        ],
    },
];

/// 未知书籍使用的通用模板
const GENERIC_SEED: &[ChapterSeed] = &[
    ChapterSeed {
        title: "序章",
        content: "",
        sections: &[],
    },
    ChapterSeed {
        title: "第一章",
        content: "",
        sections: &[("1.1 新小节", "")],
    },
];

/// 内置书籍目录
pub fn builtin_books() -> Vec<BookUniverse> {
    BOOK_SEEDS
        .iter()
        .filter_map(|seed| {
            Some(BookUniverse::new(
                BookId::new(seed.id).ok()?,
                seed.title,
                seed.icon,
                AccentColor::new(seed.accent).ok()?,
            ))
        })
        .collect()
}

/// 生成书籍的默认章节树
pub fn default_chapters(book_id: &BookId) -> ChapterTree {
    let chapters = BOOK_SEEDS
        .iter()
        .find(|seed| seed.id == book_id.as_str())
        .map(|seed| seed.chapters)
        .unwrap_or(GENERIC_SEED);

    ChapterTree::from_chapters(chapters.iter().map(build_chapter).collect())
}

fn build_chapter(seed: &ChapterSeed) -> Chapter {
    let sections = seed
        .sections
        .iter()
        .map(|(title, content)| Chapter::new(*title).with_content(*content).with_open(false))
        .collect();

    Chapter::new(seed.title)
        .with_content(seed.content)
        .with_open(!seed.sections.is_empty())
        .with_children(sections)
}
