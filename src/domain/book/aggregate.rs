//! Book Context - Aggregate Root

use serde::{Deserialize, Serialize};

use super::{AccentColor, BookId};

/// 书籍（世界观）
///
/// 只描述身份与外观；章节树由会话按书籍 ID 单独加载。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookUniverse {
    id: BookId,
    title: String,
    icon: String,
    accent: AccentColor,
}

impl BookUniverse {
    pub fn new(id: BookId, title: impl Into<String>, icon: impl Into<String>, accent: AccentColor) -> Self {
        Self {
            id,
            title: title.into(),
            icon: icon.into(),
            accent,
        }
    }

    // Getters
    pub fn id(&self) -> &BookId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn accent(&self) -> &AccentColor {
        &self.accent
    }
}

/// 书籍目录
#[derive(Debug, Clone)]
pub struct BookCatalog {
    books: Vec<BookUniverse>,
}

impl BookCatalog {
    pub fn new(books: Vec<BookUniverse>) -> Self {
        Self { books }
    }

    pub fn books(&self) -> &[BookUniverse] {
        &self.books
    }

    pub fn get(&self, id: &str) -> Option<&BookUniverse> {
        self.books.iter().find(|b| b.id().as_str() == id)
    }

    /// 默认书籍（目录第一项）
    pub fn default_book(&self) -> Option<&BookUniverse> {
        self.books.first()
    }
}

impl Default for BookCatalog {
    fn default() -> Self {
        Self::new(crate::domain::seed::builtin_books())
    }
}
