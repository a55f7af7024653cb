//! Book Context - Value Objects

use serde::{Deserialize, Serialize};

/// 书籍（世界观）标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    pub fn new(id: impl Into<String>) -> Result<Self, &'static str> {
        let id = id.into();
        if id.is_empty() {
            return Err("书籍 ID 不能为空");
        }
        if id.len() > 64 {
            return Err("书籍 ID 长度不能超过64字符");
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 主题色（#RRGGBB）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccentColor(String);

impl AccentColor {
    pub fn new(hex: impl Into<String>) -> Result<Self, &'static str> {
        let hex = hex.into();
        let digits = hex.strip_prefix('#').ok_or("颜色必须以 # 开头")?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("颜色格式必须为 #RRGGBB");
        }
        Ok(Self(hex.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
