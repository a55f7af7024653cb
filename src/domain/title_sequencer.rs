//! 章节标题自动递增
//!
//! 根据已有标题推导"下一个"标题。规则按固定顺序逐条尝试，首个命中的规则生效：
//! 1. 序言 / 序章              → 第一章
//! 2. 第N章...                  → 第(N+1)章...（N 为阿拉伯数字或中文数字）
//! 3. X.Y ...                   → X.(Y+1) ...
//! 4. N / N. ... / N ... / N、... → (N+1)...（保留原有位宽的前导零）
//! 5. 其他                      → 新章节

use super::numeral::{chinese_to_integer, integer_to_chinese, is_chinese_numeral};

/// 无规则命中时的默认标题
pub const FALLBACK_TITLE: &str = "新章节";

/// 序言之后的第一章
pub const FIRST_CHAPTER_TITLE: &str = "第一章";

/// 视为序言的标题
pub const PROLOGUE_TITLES: [&str; 2] = ["序言", "序章"];

const CHAPTER_PREFIX: char = '第';
const CHAPTER_SUFFIX: char = '章';
const PROLOGUE_GLYPH: char = '序';
const IDEOGRAPHIC_COMMA: char = '、';

/// 标题递增规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleRule {
    /// 序言 / 序章
    Prologue,
    /// 第N章
    ChapterMarker,
    /// X.Y 小节编号
    DottedSection,
    /// 前导数字编号
    LeadingNumber,
}

/// 规则求值顺序
pub const TITLE_RULES: [TitleRule; 4] = [
    TitleRule::Prologue,
    TitleRule::ChapterMarker,
    TitleRule::DottedSection,
    TitleRule::LeadingNumber,
];

impl TitleRule {
    /// 命中则返回递增后的标题
    pub fn apply(&self, title: &str) -> Option<String> {
        match self {
            TitleRule::Prologue => is_prologue(title).then(|| FIRST_CHAPTER_TITLE.to_string()),
            TitleRule::ChapterMarker => {
                let marker = parse_chapter_marker(title)?;
                Some(format!(
                    "{}{}{}{}",
                    CHAPTER_PREFIX,
                    marker.next_numeral(),
                    CHAPTER_SUFFIX,
                    marker.rest
                ))
            }
            TitleRule::DottedSection => {
                let (parent, after_parent) = split_leading(title, is_section_parent_glyph);
                if parent.is_empty() {
                    return None;
                }
                let after_dot = after_parent.strip_prefix('.')?;
                let (sub, rest) = split_leading(after_dot, |c| c.is_ascii_digit());
                if sub.is_empty() {
                    return None;
                }
                Some(format!("{}.{}{}", parent, increment_decimal(sub), rest))
            }
            TitleRule::LeadingNumber => {
                let (digits, rest) = split_leading(title, |c| c.is_ascii_digit());
                if digits.is_empty() {
                    return None;
                }
                // 整个标题就是数字时无需分隔符
                if let Some(separator) = rest.chars().next() {
                    if !(separator == '.' || separator == IDEOGRAPHIC_COMMA || separator.is_whitespace()) {
                        return None;
                    }
                }
                let width = digits.len();
                Some(format!("{:0>width$}{}", increment_decimal(digits), rest, width = width))
            }
        }
    }
}

/// 推导下一个标题
pub fn next_title(title: &str) -> String {
    TITLE_RULES
        .iter()
        .find_map(|rule| rule.apply(title))
        .unwrap_or_else(|| FALLBACK_TITLE.to_string())
}

/// 是否为序言标题
pub fn is_prologue(title: &str) -> bool {
    PROLOGUE_TITLES.contains(&title)
}

/// 章节编号的书写形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumeralKind {
    Decimal,
    Chinese,
}

/// "第N章" 解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterMarker<'a> {
    pub numeral: &'a str,
    pub kind: NumeralKind,
    /// "章" 之后的原文
    pub rest: &'a str,
}

impl ChapterMarker<'_> {
    /// 章节编号的整数值（十进制字符串，去掉前导零）
    ///
    /// 中文数字无法解析时返回 None。
    pub fn number(&self) -> Option<String> {
        match self.kind {
            NumeralKind::Decimal => Some(strip_leading_zeros(self.numeral).to_string()),
            NumeralKind::Chinese => chinese_to_integer(self.numeral).ok().map(|n| n.to_string()),
        }
    }

    /// 递增后的编号；中文数字解析失败时原样保留
    pub fn next_numeral(&self) -> String {
        match self.kind {
            NumeralKind::Decimal => increment_decimal(self.numeral),
            NumeralKind::Chinese => chinese_to_integer(self.numeral)
                .map(|n| integer_to_chinese(n + 1))
                .unwrap_or_else(|_| self.numeral.to_string()),
        }
    }
}

/// 解析前导 "第N章"
pub fn parse_chapter_marker(title: &str) -> Option<ChapterMarker<'_>> {
    let body = title.strip_prefix(CHAPTER_PREFIX)?;
    let first = body.chars().next()?;

    let (numeral, after, kind) = if first.is_ascii_digit() {
        let (numeral, after) = split_leading(body, |c| c.is_ascii_digit());
        (numeral, after, NumeralKind::Decimal)
    } else if is_chinese_numeral(first) {
        let (numeral, after) = split_leading(body, is_chinese_numeral);
        (numeral, after, NumeralKind::Chinese)
    } else {
        return None;
    };

    let rest = after.strip_prefix(CHAPTER_SUFFIX)?;
    Some(ChapterMarker { numeral, kind, rest })
}

#[inline]
fn is_section_parent_glyph(ch: char) -> bool {
    ch.is_ascii_digit() || is_chinese_numeral(ch) || ch == PROLOGUE_GLYPH
}

/// 按谓词切分出前导字符段
fn split_leading(s: &str, pred: impl Fn(char) -> bool) -> (&str, &str) {
    let end = s
        .char_indices()
        .find(|&(_, c)| !pred(c))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s.split_at(end)
}

fn strip_leading_zeros(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0"
    } else {
        trimmed
    }
}

/// 十进制数字串加一（按字符串进位，不会溢出）
fn increment_decimal(digits: &str) -> String {
    let mut bytes: Vec<u8> = strip_leading_zeros(digits).bytes().collect();

    for b in bytes.iter_mut().rev() {
        if *b == b'9' {
            *b = b'0';
        } else {
            *b += 1;
            return String::from_utf8_lossy(&bytes).into_owned();
        }
    }

    let mut result = String::with_capacity(bytes.len() + 1);
    result.push('1');
    result.push_str(&String::from_utf8_lossy(&bytes));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prologue() {
        assert_eq!(next_title("序章"), "第一章");
        assert_eq!(next_title("序言"), "第一章");
        // 仅精确匹配
        assert_eq!(next_title("序章 开端"), "新章节");
    }

    #[test]
    fn test_chapter_marker_chinese() {
        assert_eq!(next_title("第一章 导言"), "第二章 导言");
        assert_eq!(next_title("第九章"), "第十章");
        assert_eq!(next_title("第十九章：归来"), "第二十章：归来");
        assert_eq!(next_title("第九十九章 终"), "第100章 终");
    }

    #[test]
    fn test_chapter_marker_decimal() {
        assert_eq!(next_title("第9章 末节"), "第10章 末节");
        assert_eq!(next_title("第001章 陨落的天才"), "第2章 陨落的天才");
    }

    #[test]
    fn test_chapter_marker_malformed_numeral_is_kept() {
        assert_eq!(next_title("第十十章 错误"), "第十十章 错误");
        assert_eq!(next_title("第零章"), "第零章");
    }

    #[test]
    fn test_chapter_marker_requires_suffix() {
        // "第一节" 不是章标记，也不匹配其他规则
        assert_eq!(next_title("第一节"), "新章节");
    }

    #[test]
    fn test_dotted_section() {
        assert_eq!(next_title("4.1 子项"), "4.2 子项");
        assert_eq!(next_title("1.9 小节"), "1.10 小节");
        assert_eq!(next_title("序.1 缘起"), "序.2 缘起");
        assert_eq!(next_title("三.2 回忆"), "三.3 回忆");
        assert_eq!(next_title("2.3"), "2.4");
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(next_title("01. 项"), "02. 项");
        assert_eq!(next_title("09. 项"), "10. 项");
        assert_eq!(next_title("99 问题"), "100 问题");
        assert_eq!(next_title("3、准备"), "4、准备");
        assert_eq!(next_title("007\t特工"), "008\t特工");
    }

    #[test]
    fn test_bare_number() {
        assert_eq!(next_title("09"), "10");
        assert_eq!(next_title("01"), "02");
        assert_eq!(next_title("42"), "43");
        assert_eq!(next_title("999"), "1000");
    }

    #[test]
    fn test_leading_number_rejects_other_suffix() {
        assert_eq!(next_title("2024年"), "新章节");
        assert_eq!(next_title("3-1"), "新章节");
    }

    #[test]
    fn test_fallback() {
        assert_eq!(next_title("random text"), "新章节");
        assert_eq!(next_title(""), "新章节");
    }

    #[test]
    fn test_rule_order() {
        // "1.2" 同时满足规则 3 与规则 4 的前缀，规则 3 优先
        assert_eq!(TitleRule::DottedSection.apply("1.2 x"), Some("1.3 x".to_string()));
        assert_eq!(TitleRule::LeadingNumber.apply("1.2 x"), Some("2.2 x".to_string()));
        assert_eq!(next_title("1.2 x"), "1.3 x");
    }

    #[test]
    fn test_parse_chapter_marker() {
        let marker = parse_chapter_marker("第十二章 风起").unwrap();
        assert_eq!(marker.numeral, "十二");
        assert_eq!(marker.kind, NumeralKind::Chinese);
        assert_eq!(marker.rest, " 风起");
        assert_eq!(marker.number(), Some("12".to_string()));

        let marker = parse_chapter_marker("第007章").unwrap();
        assert_eq!(marker.kind, NumeralKind::Decimal);
        assert_eq!(marker.number(), Some("7".to_string()));

        assert!(parse_chapter_marker("第章").is_none());
        assert!(parse_chapter_marker("章节").is_none());
    }

    #[test]
    fn test_increment_decimal() {
        assert_eq!(increment_decimal("0"), "1");
        assert_eq!(increment_decimal("000"), "1");
        assert_eq!(increment_decimal("199"), "200");
        assert_eq!(
            increment_decimal("99999999999999999999999999"),
            "100000000000000000000000000"
        );
    }
}
