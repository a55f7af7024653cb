//! 中文数字编解码
//!
//! 只支持章节编号常用的 1-99 子集：
//! - 一 .. 九          (1-9)
//! - 十                (10)
//! - 十 + 个位         (11-19)
//! - 个位 + 十         (20, 30, .., 90)
//! - 个位 + 十 + 个位  (21-99)

use thiserror::Error;

/// 十位字形
pub const TENS_GLYPH: char = '十';

/// 零
pub const ZERO_GLYPH: char = '零';

const DIGIT_GLYPHS: [char; 9] = ['一', '二', '三', '四', '五', '六', '七', '八', '九'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumeralError {
    #[error("中文数字为空")]
    Empty,

    #[error("无法识别的中文数字: {0}")]
    Malformed(String),
}

/// 单个数字字形对应的值（1-9）
pub fn digit_value(ch: char) -> Option<u32> {
    DIGIT_GLYPHS
        .iter()
        .position(|&g| g == ch)
        .map(|i| i as u32 + 1)
}

/// 是否为中文数字字形（包括十和零）
#[inline]
pub fn is_chinese_numeral(ch: char) -> bool {
    ch == TENS_GLYPH || ch == ZERO_GLYPH || digit_value(ch).is_some()
}

/// 中文数字 → 整数
pub fn chinese_to_integer(s: &str) -> Result<u32, NumeralError> {
    if s.is_empty() {
        return Err(NumeralError::Empty);
    }

    let malformed = || NumeralError::Malformed(s.to_string());
    let chars: Vec<char> = s.chars().collect();

    match chars.as_slice() {
        [d] if *d == TENS_GLYPH => Ok(10),
        [d] => digit_value(*d).ok_or_else(malformed),
        [t, d] if *t == TENS_GLYPH => digit_value(*d).map(|v| 10 + v).ok_or_else(malformed),
        [d, t] if *t == TENS_GLYPH => match digit_value(*d) {
            Some(v) if v >= 2 => Ok(v * 10),
            _ => Err(malformed()),
        },
        [d, t, u] if *t == TENS_GLYPH => match (digit_value(*d), digit_value(*u)) {
            (Some(tens), Some(units)) if tens >= 2 => Ok(tens * 10 + units),
            _ => Err(malformed()),
        },
        _ => Err(malformed()),
    }
}

/// 整数 → 中文数字
///
/// 100 及以上直接返回十进制字符串。
pub fn integer_to_chinese(n: u32) -> String {
    let glyph = |v: u32| DIGIT_GLYPHS[(v - 1) as usize];

    match n {
        0 => ZERO_GLYPH.to_string(),
        1..=9 => glyph(n).to_string(),
        10 => TENS_GLYPH.to_string(),
        11..=19 => format!("{}{}", TENS_GLYPH, glyph(n - 10)),
        20..=99 => {
            let (tens, units) = (n / 10, n % 10);
            if units == 0 {
                format!("{}{}", glyph(tens), TENS_GLYPH)
            } else {
                format!("{}{}{}", glyph(tens), TENS_GLYPH, glyph(units))
            }
        }
        _ => n.to_string(),
    }
}
