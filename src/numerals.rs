//! Numeral Transliteration Module
//!
//! ASCII数字をクメール数字に置き換える。学位記のクメール語欄で使用します。

/// `0`〜`9`に対応するクメール数字（U+17E0〜U+17E9）
const KHMER_DIGITS: [char; 10] = ['០', '១', '២', '៣', '៤', '៥', '៦', '៧', '៨', '៩'];

/// 1文字をクメール数字に変換
///
/// ASCII数字以外はそのまま返します。
pub fn khmer_digit(c: char) -> char {
    match c.to_digit(10) {
        Some(d) if c.is_ascii_digit() => KHMER_DIGITS[d as usize],
        _ => c,
    }
}

/// 文字列中のASCII数字をすべてクメール数字に置き換える
///
/// # 使用例
///
/// ```rust
/// use xlsxmerge::transliterate;
///
/// assert_eq!(transliterate("2024"), "២០២៤");
/// assert_eq!(transliterate("12-05-1999"), "១២-០៥-១៩៩៩");
/// ```
pub fn transliterate(value: &str) -> String {
    value.chars().map(khmer_digit).collect()
}
