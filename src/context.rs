//! Context Mapping Module
//!
//! スプレッドシートの1行とフィールド名リストから、テンプレート差し込み用の
//! コンテキストを構築するモジュール。

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::api::DateStyle;
use crate::numerals::transliterate;

/// 差し込み日付のキー
pub const CUR_DATE_KEY: &str = "cur_date";

/// テンプレート差し込み用のコンテキスト（キー → 値）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: BTreeMap<String, String>,
}

impl Context {
    /// 空のコンテキストを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// 値を設定（既存の値は上書き）
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// 値を取得
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// キーが存在するかどうか
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// エントリ数
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// キー順にエントリを走査
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Context::new();
        for (k, v) in iter {
            context.insert(k, v);
        }
        context
    }
}

/// 1行分のコンテキストを構築
///
/// # 引数
///
/// * `fields` - フィールド名リスト（テンプレートのプレースホルダー順）
/// * `row` - 行の値（文字列化済み）
/// * `transliterate_keys` - クメール数字に変換するキー
/// * `date_style` - `cur_date`の形式
/// * `today` - `cur_date`に使う日付
///
/// # 処理内容
///
/// 1. 行が短い場合は空文字列で右詰めする
/// 2. `fields[i]` → `row[i]` の対応を作る（余分な値は捨てる）
/// 3. `transliterate_keys`に含まれるキーをクメール数字に変換する
/// 4. `cur_date`を追加する
///
/// # 使用例
///
/// ```rust
/// use chrono::NaiveDate;
/// use xlsxmerge::{map_row, DateStyle};
///
/// let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
/// let fields = ["id", "name"];
/// let context = map_row(&fields, &["S1".to_string()], &[], &DateStyle::DayMonthYear, today);
///
/// assert_eq!(context.get("id"), Some("S1"));
/// assert_eq!(context.get("name"), Some(""));
/// assert_eq!(context.get("cur_date"), Some("16-10-2026"));
/// ```
pub fn map_row<F: AsRef<str>>(
    fields: &[F],
    row: &[String],
    transliterate_keys: &[String],
    date_style: &DateStyle,
    today: NaiveDate,
) -> Context {
    let mut context: Context = fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let value = row.get(i).cloned().unwrap_or_default();
            (field.as_ref().to_string(), value)
        })
        .collect();

    for key in transliterate_keys {
        if let Some(value) = context.values.get_mut(key) {
            *value = transliterate(value);
        }
    }

    context.insert(CUR_DATE_KEY, date_style.format(today));
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NONE: [&str; 0] = [];

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_short_row_is_padded() {
        let context = map_row(
            &["id", "name"],
            &row(&["S1"]),
            &[],
            &DateStyle::DayMonthYear,
            today(),
        );

        assert_eq!(context.len(), 3);
        assert_eq!(context.get("id"), Some("S1"));
        assert_eq!(context.get("name"), Some(""));
        assert_eq!(context.get("cur_date"), Some("16-10-2026"));
    }

    #[test]
    fn test_long_row_is_truncated() {
        let context = map_row(
            &["a"],
            &row(&["1", "2", "3"]),
            &[],
            &DateStyle::DayMonthYear,
            today(),
        );

        assert_eq!(context.len(), 2);
        assert_eq!(context.get("a"), Some("1"));
    }

    #[test]
    fn test_transliterated_keys() {
        let context = map_row(
            &["id_kh", "id_e"],
            &row(&["2024", "2024"]),
            &["id_kh".to_string(), "not_a_field".to_string()],
            &DateStyle::DayAbbrevMonthYear,
            today(),
        );

        assert_eq!(context.get("id_kh"), Some("២០២៤"));
        assert_eq!(context.get("id_e"), Some("2024"));
        assert!(!context.contains_key("not_a_field"));
        assert_eq!(context.get("cur_date"), Some("16 Oct 2026"));
    }

    #[test]
    fn test_cur_date_field_is_overridden() {
        let context = map_row(
            &["cur_date"],
            &row(&["yesterday"]),
            &[],
            &DateStyle::DayMonthYear,
            today(),
        );
        assert_eq!(context.len(), 1);
        assert_eq!(context.get("cur_date"), Some("16-10-2026"));
    }

    #[test]
    fn test_empty_row() {
        let context = map_row(&["a", "b"], &[], &[], &DateStyle::DayMonthYear, today());
        assert_eq!(context.get("a"), Some(""));
        assert_eq!(context.get("b"), Some(""));
    }

    proptest! {
        #[test]
        fn prop_entry_count_and_values(
            fields in proptest::collection::btree_set("[a-z]{1,8}", 0..20),
            values in proptest::collection::vec("[A-Za-z0-9 ]{0,6}", 0..30),
        ) {
            let fields: Vec<String> = fields.into_iter().collect();
            let context = map_row(&fields, &values, &[], &DateStyle::DayMonthYear, today());

            prop_assert_eq!(context.len(), fields.len() + 1);
            for (i, field) in fields.iter().enumerate() {
                let expected = values.get(i).map(|s| s.as_str()).unwrap_or("");
                prop_assert_eq!(context.get(field), Some(expected));
            }
        }

        #[test]
        fn prop_cur_date_shape(day in 1u32..=28, month in 1u32..=12, year in 1990i32..2100) {
            let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
            let transcript = map_row(&NONE, &[], &[], &DateStyle::DayMonthYear, date);
            let degree = map_row(&NONE, &[], &[], &DateStyle::DayAbbrevMonthYear, date);

            let re_t = regex::Regex::new(r"^\d{2}-\d{2}-\d{4}$").unwrap();
            let re_d = regex::Regex::new(r"^\d{2} [A-Z][a-z]{2} \d{4}$").unwrap();
            prop_assert!(re_t.is_match(transcript.get("cur_date").unwrap()));
            prop_assert!(re_d.is_match(degree.get("cur_date").unwrap()));
        }
    }
}
