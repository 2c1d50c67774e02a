//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DocGenError;

/// 生成する書類の種類
///
/// 種類ごとに既定の[`DocumentProfile`](crate::DocumentProfile)と出力先ディレクトリが決まります。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DocumentKind {
    /// 成績証明書（Word）
    Transcript,

    /// 準学士の学位記（Word、クメール数字の差し込みあり）
    Degree,

    /// 修了証（画像テンプレートへの氏名描画）
    Certificate,
}

impl DocumentKind {
    /// すべての書類種別
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::Transcript,
        DocumentKind::Degree,
        DocumentKind::Certificate,
    ];

    /// 表示用の名前
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Transcript => "transcript",
            DocumentKind::Degree => "degree",
            DocumentKind::Certificate => "certificate",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// `cur_date`の出力形式
///
/// 成績証明書と学位記では異なる形式を使用します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DateStyle {
    /// 日-月-年（`%d-%m-%Y`）
    ///
    /// 例: `16-10-2026`
    DayMonthYear,

    /// 日 月略称 年（`%d %b %Y`）
    ///
    /// 例: `16 Oct 2026`
    DayAbbrevMonthYear,

    /// カスタム形式（chrono互換フォーマット文字列）
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use xlsxmerge::DateStyle;
    ///
    /// let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    /// let style = DateStyle::Custom("%Y/%m/%d".to_string());
    /// assert_eq!(style.format(date), "2026/10/16");
    /// ```
    Custom(String),
}

impl DateStyle {
    /// chrono互換のフォーマット文字列を取得
    pub fn pattern(&self) -> &str {
        match self {
            DateStyle::DayMonthYear => "%d-%m-%Y",
            DateStyle::DayAbbrevMonthYear => "%d %b %Y",
            DateStyle::Custom(pattern) => pattern,
        }
    }

    /// 日付をフォーマット
    ///
    /// 不正なフォーマット文字列は事前に[`DateStyle::validate`]で弾いておくこと。
    pub fn format(&self, date: NaiveDate) -> String {
        date.format(self.pattern()).to_string()
    }

    /// フォーマット文字列を検証
    ///
    /// # 発生し得るエラー
    ///
    /// * `DocGenError::Config` - 解釈できない指定子を含む場合、または出力が空になる場合
    pub fn validate(&self) -> Result<(), DocGenError> {
        let pattern = self.pattern();
        let has_error = StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error));
        if has_error {
            return Err(DocGenError::Config(format!(
                "Invalid date format string: '{}'",
                pattern
            )));
        }

        // テスト用の日付でフォーマット試行
        let probe = NaiveDate::from_ymd_opt(2025, 1, 1)
            .ok_or_else(|| DocGenError::Config("Failed to create test date".to_string()))?;
        if self.format(probe).trim().is_empty() {
            return Err(DocGenError::Config(format!(
                "Date format string produces empty output: '{}'",
                pattern
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn test_day_month_year() {
        assert_eq!(DateStyle::DayMonthYear.format(date()), "05-03-2024");
    }

    #[test]
    fn test_day_abbrev_month_year() {
        assert_eq!(DateStyle::DayAbbrevMonthYear.format(date()), "05 Mar 2024");
    }

    #[test]
    fn test_custom_pattern() {
        let style = DateStyle::Custom("%Y年%m月%d日".to_string());
        assert_eq!(style.format(date()), "2024年03月05日");
    }

    #[test]
    fn test_validate() {
        assert!(DateStyle::DayMonthYear.validate().is_ok());
        assert!(DateStyle::DayAbbrevMonthYear.validate().is_ok());
        assert!(DateStyle::Custom("%Y".to_string()).validate().is_ok());
        assert!(matches!(
            DateStyle::Custom(String::new()).validate(),
            Err(DocGenError::Config(_))
        ));
        assert!(matches!(
            DateStyle::Custom("%Y-%".to_string()).validate(),
            Err(DocGenError::Config(_))
        ));
    }

    #[test]
    fn test_document_kind_serde() {
        let json = serde_json::to_string(&DocumentKind::Degree).unwrap();
        assert_eq!(json, "\"degree\"");
        let kind: DocumentKind = serde_json::from_str("\"transcript\"").unwrap();
        assert_eq!(kind, DocumentKind::Transcript);
    }
}
