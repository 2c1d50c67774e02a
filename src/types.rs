//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::PathBuf;

/// セルの値を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 数値（f64）
    Number(f64),

    /// 文字列
    String(String),

    /// 論理値
    Bool(bool),

    /// 日時
    DateTime(NaiveDateTime),

    /// エラー値（例: #DIV/0!）
    Error(String),

    /// 空セル
    Empty,
}

impl CellValue {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// テンプレートに差し込む文字列表現
    ///
    /// 整数値の浮動小数点数は小数部なしで出力します（`2024.0` → `2024`）。
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::String(s) => s.clone(),
            CellValue::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Error(e) => e.clone(),
            CellValue::Empty => String::new(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// スプレッドシートの1行（ヘッダー行を除く）
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    /// スプレッドシート上の行番号（1始まり、ヘッダーが1行目）
    pub number: usize,

    /// セル値（列順）
    pub cells: Vec<CellValue>,
}

impl SheetRow {
    /// セル値を文字列として取得
    pub fn values(&self) -> Vec<String> {
        self.cells.iter().map(CellValue::to_display_string).collect()
    }
}

/// 行単位の失敗情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    /// スプレッドシート上の行番号、またはPDF変換時はファイル名
    pub item: String,

    /// エラーメッセージ
    pub message: String,
}

/// バッチ処理の結果
///
/// 生成されたファイルと、スキップされた行の一覧を保持します。
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// 生成されたファイルのパス
    pub generated: Vec<PathBuf>,

    /// 失敗した行
    pub failures: Vec<RowFailure>,
}

impl BatchReport {
    /// 空のレポートを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// 失敗が1件もないかどうか
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// 生成件数
    pub fn generated_count(&self) -> usize {
        self.generated.len()
    }

    pub(crate) fn record_success(&mut self, path: PathBuf) {
        self.generated.push(path);
    }

    pub(crate) fn record_failure(&mut self, item: impl Into<String>, message: impl Into<String>) {
        self.failures.push(RowFailure {
            item: item.into(),
            message: message.into(),
        });
    }
}
