//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// xlsxmergeクレート全体で使用するエラー型
///
/// スプレッドシートの読み込み、テンプレートの差し込み、証明書画像の描画、
/// PDF変換の各処理で発生するエラーを統一的に扱います。
///
/// # バッチ処理との関係
///
/// バッチ全体を中断させるエラー（スプレッドシートの読み込み失敗など）は
/// `Err`として呼び出し元に返されます。行単位のエラーは
/// [`BatchReport`](crate::BatchReport)に記録され、バッチは継続します。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxmerge::DocGenError;
/// use std::fs::File;
///
/// fn open_template(path: &str) -> Result<(), DocGenError> {
///     let _file = File::open(path)?;  // Ioエラーが自動的に変換される
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum DocGenError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// スプレッドシートの解析中に発生したエラー（calamine由来）
    #[error("Failed to load spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// ZIPアーカイブ（.docx）の読み書きエラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// テンプレート内のXMLが不正
    #[error("Malformed XML in '{part}': {message}")]
    Xml {
        /// アーカイブ内のパス（例: `word/document.xml`）
        part: String,
        /// quick-xmlのエラーメッセージ
        message: String,
    },

    /// テンプレートの構造が不正（必須パートの欠落など）
    #[error("Invalid template: {0}")]
    Template(String),

    /// 画像のデコード・エンコードエラー
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// フォントの読み込みエラー
    #[error("Font error: {0}")]
    Font(String),

    /// 設定の検証に失敗したエラー
    ///
    /// `GeneratorBuilder::build()`時の検証や、プロファイルの検証で発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// 前提条件が満たされていない（テンプレート未指定など）
    #[error("Missing prerequisite: {0}")]
    MissingPrerequisite(String),

    /// ヘッダー行に必要な列が存在しない
    #[error("Column '{0}' not found in header row")]
    MissingColumn(String),

    /// PDF変換エンジンのエラー
    #[error("Conversion failed for '{file}': {message}")]
    Conversion {
        /// 変換元ファイル
        file: String,
        /// 変換エンジンの出力
        message: String,
    },

    /// プロファイルファイルのJSONエラー
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb、パストラバーサル、ファイルサイズ制限などに違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl From<zip::result::ZipError> for DocGenError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => DocGenError::Io(e),
            other => DocGenError::Zip(format!("{}", other)),
        }
    }
}
