//! Template Module
//!
//! Wordテンプレート（.docx）への差し込み処理を提供するモジュール。

mod docx;
mod placeholder;

pub use docx::{render, DocxTemplate};
