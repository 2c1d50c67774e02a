//! Parser Module
//!
//! calamineを使用したスプレッドシート読み込みの実装。
//! 位置ベースの行と、ヘッダー名で引ける行ビューの両方を提供します。

mod workbook;

pub use workbook::{Record, Spreadsheet};
