//! Workbook Reader
//!
//! calamineを使用してワークブックの最初のシートを読み込み、
//! ヘッダー行とデータ行に分けて保持します。

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use crate::error::DocGenError;
use crate::types::{CellValue, SheetRow};

/// 読み込み済みのシート
///
/// 先頭行をヘッダーとして扱い、2行目以降をデータ行として保持します。
/// データの開始位置がA列でない場合は、左側を空セルで埋めて列位置をA列基準に揃えます。
#[derive(Debug, Clone, Default)]
pub struct Spreadsheet {
    /// ヘッダー行（文字列化済み）
    header: Vec<String>,
    /// データ行
    rows: Vec<SheetRow>,
}

impl Spreadsheet {
    /// ファイルを開き、最初のシートを読み込む
    ///
    /// # 発生し得るエラー
    ///
    /// * `DocGenError::Spreadsheet` - ファイルが存在しない、形式が不正、シートがない場合
    pub fn open(path: &Path) -> Result<Self, DocGenError> {
        let mut workbook = open_workbook_auto(path)?;
        Self::from_sheets(&mut workbook)
    }

    /// メモリ上のワークブックから読み込む
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self, DocGenError> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;
        Self::from_sheets(&mut workbook)
    }

    fn from_sheets<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<Self, DocGenError> {
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| calamine::Error::Msg("Workbook contains no worksheets"))??;
        Ok(Self::from_range(&range))
    }

    fn from_range(range: &Range<Data>) -> Self {
        let (start_row, start_col) = match range.start() {
            Some((row, col)) => (row as usize, col as usize),
            None => return Self::default(),
        };

        let mut rows = range.rows().enumerate().map(|(idx, cells)| {
            let mut values = vec![CellValue::Empty; start_col];
            values.extend(cells.iter().map(convert_cell));
            SheetRow {
                number: start_row + idx + 1,
                cells: values,
            }
        });

        let header = rows.next().map(|row| row.values()).unwrap_or_default();

        let rows = rows
            .filter(|row| {
                let blank = row.cells.iter().all(CellValue::is_empty);
                if blank {
                    tracing::debug!(row = row.number, "skipping blank row");
                }
                !blank
            })
            .collect();

        Self { header, rows }
    }

    /// ヘッダー行
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// データ行（ヘッダーを除く）
    pub fn rows(&self) -> &[SheetRow] {
        &self.rows
    }

    /// ヘッダー名から列インデックスを取得
    ///
    /// 前後の空白は無視します。
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h.trim() == name)
    }

    /// ヘッダー名で値を引けるレコードとして走査
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(move |row| Record {
            header: &self.header,
            row,
        })
    }
}

/// ヘッダー名で列を参照できる行ビュー
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    header: &'a [String],
    row: &'a SheetRow,
}

impl<'a> Record<'a> {
    /// スプレッドシート上の行番号（1始まり）
    pub fn number(&self) -> usize {
        self.row.number
    }

    /// ヘッダー名で値を取得
    ///
    /// 列が存在しない場合は`None`、列はあるが行が短い場合は空セルを返します。
    pub fn get(&self, name: &str) -> Option<&'a CellValue> {
        const EMPTY: &CellValue = &CellValue::Empty;
        let idx = self.header.iter().position(|h| h.trim() == name)?;
        Some(self.row.cells.get(idx).unwrap_or(EMPTY))
    }
}

/// calamineのセル値を変換
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::Empty => CellValue::Empty,
        #[allow(unreachable_patterns)]
        _ => CellValue::Empty,
    }
}
