//! PDF Conversion Module
//!
//! 生成済みの.docxをPDFに変換するモジュール。
//! 変換エンジンは[`PdfConverter`]トレイトで差し替え可能で、既定ではLibreOfficeを使用します。

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::DocGenError;
use crate::types::BatchReport;

/// 変換対象の拡張子
const DOCX_EXTENSION: &str = "docx";

/// LibreOfficeの既定コマンド名
pub const DEFAULT_SOFFICE: &str = "soffice";

/// 1ファイルをPDFに変換するエンジン
pub trait PdfConverter {
    /// `input`を変換して`output`に書き出す
    ///
    /// `output`の親ディレクトリは呼び出し側で作成済みです。
    fn convert(&self, input: &Path, output: &Path) -> Result<(), DocGenError>;
}

/// LibreOffice（`soffice --headless`）による変換
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficeConverter {
    program: PathBuf,
}

impl Default for OfficeConverter {
    fn default() -> Self {
        Self::new(DEFAULT_SOFFICE)
    }
}

impl OfficeConverter {
    /// 実行ファイルを指定して生成
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// 実行ファイル
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl PdfConverter for OfficeConverter {
    fn convert(&self, input: &Path, output: &Path) -> Result<(), DocGenError> {
        let conversion_error = |message: String| DocGenError::Conversion {
            file: input.display().to_string(),
            message,
        };

        let out_dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let result = Command::new(&self.program)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(out_dir)
            .arg(input)
            .output()
            .map_err(|e| {
                conversion_error(format!(
                    "failed to execute '{}': {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(conversion_error(format!(
                "{} ({})",
                stderr.trim(),
                result.status
            )));
        }

        // LibreOfficeは入力ファイル名の拡張子を.pdfに変えた名前で出力する
        let stem = input
            .file_stem()
            .ok_or_else(|| conversion_error("invalid input file name".to_string()))?;
        // 語幹に含まれる"."を拡張子とみなさないよう、名前を直接組み立てる
        let mut pdf_name = stem.to_os_string();
        pdf_name.push(".pdf");
        let produced = out_dir.join(pdf_name);

        if !produced.is_file() {
            return Err(conversion_error(format!(
                "converted PDF not found at {}",
                produced.display()
            )));
        }
        if produced != output {
            std::fs::rename(&produced, output)?;
        }
        Ok(())
    }
}

/// `input_dir`内の.docxをすべてPDFに変換して`output_dir`に書き出す
///
/// # 処理内容
///
/// * `input_dir`が存在しない場合は何もせず、空のレポートを返す（`output_dir`も作成しない）
/// * `output_dir`を作成し、ファイル名順に1件ずつ変換する
/// * 変換に失敗したファイルはレポートに記録し、残りのファイルの変換を続ける
///
/// # 発生し得るエラー
///
/// * `DocGenError::Io` - `output_dir`の作成、`input_dir`の走査に失敗した場合
pub fn convert_all<C: PdfConverter + ?Sized>(
    converter: &C,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<BatchReport, DocGenError> {
    let mut report = BatchReport::new();

    if !input_dir.is_dir() {
        tracing::info!(dir = %input_dir.display(), "input directory does not exist");
        return Ok(report);
    }

    std::fs::create_dir_all(output_dir)?;

    let mut inputs = Vec::new();
    for entry in std::fs::read_dir(input_dir)? {
        let path = entry?.path();
        let is_docx = path
            .extension()
            .map(|ext| ext == DOCX_EXTENSION)
            .unwrap_or(false);
        if path.is_file() && is_docx {
            inputs.push(path);
        }
    }
    inputs.sort();

    tracing::info!(count = inputs.len(), dir = %input_dir.display(), "converting documents to PDF");

    for input in inputs {
        let file_name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output = output_dir.join(Path::new(&file_name).with_extension("pdf"));

        match converter.convert(&input, &output) {
            Ok(()) => {
                tracing::info!(path = %output.display(), "converted to PDF");
                report.record_success(output);
            }
            Err(e) => {
                tracing::warn!(file = %file_name, error = %e, "conversion failed, skipping");
                report.record_failure(file_name, e.to_string());
            }
        }
    }

    Ok(report)
}
