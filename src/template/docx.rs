//! Word Template
//!
//! .docx（ZIPアーカイブ）を読み込み、本文・ヘッダー・フッターなどのWordMLパートに
//! 差し込みを行って新しい.docxとして書き出します。

use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::collections::BTreeSet;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::placeholder;
use crate::context::Context;
use crate::error::DocGenError;
use crate::security::SecurityConfig;

/// 本文パート
pub(crate) const DOCUMENT_PART: &str = "word/document.xml";

/// 差し込み対象のパート
static TEMPLATE_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^word/(document|header\d*|footer\d*|footnotes|endnotes)\.xml$").unwrap()
});

/// アーカイブ内の1エントリ
#[derive(Debug, Clone)]
enum Entry {
    /// ディレクトリエントリ
    Directory { name: String },
    /// 差し込み対象外のファイル（そのままコピー）
    Binary {
        name: String,
        compression: CompressionMethod,
        data: Vec<u8>,
    },
    /// 差し込み対象のWordMLパート
    Part {
        name: String,
        compression: CompressionMethod,
        xml: String,
    },
}

/// 読み込み済みのWordテンプレート
///
/// バッチ処理ではテンプレートを1回だけ読み込み、行ごとに[`render`](Self::render)を呼び出します。
///
/// # 使用例
///
/// ```rust,no_run
/// use std::path::Path;
/// use xlsxmerge::{Context, DocxTemplate};
///
/// # fn main() -> Result<(), xlsxmerge::DocGenError> {
/// let template = DocxTemplate::open(Path::new("transcript.docx"))?;
/// let mut context = Context::new();
/// context.insert("first_name", "Sok");
/// template.render_to_path(&context, Path::new("Transcripts_Word/Sok.docx"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DocxTemplate {
    entries: Vec<Entry>,
}

impl DocxTemplate {
    /// テンプレートファイルを読み込む
    ///
    /// # 発生し得るエラー
    ///
    /// * `DocGenError::Io` - ファイルが存在しない、読み込めない場合
    /// * `DocGenError::Zip` - ZIPアーカイブとして不正な場合
    /// * `DocGenError::Template` - `word/document.xml`が存在しない場合
    /// * `DocGenError::Xml` - WordMLパートのXMLが不正な場合
    /// * `DocGenError::SecurityViolation` - サイズ・ファイル数・パスの制限に違反した場合
    pub fn open(path: &Path) -> Result<Self, DocGenError> {
        let security_config = SecurityConfig::default();
        let size = std::fs::metadata(path)?.len();
        security_config.check_input_size(size)?;

        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// リーダーからテンプレートを読み込む
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, DocGenError> {
        let security_config = SecurityConfig::default();

        let mut archive = ZipArchive::new(reader)?;
        security_config.check_file_count(archive.len())?;

        let mut entries = Vec::with_capacity(archive.len());
        let mut total_decompressed_size = 0u64;
        let mut has_document = false;

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();
            security_config.check_entry(&name, file.size(), &mut total_decompressed_size)?;

            if file.is_dir() {
                entries.push(Entry::Directory { name });
                continue;
            }

            let compression = file.compression();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;

            if TEMPLATE_PART.is_match(&name) {
                let xml = String::from_utf8(data).map_err(|e| {
                    DocGenError::Template(format!("'{}' is not valid UTF-8: {}", name, e))
                })?;
                check_well_formed(&name, &xml)?;
                has_document |= name == DOCUMENT_PART;
                entries.push(Entry::Part {
                    name,
                    compression,
                    xml,
                });
            } else {
                entries.push(Entry::Binary {
                    name,
                    compression,
                    data,
                });
            }
        }

        if !has_document {
            return Err(DocGenError::Template(format!(
                "'{}' not found in archive",
                DOCUMENT_PART
            )));
        }

        Ok(Self { entries })
    }

    /// テンプレート中のプレースホルダーのキー一覧
    pub fn placeholders(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Part { xml, .. } => Some(placeholder::placeholders(xml)),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// 差し込みを行い、.docxのバイト列を返す
    pub fn render(&self, context: &Context) -> Result<Vec<u8>, DocGenError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            match entry {
                Entry::Directory { name } => {
                    zip.add_directory(name.clone(), FileOptions::default())?;
                }
                Entry::Binary {
                    name,
                    compression,
                    data,
                } => {
                    zip.start_file(name.clone(), file_options(*compression))?;
                    zip.write_all(data)?;
                }
                Entry::Part {
                    name,
                    compression,
                    xml,
                } => {
                    let rendered = placeholder::substitute(xml, context);
                    check_well_formed(name, &rendered)?;
                    zip.start_file(name.clone(), file_options(*compression))?;
                    zip.write_all(rendered.as_bytes())?;
                }
            }
        }

        Ok(zip.finish()?.into_inner())
    }

    /// 差し込みを行い、ファイルに書き出す
    ///
    /// 既存のファイルは上書きされます。親ディレクトリは事前に作成しておく必要があります。
    pub fn render_to_path(&self, context: &Context, output: &Path) -> Result<(), DocGenError> {
        let bytes = self.render(context)?;
        std::fs::write(output, bytes)?;
        tracing::info!(path = %output.display(), "document saved");
        Ok(())
    }
}

/// テンプレートを読み込み、1件分の差し込みを行って書き出す
///
/// バッチ処理では[`DocxTemplate`]を使ってテンプレートの読み込みを1回にまとめます。
pub fn render(template: &Path, context: &Context, output: &Path) -> Result<(), DocGenError> {
    DocxTemplate::open(template)?.render_to_path(context, output)
}

fn file_options(compression: CompressionMethod) -> FileOptions {
    let method = match compression {
        CompressionMethod::Stored => CompressionMethod::Stored,
        _ => CompressionMethod::Deflated,
    };
    FileOptions::default().compression_method(method)
}

/// XMLが整形式かどうかを検証
fn check_well_formed(part: &str, xml: &str) -> Result<(), DocGenError> {
    let mut reader = Reader::from_str(xml);
    reader.check_end_names(true);

    let mut depth = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(DocGenError::Xml {
                    part: part.to_string(),
                    message: format!("{} at position {}", e, reader.buffer_position()),
                })
            }
        }
    }

    if depth != 0 {
        return Err(DocGenError::Xml {
            part: part.to_string(),
            message: format!("{} unclosed element(s) at end of document", depth),
        });
    }
    Ok(())
}
