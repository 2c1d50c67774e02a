//! Document Profile Module
//!
//! 書類の種類ごとの設定レコード（フィールド名リスト、日付形式、出力ファイル名など）を
//! 定義するモジュール。書類の種類を追加する場合はレコードを追加するだけで済みます。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::api::{DateStyle, DocumentKind};
use crate::context::{Context, CUR_DATE_KEY};
use crate::error::DocGenError;

/// ファイル名パターン中の`{field}`
static NAME_FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").unwrap());

/// ファイル名の最大長（バイト）
const MAX_FILE_NAME_BYTES: usize = 255;

/// 文字の境界を保ったまま`max`バイト以下に切り詰める
fn truncate_to_boundary(name: &mut String, max: usize) {
    if name.len() <= max {
        return;
    }
    let mut end = max;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name.truncate(end);
}

const TRANSCRIPT_FIELDS: &[&str] = &[
    "student_id", "first_name", "last_name", "logic", "l_g", "bcum", "bc_g", "design",
    "d_g", "p1", "p1_g", "e1", "e1_g", "wd", "wd_g", "algo", "al_g", "p2", "p2_g", "e2",
    "e2_g", "sd", "sd_g", "js", "js_g", "php", "ph_g", "db", "db_g", "vc1", "v1_g", "node",
    "no_g", "e3", "e3_g", "p3", "p3_g", "oop", "op_g", "lar", "lar_g", "vue", "vu_g", "vc2",
    "v2_g", "e4", "e4_g", "p4", "p4_g", "int", "in_g",
];

const DEGREE_FIELDS: &[&str] = &[
    "name_kh", "name_e", "g1", "g2", "id_kh", "id_e", "dob_kh", "dob_e", "pro_kh", "pro_e",
    "ed_kh", "ed_e",
];

/// 学位記でクメール数字に変換するフィールド
const DEGREE_KHMER_FIELDS: &[&str] = &["id_kh", "dob_kh", "ed_kh"];

/// 修了証で氏名を読み取る列
pub const STUDENT_NAME_KEY: &str = "student_name";

/// 書類の種類ごとの設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentProfile {
    /// 書類の種類
    pub kind: DocumentKind,

    /// フィールド名リスト（列順）
    ///
    /// 修了証ではヘッダー名で列を引くため、`student_name`のみ。
    pub fields: Vec<String>,

    /// クメール数字に変換するフィールド
    #[serde(default)]
    pub transliterate: Vec<String>,

    /// `cur_date`の形式
    pub date_style: DateStyle,

    /// 出力ファイル名のパターン（例: `{first_name}_{last_name}.docx`）
    pub file_name: String,

    /// 生成物の出力ディレクトリ（出力ルートからの相対パス）
    pub output_dir: String,

    /// PDFの出力ディレクトリ（PDF変換を行わない書類では`None`）
    #[serde(default)]
    pub pdf_dir: Option<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl DocumentProfile {
    /// 成績証明書の既定プロファイル
    pub fn transcript() -> Self {
        Self {
            kind: DocumentKind::Transcript,
            fields: strings(TRANSCRIPT_FIELDS),
            transliterate: Vec::new(),
            date_style: DateStyle::DayMonthYear,
            file_name: "{first_name}_{last_name}.docx".to_string(),
            output_dir: "Transcripts_Word".to_string(),
            pdf_dir: Some("Transcripts_PDF".to_string()),
        }
    }

    /// 学位記の既定プロファイル
    pub fn degree() -> Self {
        Self {
            kind: DocumentKind::Degree,
            fields: strings(DEGREE_FIELDS),
            transliterate: strings(DEGREE_KHMER_FIELDS),
            date_style: DateStyle::DayAbbrevMonthYear,
            file_name: "{name_e}_{id_e}_degree.docx".to_string(),
            output_dir: "Degrees_Word".to_string(),
            pdf_dir: Some("Degrees_PDF".to_string()),
        }
    }

    /// 修了証の既定プロファイル
    pub fn certificate() -> Self {
        Self {
            kind: DocumentKind::Certificate,
            fields: vec![STUDENT_NAME_KEY.to_string()],
            transliterate: Vec::new(),
            date_style: DateStyle::DayMonthYear,
            file_name: "certificate_{student_name}.png".to_string(),
            output_dir: "Certificates_Images".to_string(),
            pdf_dir: None,
        }
    }

    /// 書類の種類に対応する既定プロファイル
    pub fn builtin(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Transcript => Self::transcript(),
            DocumentKind::Degree => Self::degree(),
            DocumentKind::Certificate => Self::certificate(),
        }
    }

    /// 出力ファイルの拡張子
    pub fn extension(&self) -> &'static str {
        match self.kind {
            DocumentKind::Certificate => ".png",
            _ => ".docx",
        }
    }

    /// ファイル名パターンが参照するフィールド名
    pub fn name_fields(&self) -> Vec<&str> {
        NAME_FIELD
            .captures_iter(&self.file_name)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect()
    }

    /// 設定を検証
    ///
    /// # 発生し得るエラー
    ///
    /// * `DocGenError::Config` - 以下の場合
    ///   * フィールド名リストが空、または重複がある
    ///   * ファイル名パターンが未知のフィールドを参照している
    ///   * ファイル名パターンの拡張子が書類の種類と一致しない
    ///   * 日付形式が不正
    ///   * 出力ディレクトリが空
    pub fn validate(&self) -> Result<(), DocGenError> {
        if self.fields.is_empty() {
            return Err(DocGenError::Config(format!(
                "Profile '{}' has no fields",
                self.kind
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.as_str()) {
                return Err(DocGenError::Config(format!(
                    "Profile '{}' declares field '{}' twice",
                    self.kind, field
                )));
            }
        }

        for name in self.name_fields() {
            if name != CUR_DATE_KEY && !seen.contains(name) {
                return Err(DocGenError::Config(format!(
                    "File name pattern '{}' references unknown field '{}'",
                    self.file_name, name
                )));
            }
        }

        if !self.file_name.ends_with(self.extension()) {
            return Err(DocGenError::Config(format!(
                "File name pattern '{}' must end with '{}'",
                self.file_name,
                self.extension()
            )));
        }

        self.date_style.validate()?;

        if self.output_dir.trim().is_empty() {
            return Err(DocGenError::Config(format!(
                "Profile '{}' has an empty output directory",
                self.kind
            )));
        }

        Ok(())
    }

    /// コンテキストから出力ファイル名を生成
    ///
    /// パターン中の`{field}`をコンテキストの値で置き換え、ファイル名として
    /// 使用できない文字を除去します。
    ///
    /// # 発生し得るエラー
    ///
    /// * `DocGenError::Config` - 生成結果が拡張子のみになった場合（名前欄が空の行など）
    pub fn output_file_name(&self, context: &Context) -> Result<String, DocGenError> {
        let raw = NAME_FIELD.replace_all(&self.file_name, |caps: &regex::Captures| {
            context.get(&caps[1]).unwrap_or("").to_string()
        });
        let extension = self.extension();
        let raw_stem = raw.strip_suffix(extension).unwrap_or(&raw);

        // 拡張子が切り捨てられないよう、語幹だけを無害化して長さを詰める
        let options = sanitize_filename::Options {
            truncate: false,
            ..Default::default()
        };
        let mut stem = sanitize_filename::sanitize_with_options(raw_stem, options);
        truncate_to_boundary(&mut stem, MAX_FILE_NAME_BYTES - extension.len());

        if stem.trim_matches(|c: char| c == '_' || c.is_whitespace()).is_empty() {
            return Err(DocGenError::Config(format!(
                "Row produces an empty file name from pattern '{}'",
                self.file_name
            )));
        }
        Ok(format!("{}{}", stem, extension))
    }
}

/// 書類の種類ごとのプロファイル一覧
///
/// JSONファイルから読み込んだ場合、ファイルに含まれない種類は既定値のままです。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSet {
    profiles: BTreeMap<DocumentKind, DocumentProfile>,
}

impl Default for ProfileSet {
    fn default() -> Self {
        let profiles = DocumentKind::ALL
            .iter()
            .map(|&kind| (kind, DocumentProfile::builtin(kind)))
            .collect();
        Self { profiles }
    }
}

impl ProfileSet {
    /// プロファイルを取得
    pub fn get(&self, kind: DocumentKind) -> &DocumentProfile {
        // Defaultで全種類を登録済み
        &self.profiles[&kind]
    }

    /// プロファイルを差し替える
    pub fn set(&mut self, profile: DocumentProfile) {
        self.profiles.insert(profile.kind, profile);
    }

    /// すべてのプロファイル
    pub fn iter(&self) -> impl Iterator<Item = &DocumentProfile> {
        self.profiles.values()
    }

    /// JSON配列からプロファイルを読み込む
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxmerge::{DocumentKind, ProfileSet};
    ///
    /// let json = r#"[{
    ///     "kind": "transcript",
    ///     "fields": ["student_id", "first_name", "last_name"],
    ///     "date_style": "day_month_year",
    ///     "file_name": "{student_id}.docx",
    ///     "output_dir": "Out"
    /// }]"#;
    /// let profiles = ProfileSet::from_json(json).unwrap();
    /// assert_eq!(profiles.get(DocumentKind::Transcript).fields.len(), 3);
    /// assert_eq!(profiles.get(DocumentKind::Degree).fields.len(), 12);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, DocGenError> {
        let overrides: Vec<DocumentProfile> = serde_json::from_str(json)?;
        let mut set = Self::default();
        for profile in overrides {
            profile.validate()?;
            set.set(profile);
        }
        Ok(set)
    }

    /// JSONファイルからプロファイルを読み込む
    pub fn from_path(path: &Path) -> Result<Self, DocGenError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
