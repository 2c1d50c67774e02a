//! Builder Module
//!
//! Fluent Builder APIを提供し、`Generator`インスタンスを段階的に構築する。

use crate::api::DocumentKind;
use crate::certificate::{self, CertificateRenderer, CertificateStyle, DEFAULT_FONT};
use crate::context::{map_row, Context, CUR_DATE_KEY};
use crate::convert::{convert_all, PdfConverter};
use crate::error::DocGenError;
use crate::parser::Spreadsheet;
use crate::profile::{DocumentProfile, ProfileSet, STUDENT_NAME_KEY};
use crate::template::DocxTemplate;
use crate::types::BatchReport;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// 生成処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct GenerationConfig {
    /// 出力ルート（各書類の出力ディレクトリの基準）
    pub output_root: PathBuf,

    /// `cur_date`に使う日付（Noneの場合は実行時のローカル日付）
    pub today: Option<NaiveDate>,

    /// 修了証のフォント
    pub font_path: PathBuf,

    /// 修了証の描画スタイル
    pub certificate_style: CertificateStyle,

    /// 書類の種類ごとのプロファイル
    pub profiles: ProfileSet,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            today: None,
            font_path: PathBuf::from(DEFAULT_FONT),
            certificate_style: CertificateStyle::default(),
            profiles: ProfileSet::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Generator`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use chrono::NaiveDate;
/// use xlsxmerge::GeneratorBuilder;
///
/// # fn main() -> Result<(), xlsxmerge::DocGenError> {
/// let generator = GeneratorBuilder::new()
///     .with_output_root("out")
///     .with_today(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GeneratorBuilder {
    /// 内部設定（構築中）
    config: GenerationConfig,
}

impl Default for GeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 出力ルート: カレントディレクトリ
    /// - 日付: 実行時のローカル日付
    /// - フォント: `arialbd.ttf`
    /// - 修了証スタイル: 90px、上端から620px、オレンジ
    /// - プロファイル: 組み込みの成績証明書・学位記・修了証
    pub fn new() -> Self {
        Self {
            config: GenerationConfig::default(),
        }
    }

    /// 出力ルートを指定する
    ///
    /// `Transcripts_Word`などの出力ディレクトリはこのディレクトリの下に作成されます。
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.output_root = root.into();
        self
    }

    /// `cur_date`に使う日付を固定する
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.config.today = Some(today);
        self
    }

    /// 修了証に使うフォントを指定する
    ///
    /// ファイル名のみを指定した場合は、カレントディレクトリとシステムのフォントディレクトリから探します。
    pub fn with_font_path(mut self, font: impl Into<PathBuf>) -> Self {
        self.config.font_path = font.into();
        self
    }

    /// 修了証の描画スタイルを指定する
    pub fn with_certificate_style(mut self, style: CertificateStyle) -> Self {
        self.config.certificate_style = style;
        self
    }

    /// 組み込みのプロファイルを差し替える
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use xlsxmerge::{DocumentProfile, GeneratorBuilder};
    ///
    /// let mut profile = DocumentProfile::transcript();
    /// profile.file_name = "{student_id}.docx".to_string();
    /// let builder = GeneratorBuilder::new().with_profile(profile);
    /// ```
    pub fn with_profile(mut self, profile: DocumentProfile) -> Self {
        self.config.profiles.set(profile);
        self
    }

    /// プロファイル一覧をまとめて差し替える
    pub fn with_profiles(mut self, profiles: ProfileSet) -> Self {
        self.config.profiles = profiles;
        self
    }

    /// 設定を検証し、`Generator`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `DocGenError::Config(String)`: 設定の検証に失敗した場合
    ///   * プロファイルのファイル名パターンが未知のフィールドを参照している
    ///   * カスタム日付形式が不正な書式文字列
    ///   * 修了証の文字サイズが正でない
    pub fn build(self) -> Result<Generator, DocGenError> {
        // 1. プロファイルの検証
        for profile in self.config.profiles.iter() {
            profile.validate()?;
        }

        // 2. 修了証スタイルの検証
        let font_size = self.config.certificate_style.font_size;
        if !(font_size.is_finite() && font_size > 0.0) {
            return Err(DocGenError::Config(format!(
                "Certificate font size must be positive: {}",
                font_size
            )));
        }

        // 3. Generatorインスタンス生成
        Ok(Generator::new(self.config))
    }
}

/// 書類生成のファサード
///
/// スプレッドシートの各行をテンプレートに差し込み、書類を一括生成するためのメインエントリーポイントです。
/// `GeneratorBuilder`を使用して構築された設定に基づいて処理を実行します。
///
/// # 使用例
///
/// ```rust,no_run
/// use std::path::Path;
/// use xlsxmerge::GeneratorBuilder;
///
/// # fn main() -> Result<(), xlsxmerge::DocGenError> {
/// let generator = GeneratorBuilder::new().build()?;
/// let report = generator.generate_transcripts(
///     Path::new("students.xlsx"),
///     Path::new("transcript.docx"),
/// )?;
/// println!("{} documents generated", report.generated_count());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Generator {
    /// 生成設定
    config: GenerationConfig,
}

impl Generator {
    pub(crate) fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    /// プロファイル一覧
    pub fn profiles(&self) -> &ProfileSet {
        &self.config.profiles
    }

    /// `cur_date`に使う日付
    pub fn today(&self) -> NaiveDate {
        self.config
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// 書類の出力ディレクトリ
    pub fn output_dir(&self, kind: DocumentKind) -> PathBuf {
        self.config
            .output_root
            .join(&self.config.profiles.get(kind).output_dir)
    }

    /// PDFの出力ディレクトリ（PDF変換を行わない書類では`None`）
    pub fn pdf_dir(&self, kind: DocumentKind) -> Option<PathBuf> {
        self.config
            .profiles
            .get(kind)
            .pdf_dir
            .as_ref()
            .map(|dir| self.config.output_root.join(dir))
    }

    /// 成績証明書を一括生成
    pub fn generate_transcripts(
        &self,
        data: &Path,
        template: &Path,
    ) -> Result<BatchReport, DocGenError> {
        self.generate_documents(DocumentKind::Transcript, data, template)
    }

    /// 学位記を一括生成
    pub fn generate_degrees(&self, data: &Path, template: &Path) -> Result<BatchReport, DocGenError> {
        self.generate_documents(DocumentKind::Degree, data, template)
    }

    /// プロファイルに従って書類を一括生成
    ///
    /// # 処理フロー
    ///
    /// 1. スプレッドシートの先頭シートを読み込む（1行目はヘッダーとして読み飛ばす）
    /// 2. テンプレートを読み込む
    /// 3. 出力ディレクトリを作成する
    /// 4. 各行についてコンテキストを構築し、ファイル名を決めて差し込む
    ///
    /// 行単位の失敗はレポートに記録して次の行へ進みます。
    ///
    /// # 発生し得るエラー
    ///
    /// * `DocGenError::Spreadsheet` / `DocGenError::Io` - スプレッドシートを読み込めない場合
    /// * `DocGenError::MissingPrerequisite` - テンプレートが存在しない場合
    /// * `DocGenError::Template` / `DocGenError::Zip` / `DocGenError::Xml` - テンプレートが不正な場合
    pub fn generate_documents(
        &self,
        kind: DocumentKind,
        data: &Path,
        template: &Path,
    ) -> Result<BatchReport, DocGenError> {
        if kind == DocumentKind::Certificate {
            return self.generate_certificates(data, Some(template));
        }

        let profile = self.config.profiles.get(kind);
        tracing::info!(%kind, data = %data.display(), template = %template.display(), "batch started");

        // 1. スプレッドシートの読み込み（失敗したらバッチ全体を中止）
        let sheet = Spreadsheet::open(data)?;

        // 2. テンプレートの読み込み
        if !template.is_file() {
            return Err(DocGenError::MissingPrerequisite(format!(
                "Template not found: {}",
                template.display()
            )));
        }
        let docx = DocxTemplate::open(template)?;
        warn_unknown_placeholders(profile, &docx);

        // 3. 出力ディレクトリの作成
        let out_dir = self.output_dir(kind);
        std::fs::create_dir_all(&out_dir)?;

        // 4. 各行の差し込み
        let today = self.today();
        let mut report = BatchReport::new();
        for row in sheet.rows() {
            let context = map_row(
                &profile.fields,
                &row.values(),
                &profile.transliterate,
                &profile.date_style,
                today,
            );
            tracing::debug!(row = row.number, ?context, "context built");

            let result = profile.output_file_name(&context).and_then(|name| {
                let path = out_dir.join(name);
                docx.render_to_path(&context, &path)?;
                Ok(path)
            });

            match result {
                Ok(path) => report.record_success(path),
                Err(e) => {
                    tracing::warn!(row = row.number, error = %e, "row skipped");
                    report.record_failure(format!("row {}", row.number), e.to_string());
                }
            }
        }

        tracing::info!(
            %kind,
            generated = report.generated_count(),
            failed = report.failures.len(),
            "batch finished"
        );
        Ok(report)
    }

    /// 修了証を一括生成
    ///
    /// `student_name`列の値を画像テンプレートの中央に描画し、PNGとして保存します。
    ///
    /// # 発生し得るエラー
    ///
    /// * `DocGenError::MissingPrerequisite` - テンプレートが指定されていない場合
    /// * `DocGenError::MissingColumn` - `student_name`列が存在しない場合
    /// * `DocGenError::Font` - フォントが見つからない、読み込めない場合
    /// * `DocGenError::Config` / `DocGenError::Image` - テンプレート画像が不正な場合
    pub fn generate_certificates(
        &self,
        data: &Path,
        template: Option<&Path>,
    ) -> Result<BatchReport, DocGenError> {
        let template = template.ok_or_else(|| {
            DocGenError::MissingPrerequisite("Please select a certificate template".to_string())
        })?;

        let kind = DocumentKind::Certificate;
        let profile = self.config.profiles.get(kind);
        tracing::info!(%kind, data = %data.display(), template = %template.display(), "batch started");

        let sheet = Spreadsheet::open(data)?;
        if sheet.column_index(STUDENT_NAME_KEY).is_none() {
            return Err(DocGenError::MissingColumn(STUDENT_NAME_KEY.to_string()));
        }

        let font = certificate::load_font(&self.config.font_path)?;
        let image = certificate::load_template(template)?;
        let renderer = CertificateRenderer::new(font, self.config.certificate_style.clone());

        let out_dir = self.output_dir(kind);
        std::fs::create_dir_all(&out_dir)?;

        let cur_date = profile.date_style.format(self.today());
        let mut report = BatchReport::new();
        for record in sheet.records() {
            let name = record
                .get(STUDENT_NAME_KEY)
                .map(|cell| cell.to_display_string())
                .unwrap_or_default();
            let name = name.trim();

            let result = if name.is_empty() {
                Err(DocGenError::Config("Student name is empty".to_string()))
            } else {
                let mut context = Context::new();
                context.insert(STUDENT_NAME_KEY, name);
                context.insert(CUR_DATE_KEY, cur_date.as_str());
                profile.output_file_name(&context).and_then(|file_name| {
                    let path = out_dir.join(file_name);
                    renderer.render_to_path(&image, name, &path)?;
                    Ok(path)
                })
            };

            match result {
                Ok(path) => report.record_success(path),
                Err(e) => {
                    tracing::warn!(row = record.number(), error = %e, "row skipped");
                    report.record_failure(format!("row {}", record.number()), e.to_string());
                }
            }
        }

        tracing::info!(
            %kind,
            generated = report.generated_count(),
            failed = report.failures.len(),
            "batch finished"
        );
        Ok(report)
    }

    /// 生成済みの書類をPDFに変換
    ///
    /// 出力ディレクトリ内の.docxを変換し、PDFの出力ディレクトリに書き出します。
    /// 出力ディレクトリが存在しない場合は何もしません。
    ///
    /// # 発生し得るエラー
    ///
    /// * `DocGenError::Config` - PDF変換を行わない書類（修了証など）を指定した場合
    pub fn convert_to_pdf<C: PdfConverter + ?Sized>(
        &self,
        kind: DocumentKind,
        converter: &C,
    ) -> Result<BatchReport, DocGenError> {
        let pdf_dir = self.pdf_dir(kind).ok_or_else(|| {
            DocGenError::Config(format!("PDF conversion is not available for {}", kind))
        })?;
        convert_all(converter, &self.output_dir(kind), &pdf_dir)
    }
}

/// プロファイルのフィールドに存在しないプレースホルダーを警告する
///
/// 該当するプレースホルダーは空文字列として差し込まれます。
fn warn_unknown_placeholders(profile: &DocumentProfile, template: &DocxTemplate) {
    for key in template.placeholders() {
        let known = key == CUR_DATE_KEY || profile.fields.iter().any(|f| *f == key);
        if !known {
            tracing::warn!(kind = %profile.kind, placeholder = %key, "placeholder not provided by profile");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DateStyle;

    #[test]
    fn test_generator_builder_new() {
        let builder = GeneratorBuilder::new();
        assert_eq!(builder.config.output_root, PathBuf::from("."));
        assert!(builder.config.today.is_none());
        assert_eq!(builder.config.font_path, PathBuf::from("arialbd.ttf"));
        assert_eq!(builder.config.certificate_style, CertificateStyle::default());
        assert_eq!(builder.config.profiles, ProfileSet::default());
    }

    #[test]
    fn test_with_output_root() {
        let generator = GeneratorBuilder::new()
            .with_output_root("/tmp/out")
            .build()
            .unwrap();
        assert_eq!(
            generator.output_dir(DocumentKind::Transcript),
            PathBuf::from("/tmp/out/Transcripts_Word")
        );
        assert_eq!(
            generator.pdf_dir(DocumentKind::Degree),
            Some(PathBuf::from("/tmp/out/Degrees_PDF"))
        );
        assert_eq!(
            generator.output_dir(DocumentKind::Certificate),
            PathBuf::from("/tmp/out/Certificates_Images")
        );
        assert_eq!(generator.pdf_dir(DocumentKind::Certificate), None);
    }

    #[test]
    fn test_with_today() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let generator = GeneratorBuilder::new().with_today(today).build().unwrap();
        assert_eq!(generator.today(), today);
    }

    #[test]
    fn test_with_profile() {
        let mut profile = DocumentProfile::transcript();
        profile.file_name = "{student_id}.docx".to_string();
        let generator = GeneratorBuilder::new().with_profile(profile).build().unwrap();
        assert_eq!(
            generator.profiles().get(DocumentKind::Transcript).file_name,
            "{student_id}.docx"
        );
    }

    #[test]
    fn test_build_with_invalid_date_style() {
        let mut profile = DocumentProfile::degree();
        profile.date_style = DateStyle::Custom(String::new());
        let result = GeneratorBuilder::new().with_profile(profile).build();
        assert!(matches!(result, Err(DocGenError::Config(_))));
    }

    #[test]
    fn test_build_with_unknown_name_field() {
        let mut profile = DocumentProfile::transcript();
        profile.file_name = "{nickname}.docx".to_string();
        let result = GeneratorBuilder::new().with_profile(profile).build();
        match result {
            Err(DocGenError::Config(msg)) => assert!(msg.contains("nickname")),
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_build_with_invalid_font_size() {
        let style = CertificateStyle {
            font_size: 0.0,
            ..CertificateStyle::default()
        };
        let result = GeneratorBuilder::new().with_certificate_style(style).build();
        assert!(matches!(result, Err(DocGenError::Config(_))));
    }

    #[test]
    fn test_certificates_require_template() {
        let generator = GeneratorBuilder::new().build().unwrap();
        let result = generator.generate_certificates(Path::new("students.xlsx"), None);
        assert!(matches!(result, Err(DocGenError::MissingPrerequisite(_))));
    }

    #[test]
    fn test_missing_spreadsheet_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let generator = GeneratorBuilder::new()
            .with_output_root(dir.path())
            .build()
            .unwrap();
        let result = generator.generate_transcripts(
            &dir.path().join("missing.xlsx"),
            &dir.path().join("missing.docx"),
        );
        assert!(result.is_err());
        assert!(!generator.output_dir(DocumentKind::Transcript).exists());
    }

    #[test]
    fn test_convert_certificates_is_config_error() {
        struct Never;
        impl PdfConverter for Never {
            fn convert(&self, _: &Path, _: &Path) -> Result<(), DocGenError> {
                unreachable!()
            }
        }

        let generator = GeneratorBuilder::new().build().unwrap();
        let result = generator.convert_to_pdf(DocumentKind::Certificate, &Never);
        assert!(matches!(result, Err(DocGenError::Config(_))));
    }

    #[test]
    fn test_convert_without_generated_documents() {
        struct Never;
        impl PdfConverter for Never {
            fn convert(&self, _: &Path, _: &Path) -> Result<(), DocGenError> {
                unreachable!()
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let generator = GeneratorBuilder::new()
            .with_output_root(dir.path())
            .build()
            .unwrap();
        let report = generator
            .convert_to_pdf(DocumentKind::Transcript, &Never)
            .unwrap();
        assert_eq!(report.generated_count(), 0);
        assert!(!dir.path().join("Transcripts_PDF").exists());
    }
}
