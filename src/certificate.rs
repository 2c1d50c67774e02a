//! Certificate Module
//!
//! 画像テンプレートに受講者名を中央揃えで描画し、PNGとして保存するモジュール。

use ab_glyph::{Font, FontVec, PxScale};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::DocGenError;

/// 既定のフォントファイル名（Arial Bold）
pub const DEFAULT_FONT: &str = "arialbd.ttf";

/// 既定のフォントが見つからない場合の代替
const FALLBACK_FONTS: &[&str] = &["DejaVuSans-Bold.ttf", "LiberationSans-Bold.ttf"];

/// フォントを探すディレクトリ
const FONT_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/msttcorefonts",
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/TTF",
    "/usr/share/fonts/dejavu",
    "/Library/Fonts",
    "/System/Library/Fonts/Supplemental",
];

/// 受け付ける画像テンプレートの拡張子
const TEMPLATE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// 修了証の描画スタイル
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateStyle {
    /// 文字サイズ（1emあたりのpx）
    pub font_size: f32,

    /// 描画位置（上端からのpx）
    pub top: i32,

    /// 文字色（RGBA）
    pub color: [u8; 4],
}

impl Default for CertificateStyle {
    fn default() -> Self {
        Self {
            font_size: 90.0,
            top: 620,
            color: [255, 165, 0, 255], // orange
        }
    }
}

/// 中央揃えのx座標
///
/// 画像より文字列が長い場合は負の値になります。
pub fn centered_x(image_width: u32, text_width: u32) -> i32 {
    (image_width as i64 - text_width as i64).div_euclid(2) as i32
}

/// フォントファイルの場所を解決
///
/// パスとして存在すればそのまま使い、そうでなければカレントディレクトリと
/// システムのフォントディレクトリからファイル名で探します。
/// 既定フォントが見つからない場合は代替フォントを探します。
pub fn resolve_font(font: &Path) -> Option<PathBuf> {
    if font.is_file() {
        return Some(font.to_path_buf());
    }

    let file_name = font.file_name()?;
    let mut dirs: Vec<PathBuf> = FONT_DIRS.iter().map(PathBuf::from).collect();
    if let Some(windir) = std::env::var_os("WINDIR") {
        dirs.insert(0, PathBuf::from(windir).join("Fonts"));
    }
    if let Some(home) = std::env::var_os("HOME") {
        dirs.push(PathBuf::from(&home).join(".fonts"));
        dirs.push(PathBuf::from(home).join(".local/share/fonts"));
    }

    let find = |name: &std::ffi::OsStr| {
        dirs.iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
    };

    if let Some(found) = find(file_name) {
        return Some(found);
    }

    if file_name == DEFAULT_FONT {
        return FALLBACK_FONTS
            .iter()
            .find_map(|name| find(std::ffi::OsStr::new(name)));
    }
    None
}

/// フォントファイルを読み込む
pub fn load_font(font: &Path) -> Result<FontVec, DocGenError> {
    let path = resolve_font(font)
        .ok_or_else(|| DocGenError::Font(format!("Font '{}' not found", font.display())))?;
    let data = std::fs::read(&path)?;
    let font = FontVec::try_from_vec(data)
        .map_err(|e| DocGenError::Font(format!("{}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), "font loaded");
    Ok(font)
}

/// 画像テンプレートを読み込む
///
/// # 発生し得るエラー
///
/// * `DocGenError::Config` - 拡張子がPNG/JPEG以外の場合
/// * `DocGenError::Image` - 画像としてデコードできない場合
pub fn load_template(path: &Path) -> Result<DynamicImage, DocGenError> {
    let supported = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| TEMPLATE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    if !supported {
        return Err(DocGenError::Config(format!(
            "Certificate template must be a PNG or JPEG image: {}",
            path.display()
        )));
    }
    Ok(image::open(path)?)
}

/// 修了証の描画
pub struct CertificateRenderer {
    font: FontVec,
    style: CertificateStyle,
}

impl std::fmt::Debug for CertificateRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateRenderer")
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

impl CertificateRenderer {
    /// 新しい描画器を生成
    pub fn new(font: FontVec, style: CertificateStyle) -> Self {
        Self { font, style }
    }

    /// 描画スタイル
    pub fn style(&self) -> &CertificateStyle {
        &self.style
    }

    /// 描画に使うスケール
    ///
    /// `PxScale`は行の高さ（ascent - descent）を基準にするため、
    /// em基準の文字サイズをフォントの比率で換算します。
    pub fn scale(&self) -> PxScale {
        let size = self.style.font_size;
        match self.font.units_per_em() {
            Some(units_per_em) if units_per_em > 0.0 => {
                PxScale::from(size * self.font.height_unscaled() / units_per_em)
            }
            _ => PxScale::from(size),
        }
    }

    /// 文字列の描画幅（px）
    pub fn text_width(&self, text: &str) -> u32 {
        text_size(self.scale(), &self.font, text).0
    }

    /// テンプレートの複製に名前を描画
    pub fn render(&self, template: &DynamicImage, name: &str) -> RgbaImage {
        let mut certificate = template.to_rgba8();
        let x = centered_x(certificate.width(), self.text_width(name));

        draw_text_mut(
            &mut certificate,
            Rgba(self.style.color),
            x,
            self.style.top,
            self.scale(),
            &self.font,
            name,
        );
        certificate
    }

    /// 名前を描画してPNGとして保存
    pub fn render_to_path(
        &self,
        template: &DynamicImage,
        name: &str,
        output: &Path,
    ) -> Result<(), DocGenError> {
        let certificate = self.render(template, name);
        certificate.save_with_format(output, ImageFormat::Png)?;
        tracing::info!(name, path = %output.display(), "certificate generated");
        Ok(())
    }
}
