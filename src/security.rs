//! Security Module
//!
//! テンプレート（.docx = ZIPアーカイブ）を展開する際のセキュリティ対策を実装するモジュール。
//! ZIP bomb攻撃、パストラバーサル攻撃への対策を提供します。

use crate::error::DocGenError;

/// セキュリティ設定
///
/// テンプレート処理時のセキュリティ制限を定義します。
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 展開後の最大サイズ（バイト）
    /// デフォルト: 512MB
    pub max_decompressed_size: u64,
    /// ZIPアーカイブ内の最大ファイル数
    /// デフォルト: 10000
    pub max_file_count: usize,
    /// 単一ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB (104_857_600 bytes)
    pub max_file_size: u64,
    /// テンプレートファイルの最大サイズ（バイト）
    /// デフォルト: 256MB
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_decompressed_size: 536_870_912, // 512MB
            max_file_count: 10_000,
            max_file_size: 104_857_600,       // 100MB
            max_input_file_size: 268_435_456, // 256MB
        }
    }
}

impl SecurityConfig {
    /// 入力ファイルサイズを検証
    pub fn check_input_size(&self, size: u64) -> Result<(), DocGenError> {
        if size > self.max_input_file_size {
            return Err(DocGenError::SecurityViolation(format!(
                "Template size exceeds maximum: {} bytes (max: {} bytes)",
                size, self.max_input_file_size
            )));
        }
        Ok(())
    }

    /// アーカイブ内のファイル数を検証
    pub fn check_file_count(&self, count: usize) -> Result<(), DocGenError> {
        if count > self.max_file_count {
            return Err(DocGenError::SecurityViolation(format!(
                "ZIP archive contains too many files: {} (max: {})",
                count, self.max_file_count
            )));
        }
        Ok(())
    }

    /// 単一エントリのサイズを検証し、展開サイズの累計を更新
    pub fn check_entry(&self, name: &str, size: u64, total: &mut u64) -> Result<(), DocGenError> {
        validate_zip_path(name)
            .map_err(|e| DocGenError::SecurityViolation(format!("Invalid ZIP path: {}", e)))?;

        if size > self.max_file_size {
            return Err(DocGenError::SecurityViolation(format!(
                "File '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                name, size, self.max_file_size
            )));
        }

        *total = total.checked_add(size).ok_or_else(|| {
            DocGenError::SecurityViolation(
                "Total decompressed size calculation overflow".to_string(),
            )
        })?;

        if *total > self.max_decompressed_size {
            return Err(DocGenError::SecurityViolation(format!(
                "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                total, self.max_decompressed_size
            )));
        }
        Ok(())
    }
}

/// ファイルパスの検証
///
/// パストラバーサル攻撃を防ぐため、ZIPエントリのパスを検証します。
///
/// # 戻り値
///
/// * `Ok(())` - パスが安全な場合
/// * `Err(String)` - パスが危険な場合（`..`や絶対パスを含む）
pub(crate) fn validate_zip_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    // 絶対パスを拒否（Windows形式の`C:\`やUnix形式の`/`で始まるパス）
    if path.starts_with('/') || path.starts_with("C:\\") || path.starts_with("c:\\") {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.split('/').any(|segment| segment == "..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_zip_path_valid() {
        assert!(validate_zip_path("word/document.xml").is_ok());
        assert!(validate_zip_path("[Content_Types].xml").is_ok());
        assert!(validate_zip_path("word/_rels/document.xml.rels").is_ok());
        assert!(validate_zip_path("word/media/").is_ok());
    }

    #[test]
    fn test_validate_zip_path_empty() {
        assert!(validate_zip_path("").is_err());
    }

    #[test]
    fn test_validate_zip_path_absolute() {
        assert!(validate_zip_path("/etc/passwd").is_err());
        assert!(validate_zip_path("C:\\Windows\\system32").is_err());
    }

    #[test]
    fn test_validate_zip_path_traversal() {
        assert!(validate_zip_path("../etc/passwd").is_err());
        assert!(validate_zip_path("word/../../etc/passwd").is_err());
        assert!(validate_zip_path("..").is_err());
    }

    #[test]
    fn test_validate_zip_path_backslash() {
        assert!(validate_zip_path("word\\document.xml").is_err());
    }

    #[test]
    fn test_check_file_count() {
        let config = SecurityConfig::default();
        assert!(config.check_file_count(10).is_ok());
        assert!(matches!(
            config.check_file_count(10_001),
            Err(DocGenError::SecurityViolation(msg)) if msg.contains("too many files")
        ));
    }

    #[test]
    fn test_check_entry_accumulates() {
        let config = SecurityConfig {
            max_decompressed_size: 100,
            max_file_count: 10,
            max_file_size: 60,
            max_input_file_size: 1_000,
        };
        let mut total = 0;
        assert!(config.check_entry("a.xml", 50, &mut total).is_ok());
        assert_eq!(total, 50);
        assert!(config.check_entry("b.xml", 70, &mut total).is_err());
        assert!(config.check_entry("c.xml", 55, &mut total).is_err());
    }

    #[test]
    fn test_check_input_size() {
        let config = SecurityConfig::default();
        assert!(config.check_input_size(1024).is_ok());
        assert!(config.check_input_size(u64::MAX).is_err());
    }
}
