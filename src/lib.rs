//! xlsxmerge - Batch document generation from spreadsheet rows
//!
//! This crate merges the rows of a spreadsheet into Word (`.docx`) templates
//! with `{{ key }}` placeholders, draws names onto image certificates, and
//! converts the generated documents to PDF.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use xlsxmerge::GeneratorBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a generator with default settings
//!     let generator = GeneratorBuilder::new().build()?;
//!
//!     // One transcript per spreadsheet row, written to Transcripts_Word/
//!     let report = generator.generate_transcripts(
//!         Path::new("students.xlsx"),
//!         Path::new("transcript_template.docx"),
//!     )?;
//!
//!     for failure in &report.failures {
//!         eprintln!("{}: {}", failure.item, failure.message);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # PDF Conversion
//!
//! ```rust,no_run
//! use xlsxmerge::{DocumentKind, GeneratorBuilder, OfficeConverter};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = GeneratorBuilder::new().with_output_root("out").build()?;
//!
//!     // Degrees_Word/*.docx -> Degrees_PDF/*.pdf via LibreOffice
//!     generator.convert_to_pdf(DocumentKind::Degree, &OfficeConverter::default())?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Single Document
//!
//! ```rust,no_run
//! use std::path::Path;
//! use chrono::NaiveDate;
//! use xlsxmerge::{map_row, transliterate, DateStyle};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
//!     let fields = ["name_e", "id_kh"];
//!     let row = vec!["Sok Dara".to_string(), "2024".to_string()];
//!     let context = map_row(&fields, &row, &["id_kh".to_string()], &DateStyle::DayAbbrevMonthYear, today);
//!
//!     assert_eq!(context.get("id_kh"), Some(transliterate("2024").as_str()));
//!
//!     xlsxmerge::render(Path::new("degree.docx"), &context, Path::new("Sok_Dara.docx"))?;
//!     Ok(())
//! }
//! ```

mod api;
mod builder;
mod certificate;
mod context;
mod convert;
mod error;
mod numerals;
mod parser;
mod profile;
mod security;
mod template;
mod types;

// 公開API
pub use api::{DateStyle, DocumentKind};
pub use builder::{Generator, GeneratorBuilder};
pub use certificate::{
    centered_x, load_font, load_template, resolve_font, CertificateRenderer, CertificateStyle,
    DEFAULT_FONT,
};
pub use context::{map_row, Context, CUR_DATE_KEY};
pub use convert::{convert_all, OfficeConverter, PdfConverter, DEFAULT_SOFFICE};
pub use error::DocGenError;
pub use numerals::{khmer_digit, transliterate};
pub use parser::{Record, Spreadsheet};
pub use profile::{DocumentProfile, ProfileSet, STUDENT_NAME_KEY};
pub use template::{render, DocxTemplate};
pub use types::{BatchReport, CellValue, RowFailure, SheetRow};
