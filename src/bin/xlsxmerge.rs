//! CLI binary for xlsxmerge.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `GeneratorBuilder` settings and prints batch results.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use xlsxmerge::{
    BatchReport, DocumentKind, Generator, GeneratorBuilder, OfficeConverter, ProfileSet,
    DEFAULT_FONT, DEFAULT_SOFFICE,
};

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}

/// Generate transcripts, degrees and certificates from spreadsheet rows.
#[derive(Parser, Debug)]
#[command(
    name = "xlsxmerge",
    version,
    about = "Generate transcripts, degrees and certificates from spreadsheet rows",
    arg_required_else_help = true
)]
struct Cli {
    /// Directory under which Transcripts_Word, Degrees_PDF, ... are created.
    #[arg(long, global = true, env = "XLSXMERGE_OUTPUT_ROOT", default_value = ".")]
    output_root: PathBuf,

    /// Date used for {{ cur_date }} (YYYY-MM-DD). Defaults to today.
    #[arg(long, global = true, value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// JSON file replacing the builtin document profiles.
    #[arg(long, global = true, env = "XLSXMERGE_PROFILES")]
    profiles: Option<PathBuf>,

    /// Print the batch report as JSON on stdout.
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one Word transcript per row into Transcripts_Word.
    Transcripts {
        /// Spreadsheet with one student per row.
        #[arg(long)]
        data: PathBuf,

        /// Word template with {{ key }} placeholders.
        #[arg(long)]
        template: PathBuf,
    },

    /// Convert Transcripts_Word/*.docx into Transcripts_PDF.
    TranscriptsPdf {
        /// LibreOffice executable.
        #[arg(long, env = "XLSXMERGE_SOFFICE", default_value = DEFAULT_SOFFICE)]
        soffice: PathBuf,
    },

    /// Generate one associate degree per row into Degrees_Word.
    Degrees {
        /// Spreadsheet with one graduate per row.
        #[arg(long)]
        data: PathBuf,

        /// Word template with {{ key }} placeholders.
        #[arg(long)]
        template: PathBuf,
    },

    /// Convert Degrees_Word/*.docx into Degrees_PDF.
    DegreesPdf {
        /// LibreOffice executable.
        #[arg(long, env = "XLSXMERGE_SOFFICE", default_value = DEFAULT_SOFFICE)]
        soffice: PathBuf,
    },

    /// Draw each student_name onto an image template into Certificates_Images.
    Certificates {
        /// Spreadsheet with a student_name column.
        #[arg(long)]
        data: PathBuf,

        /// PNG or JPEG certificate template.
        #[arg(long)]
        template: Option<PathBuf>,

        /// Bold TrueType font used for the name.
        #[arg(long, env = "XLSXMERGE_FONT", default_value = DEFAULT_FONT)]
        font: PathBuf,
    },
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn build_generator(cli: &Cli) -> Result<Generator> {
    let mut builder = GeneratorBuilder::new().with_output_root(&cli.output_root);

    if let Some(date) = cli.date {
        builder = builder.with_today(date);
    }
    if let Some(path) = &cli.profiles {
        let profiles = ProfileSet::from_path(path)
            .with_context(|| format!("Failed to load profiles from {}", path.display()))?;
        builder = builder.with_profiles(profiles);
    }
    if let Command::Certificates { font, .. } = &cli.command {
        builder = builder.with_font_path(font);
    }

    builder.build().context("Invalid configuration")
}

fn run(cli: &Cli) -> Result<(BatchReport, &'static str)> {
    let generator = build_generator(cli)?;

    let outcome = match &cli.command {
        Command::Transcripts { data, template } => (
            generator
                .generate_transcripts(data, template)
                .context("Failed to generate transcripts")?,
            "Word transcripts generated successfully!",
        ),
        Command::Degrees { data, template } => (
            generator
                .generate_degrees(data, template)
                .context("Failed to generate degrees")?,
            "Associate Degree generated successfully!",
        ),
        Command::Certificates { data, template, .. } => (
            generator
                .generate_certificates(data, template.as_deref())
                .context("Failed to generate certificates")?,
            "Certificates generated successfully!",
        ),
        Command::TranscriptsPdf { soffice } => (
            convert(&generator, DocumentKind::Transcript, soffice)?,
            "Generated as PDFs successfully!",
        ),
        Command::DegreesPdf { soffice } => (
            convert(&generator, DocumentKind::Degree, soffice)?,
            "Generated as PDFs successfully!",
        ),
    };
    Ok(outcome)
}

fn convert(generator: &Generator, kind: DocumentKind, soffice: &Path) -> Result<BatchReport> {
    let converter = OfficeConverter::new(soffice);
    generator
        .convert_to_pdf(kind, &converter)
        .with_context(|| format!("Failed to convert {kind} documents to PDF"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let (report, message) = match run(&cli) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{} {e:#}", red("Error:"));
            return ExitCode::from(1);
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("{} {e}", red("Error:"));
                return ExitCode::from(1);
            }
        }
    }

    if report.is_clean() {
        if !cli.json {
            println!("{}", green(message));
        }
        return ExitCode::SUCCESS;
    }

    eprintln!(
        "{} {} generated, {} failed",
        yellow("Warning:"),
        report.generated_count(),
        report.failures.len()
    );
    for failure in &report.failures {
        eprintln!("  {}: {}", failure.item, failure.message);
    }
    ExitCode::from(2)
}
