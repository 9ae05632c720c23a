// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folio — rich-document export and signature baking
//
// Entry point. Initialises logging, parses the command line, and hands off to
// the folio-document pipelines.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use folio_core::{DocumentNode, ExportConfig, FolioError, PageBounds, Result, SignatureOverlay};
use folio_document::{PdfReader, SignatureCompositor, export_docx, inspect_package};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Export rich-text documents to DOCX and bake signatures into PDFs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export an editor JSON document tree as a .docx package
    Export {
        /// Document tree as JSON
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output package (defaults to the input name with .docx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Export configuration as JSON
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Draw signature overlays onto the pages of a PDF
    Sign {
        /// Source PDF
        #[arg(value_name = "PDF")]
        pdf: PathBuf,

        /// Overlay list as a JSON array
        #[arg(value_name = "OVERLAYS")]
        overlays: PathBuf,

        /// Output PDF (defaults to <name>-signed.pdf)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print the applied/skipped report as JSON
        #[arg(long)]
        report: bool,
    },

    /// Summarise a .docx package or a PDF as JSON
    Inspect {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "folio failed");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Export {
            input,
            output,
            config,
        } => {
            let config = match config {
                Some(path) => ExportConfig::load(path)?,
                None => ExportConfig::default(),
            };
            let tree = DocumentNode::from_json_str(&std::fs::read_to_string(&input)?)?;
            let bytes = export_docx(&tree, &config)?;

            let output = output.unwrap_or_else(|| input.with_extension("docx"));
            std::fs::write(&output, &bytes)?;
            tracing::info!(path = %output.display(), bytes = bytes.len(), "Package written");
        }
        Commands::Sign {
            pdf,
            overlays,
            output,
            report,
        } => {
            let overlay_list: Vec<SignatureOverlay> =
                serde_json::from_str(&std::fs::read_to_string(&overlays)?)?;
            let composite = SignatureCompositor::apply(&std::fs::read(&pdf)?, &overlay_list)?;

            let output = output.unwrap_or_else(|| signed_name(&pdf));
            std::fs::write(&output, &composite.bytes)?;
            tracing::info!(
                path = %output.display(),
                applied = composite.report.applied.len(),
                skipped = composite.report.skipped.len(),
                "Signed PDF written"
            );
            if report {
                print_json(&composite.report)?;
            }
        }
        Commands::Inspect { file } => {
            println!("{}", inspect(&std::fs::read(&file)?, &file)?);
        }
    }
    Ok(())
}

/// Pretty JSON summary of a package or PDF, picked by magic bytes.
fn inspect(bytes: &[u8], file: &Path) -> Result<String> {
    let json = if bytes.starts_with(b"PK") {
        serde_json::to_string_pretty(&inspect_package(bytes)?)?
    } else if bytes.starts_with(b"%PDF") {
        serde_json::to_string_pretty(&pdf_summary(bytes)?)?
    } else {
        return Err(FolioError::UnsupportedInput(format!(
            "{} is neither a .docx package nor a PDF",
            file.display()
        )));
    };
    Ok(json)
}

#[derive(Serialize)]
struct PdfSummary {
    page_count: usize,
    pages: Vec<PageBounds>,
}

fn pdf_summary(bytes: &[u8]) -> Result<PdfSummary> {
    let reader = PdfReader::from_bytes(bytes)?;
    let pages = (0..reader.page_count())
        .map(|index| reader.page_bounds(index))
        .collect::<Result<Vec<_>>>()?;
    Ok(PdfSummary {
        page_count: reader.page_count(),
        pages,
    })
}

/// `contract.pdf` → `contract-signed.pdf`, next to the source.
fn signed_name(pdf: &Path) -> PathBuf {
    let stem = pdf
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".into());
    pdf.with_file_name(format!("{stem}-signed.pdf"))
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_name_sits_next_to_source() {
        assert_eq!(
            signed_name(Path::new("/tmp/contract.pdf")),
            PathBuf::from("/tmp/contract-signed.pdf")
        );
        assert_eq!(signed_name(Path::new("scan")), PathBuf::from("scan-signed.pdf"));
    }

    #[test]
    fn inspect_rejects_unknown_formats() {
        let err = inspect(b"plain notes", Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, FolioError::UnsupportedInput(_)));
        assert!(err.to_string().contains("notes.txt"));
    }

    #[test]
    fn cli_parses_sign_command() {
        let cli = Cli::try_parse_from(["folio", "sign", "in.pdf", "sigs.json", "-o", "out.pdf"])
            .unwrap();
        match cli.command {
            Commands::Sign { pdf, output, report, .. } => {
                assert_eq!(pdf, PathBuf::from("in.pdf"));
                assert_eq!(output, Some(PathBuf::from("out.pdf")));
                assert!(!report);
            }
            _ => panic!("expected sign"),
        }
    }
}
