//! Rendering of calculation reports in the supported output formats

use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_csv, escape_tsv, format_value};
use crate::cli::OutputFormat;
use crate::core::PdeReport;

/// Column headers for tabular report output
pub const REPORT_COLUMNS: [&str; 8] = ["label", "pde_mg_per_day", "f1", "f2", "f3", "f4", "f5", "total_factor"];

/// One report as table cells, in `REPORT_COLUMNS` order
pub fn report_record(report: &PdeReport) -> [String; 8] {
    [
        report.label.clone().unwrap_or_default(),
        format_value(report.pde),
        format_value(report.f1),
        format_value(report.f2),
        format_value(report.f3),
        format_value(report.f4),
        format_value(report.f5),
        format_value(report.total_factor),
    ]
}

/// Render reports for a machine-oriented format
///
/// `Auto` renders like `Tsv`.
pub fn render_reports(reports: &[PdeReport], format: OutputFormat) -> Result<String> {
    let mut out = String::new();
    match format {
        OutputFormat::Json => {
            out = serde_json::to_string_pretty(reports).into_diagnostic()?;
            out.push('\n');
        }
        OutputFormat::Yaml => {
            out = serde_yml::to_string(reports).into_diagnostic()?;
        }
        OutputFormat::Csv => {
            out.push_str(&REPORT_COLUMNS.join(","));
            out.push('\n');
            for report in reports {
                let cells: Vec<String> = report_record(report).iter().map(|c| escape_csv(c)).collect();
                out.push_str(&cells.join(","));
                out.push('\n');
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            out.push_str(&REPORT_COLUMNS.join("\t"));
            out.push('\n');
            for report in reports {
                let cells: Vec<String> = report_record(report).iter().map(|c| escape_tsv(c)).collect();
                out.push_str(&cells.join("\t"));
                out.push('\n');
            }
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(REPORT_COLUMNS);
            for report in reports {
                builder.push_record(report_record(report));
            }
            out.push_str(&builder.build().with(Style::markdown()).to_string());
            out.push('\n');
        }
    }
    Ok(out)
}

/// Write to a file if given, else stdout
pub fn write_output(content: &str, output_path: Option<PathBuf>) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            writer.flush().into_diagnostic()?;
            eprintln!("Report written to: {}", path.display());
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
