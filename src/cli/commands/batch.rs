//! `pdecalc batch` command - PDEs for a CSV file of studies
//!
//! Each row describes one study. Recognised headers (case-insensitive):
//! `label, dose, dose_type, species, f1, weight, f2, duration, f3, f4, f5`.
//! Only `dose` is required; every other column falls back to the usual default.

use console::style;
use csv::StringRecord;
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::cli::output::{render_reports, write_output};
use crate::cli::GlobalOpts;
use crate::core::{compute_pde, Config, PdeError, PdeInputs, PdeReport};

/// CSV headers understood by the batch command
pub const BATCH_HEADERS: &[&str] = &[
    "label", "dose", "dose_type", "species", "f1", "weight", "f2", "duration", "f3", "f4", "f5",
];

const TEMPLATE_EXAMPLES: &[&[&str]] = &[
    &["Benzyl alcohol (oral)", "400", "noael", "rat", "", "50", "10", "1", "", "1", "1"],
    &["Thalidomide (repro)", "10", "loael", "rabbit", "", "50", "10", "1", "", "5", "10"],
];

#[derive(clap::Args, Debug)]
pub struct BatchArgs {
    /// CSV file with one study per row
    #[arg(required_unless_present = "template")]
    pub file: Option<PathBuf>,

    /// Print a CSV template instead of calculating
    #[arg(long, conflicts_with = "file")]
    pub template: bool,

    /// Report bad rows and keep going instead of stopping at the first one
    #[arg(long)]
    pub skip_errors: bool,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Batch statistics
#[derive(Debug, Default)]
pub struct BatchStats {
    pub rows_processed: usize,
    pub calculated: usize,
    pub errors: usize,
}

/// Build a map from header name to column index
pub fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_lowercase().trim().to_string(), i))
        .collect()
}

/// Get a non-empty field value from a CSV record
pub fn get_field(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    field: &str,
) -> Option<String> {
    header_map
        .get(field)
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn get_number(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    field: &'static str,
) -> Result<Option<f64>, PdeError> {
    match get_field(record, header_map, field) {
        None => Ok(None),
        Some(raw) => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(PdeError::TypeCoercion {
                field,
                expected: "a finite number",
                found: format!("'{}'", raw),
            }),
        },
    }
}

/// Turn one CSV row into calculation inputs
pub fn row_to_inputs(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<PdeInputs, PdeError> {
    let dose = get_number(record, header_map, "dose")?.ok_or(PdeError::MissingField { field: "dose" })?;
    let is_loael = get_field(record, header_map, "dose_type")
        .map(|t| t.eq_ignore_ascii_case("loael"))
        .unwrap_or(false);

    let mut inputs = if is_loael {
        PdeInputs::loael(dose)
    } else {
        PdeInputs::noael(dose)
    };

    if let Some(label) = get_field(record, header_map, "label") {
        inputs = inputs.label(label);
    }
    if let Some(species) = get_field(record, header_map, "species") {
        inputs = inputs.species(species);
    }
    if let Some(duration) = get_field(record, header_map, "duration") {
        inputs = inputs.duration(duration);
    }
    if let Some(f1) = get_number(record, header_map, "f1")? {
        inputs = inputs.f1(f1);
    }
    if let Some(f3) = get_number(record, header_map, "f3")? {
        inputs = inputs.f3(f3);
    }
    if let Some(weight) = get_number(record, header_map, "weight")? {
        inputs = inputs.body_weight(weight);
    }
    if let Some(f2) = get_number(record, header_map, "f2")? {
        inputs = inputs.f2(f2);
    }
    if let Some(f4) = get_number(record, header_map, "f4")? {
        inputs = inputs.f4(f4);
    }
    if let Some(f5) = get_number(record, header_map, "f5")? {
        inputs = inputs.f5(f5);
    }

    Ok(inputs)
}

pub fn run(args: BatchArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    if args.template {
        return print_template();
    }

    let path = args
        .file
        .ok_or_else(|| miette::miette!("A CSV file is required unless --template is given"))?;

    let mut reader = csv::Reader::from_path(&path).into_diagnostic()?;
    let headers = reader.headers().into_diagnostic()?.clone();
    let header_map = build_header_map(&headers);

    if !header_map.contains_key("dose") {
        return Err(miette::miette!(
            "{} has no 'dose' column. Expected headers: {}",
            path.display(),
            BATCH_HEADERS.join(",")
        ));
    }

    let mut stats = BatchStats::default();
    let mut reports = Vec::new();

    for (idx, record) in reader.records().enumerate() {
        // Header is line 1
        let row_num = idx + 2;
        stats.rows_processed += 1;
        let record = record.into_diagnostic()?;

        let outcome = row_to_inputs(&record, &header_map)
            .and_then(|inputs| compute_pde(&inputs).map(|result| PdeReport::new(&inputs, &result)));

        match outcome {
            Ok(report) => {
                stats.calculated += 1;
                reports.push(report);
            }
            Err(e) if args.skip_errors => {
                stats.errors += 1;
                tracing::warn!(row = row_num, kind = e.kind(), "skipping row");
                eprintln!("{} Row {}: {}", style("✗").red(), row_num, e);
            }
            Err(e) => {
                return Err(miette::miette!("Row {}: {}", row_num, e));
            }
        }
    }

    let rendered = render_reports(&reports, global.output_format(config))?;
    write_output(&rendered, args.output)?;

    if !global.quiet {
        eprintln!(
            "{} Calculated {} PDE(s) from {} row(s){}",
            style("✓").green(),
            stats.calculated,
            stats.rows_processed,
            if stats.errors > 0 {
                format!(", {} error(s)", style(stats.errors).red())
            } else {
                String::new()
            }
        );
    }

    Ok(())
}

fn print_template() -> Result<()> {
    println!("{}", BATCH_HEADERS.join(","));
    for example in TEMPLATE_EXAMPLES {
        println!("{}", example.join(","));
    }

    // Print usage hint to stderr so it doesn't interfere with redirected output
    eprintln!();
    eprintln!(
        "{} Template generated. Redirect to file: pdecalc batch --template > studies.csv",
        style("→").blue()
    );
    Ok(())
}
