//! `pdecalc factors` command - show the default factor tables

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::format_value;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, DURATION_F3, SPECIES_F1};

#[derive(clap::Args, Debug)]
pub struct FactorsArgs {
    /// Show only the species (F1) table
    #[arg(long, conflicts_with = "durations")]
    pub species: bool,

    /// Show only the duration (F3) table
    #[arg(long)]
    pub durations: bool,
}

#[derive(Serialize)]
struct FactorEntry {
    key: &'static str,
    value: f64,
}

#[derive(Serialize)]
struct FactorListing {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    species: Vec<FactorEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    durations: Vec<FactorEntry>,
}

fn entries(table: &[(&'static str, f64)]) -> Vec<FactorEntry> {
    table
        .iter()
        .map(|(key, value)| FactorEntry { key, value: *value })
        .collect()
}

pub fn run(args: FactorsArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let show_species = !args.durations;
    let show_durations = !args.species;

    let listing = FactorListing {
        species: if show_species { entries(SPECIES_F1) } else { Vec::new() },
        durations: if show_durations { entries(DURATION_F3) } else { Vec::new() },
    };

    let format = global.output_format(config);
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&listing).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&listing).into_diagnostic()?);
        }
        OutputFormat::Tsv | OutputFormat::Csv => {
            let sep = if format == OutputFormat::Csv { "," } else { "\t" };
            println!("table{sep}key{sep}value");
            for (table, rows) in [("species", &listing.species), ("duration", &listing.durations)] {
                for row in rows {
                    println!("{}{sep}{}{sep}{}", table, row.key, format_value(row.value));
                }
            }
        }
        OutputFormat::Auto | OutputFormat::Md => {
            if show_species {
                print_table("Species", "F1", &listing.species);
            }
            if show_species && show_durations {
                println!();
            }
            if show_durations {
                print_table("Duration key", "F3", &listing.durations);
            }
        }
    }

    Ok(())
}

fn print_table(key_header: &str, value_header: &str, rows: &[FactorEntry]) {
    let mut builder = Builder::default();
    builder.push_record([key_header, value_header]);
    for row in rows {
        builder.push_record([row.key.to_string(), format_value(row.value)]);
    }
    println!("{}", builder.build().with(Style::markdown()));
}
