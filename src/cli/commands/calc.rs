//! `pdecalc calc` command - single PDE calculation

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::format_value;
use crate::cli::output::render_reports;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{compute_pde, formula_lines, Config, PdeInputs, PdeReport, PdeResult, GENERAL_CAVEATS};

#[derive(clap::Args, Debug)]
pub struct CalcArgs {
    /// Effect dose in mg/kg/day (NOAEL, or LOAEL with --loael)
    #[arg(long, short = 'd')]
    pub dose: f64,

    /// The dose is a LOAEL rather than a NOAEL
    #[arg(long)]
    pub loael: bool,

    /// Test species for the F1 lookup
    #[arg(long, short = 's', default_value = "rat")]
    pub species: String,

    /// Explicit F1, overrides --species
    #[arg(long)]
    pub f1: Option<f64>,

    /// F2: variability between individuals
    #[arg(long, default_value_t = 10.0)]
    pub f2: f64,

    /// Duration key for the F3 lookup (1, 2, 5, 10)
    #[arg(long, short = 't', default_value = "1")]
    pub duration: String,

    /// Explicit F3, overrides --duration
    #[arg(long)]
    pub f3: Option<f64>,

    /// F4: severity of the effect
    #[arg(long, default_value_t = 1.0)]
    pub f4: f64,

    /// F5: LOAEL uncertainty (raised to 10 for a LOAEL unless --no-loael-floor)
    #[arg(long, default_value_t = 1.0)]
    pub f5: f64,

    /// Human body weight in kg
    #[arg(long, short = 'w', default_value_t = 50.0)]
    pub weight: f64,

    /// Keep F5 as given even for a LOAEL
    #[arg(long = "no-loael-floor")]
    pub no_loael_floor: bool,

    /// Substance or study name to carry through to the output
    #[arg(long, short = 'l')]
    pub label: Option<String>,
}

impl CalcArgs {
    pub fn to_inputs(&self) -> PdeInputs {
        let mut inputs = PdeInputs::new(self.dose)
            .body_weight(self.weight)
            .species(self.species.clone())
            .f2(self.f2)
            .duration(self.duration.clone())
            .f4(self.f4)
            .f5(self.f5)
            .is_loael(self.loael)
            .enforce_loael_f5(!self.no_loael_floor);
        if let Some(f1) = self.f1 {
            inputs = inputs.f1(f1);
        }
        if let Some(f3) = self.f3 {
            inputs = inputs.f3(f3);
        }
        if let Some(label) = &self.label {
            inputs = inputs.label(label.clone());
        }
        inputs
    }
}

pub fn run(args: CalcArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let inputs = args.to_inputs();
    let result = compute_pde(&inputs)?;
    let report = PdeReport::new(&inputs, &result);
    tracing::debug!(?inputs, pde = result.pde_mg_per_day, "calculated");

    match global.output_format(config) {
        OutputFormat::Auto => print_summary(&inputs, &result, &report, global.quiet),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&report).into_diagnostic()?);
        }
        format => {
            print!("{}", render_reports(std::slice::from_ref(&report), format)?);
        }
    }

    Ok(())
}

fn print_summary(inputs: &PdeInputs, result: &PdeResult, report: &PdeReport, quiet: bool) {
    let basis = if inputs.is_loael { "LOAEL" } else { "NOAEL" };
    match &report.label {
        Some(label) => println!(
            "{} {} ({} basis)",
            style("✓").green(),
            style(label).cyan(),
            basis
        ),
        None => println!("{} PDE from {}", style("✓").green(), basis),
    }
    println!();
    println!(
        "   PDE: {}",
        style(format!("{:.3} mg/day", result.pde_mg_per_day)).yellow().bold()
    );

    if quiet {
        return;
    }

    println!();
    for line in formula_lines(inputs, result) {
        println!("   {}", line);
    }

    println!();
    let mut table = Builder::default();
    table.push_record(["Factor", "Value"]);
    for (name, value) in result.rows() {
        table.push_record([name.to_string(), format_value(value)]);
    }
    table.push_record(["Total factor".to_string(), format_value(result.total_factor())]);
    println!("{}", table.build().with(Style::markdown()));

    if !report.warnings.is_empty() {
        println!();
        println!("{}", style("Warnings:").yellow().bold());
        for warning in &report.warnings {
            println!("  {} {}", style("!").yellow(), warning);
        }
    }

    println!();
    for caveat in GENERAL_CAVEATS {
        println!("  {}", style(format!("• {}", caveat)).dim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: CalcArgs,
    }

    fn parse(argv: &[&str]) -> PdeInputs {
        let mut full = vec!["calc"];
        full.extend_from_slice(argv);
        Harness::parse_from(full).args.to_inputs()
    }

    #[test]
    fn test_defaults_match_core_defaults() {
        assert_eq!(parse(&["--dose", "50"]), PdeInputs::new(50.0));
    }

    #[test]
    fn test_overrides_and_flags() {
        let inputs = parse(&[
            "--dose", "10", "--loael", "--species", "rabbit", "--f1", "3", "--f3", "4",
            "--no-loael-floor", "--label", "Thalidomide",
        ]);
        assert!(inputs.is_loael);
        assert!(!inputs.enforce_default_loael_f5);
        assert_eq!(inputs.species.as_deref(), Some("rabbit"));
        assert_eq!(inputs.f1, Some(3.0));
        assert_eq!(inputs.f3, Some(4.0));
        assert_eq!(inputs.label.as_deref(), Some("Thalidomide"));
    }
}
