//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    batch::BatchArgs, calc::CalcArgs, completions::CompletionsArgs, config::ConfigCommands,
    factors::FactorsArgs, serve::ServeArgs,
};
use crate::core::Config;

#[derive(Parser)]
#[command(name = "pdecalc")]
#[command(author, version, about = "Permitted Daily Exposure calculator")]
#[command(long_about = "Computes the Permitted Daily Exposure (PDE) of an impurity or solvent from NOAEL/LOAEL data:\n\n  PDE = (dose x body weight) / (F1 x F2 x F3 x F4 x F5)")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

impl GlobalOpts {
    /// Requested format, falling back to the configured default
    pub fn output_format(&self, config: &Config) -> OutputFormat {
        if self.format != OutputFormat::Auto {
            return self.format;
        }
        config
            .default_format
            .as_deref()
            .and_then(|s| OutputFormat::from_str(s, true).ok())
            .unwrap_or(OutputFormat::Auto)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Calculate a PDE from a single study
    Calc(CalcArgs),

    /// Calculate PDEs for every row of a CSV file
    Batch(BatchArgs),

    /// List the default F1 (species) and F3 (duration) tables
    Factors(FactorsArgs),

    /// Run the HTTP API
    Serve(ServeArgs),

    /// View and modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary for terminals
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_configured_default_format() {
        let global = GlobalOpts {
            format: OutputFormat::Auto,
            quiet: false,
            verbose: false,
        };
        let config = Config {
            default_format: Some("JSON".to_string()),
            ..Config::default()
        };
        assert_eq!(global.output_format(&config), OutputFormat::Json);

        let explicit = GlobalOpts {
            format: OutputFormat::Csv,
            ..global
        };
        assert_eq!(explicit.output_format(&config), OutputFormat::Csv);
    }
}
