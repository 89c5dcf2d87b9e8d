//! `pdecalc config` command - Configuration management
//!
//! Provides commands to view and modify pdecalc configuration.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::DEFAULT_BIND;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show the path of the configuration file
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (e.g., bind, default_format)
    pub key: String,

    /// Value to set
    pub value: String,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("bind", "Listen address for `pdecalc serve`"),
    (
        "default_format",
        "Default output format (auto, json, yaml, csv, tsv, md)",
    ),
    ("log", "Log filter directive (e.g. info, pdecalc=debug)"),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, _global: &GlobalOpts, config: &Config) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, config),
        ConfigCommands::Set(args) => run_set(args),
        ConfigCommands::Unset(args) => run_unset(args),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, config: &Config) -> Result<()> {
    // If a specific key is requested, show just that value
    if let Some(key) = &args.key {
        validate_key(key)?;
        let value = get_config_value(config, key);
        if let Some(v) = value {
            println!("{}", v);
        } else {
            return Err(miette::miette!("Key '{}' is not set", key));
        }
        return Ok(());
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();

    print_config_value("bind", config.bind.as_deref(), Some(DEFAULT_BIND));
    print_config_value("default_format", config.default_format.as_deref(), Some("auto"));
    print_config_value("log", config.log.as_deref(), None);

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Environment variables (PDECALC_BIND, PDECALC_FORMAT, PDECALC_LOG)");
    println!("  2. File named by PDECALC_CONFIG");
    println!("  3. Global config (~/.config/pdecalc/config.yaml)");

    Ok(())
}

fn run_set(args: SetArgs) -> Result<()> {
    validate_key(&args.key)?;
    validate_value(&args.key, &args.value)?;
    let config_path = get_config_path()?;

    // Load existing config or create new
    let mut config_map: serde_yml::Value = if config_path.exists() {
        let content = fs::read_to_string(&config_path).into_diagnostic()?;
        let parsed: serde_yml::Value =
            serde_yml::from_str(&content).unwrap_or(serde_yml::Value::Mapping(Default::default()));
        // If the file was empty or null, use an empty mapping
        if parsed.is_null() {
            serde_yml::Value::Mapping(Default::default())
        } else {
            parsed
        }
    } else {
        serde_yml::Value::Mapping(Default::default())
    };

    let serde_yml::Value::Mapping(map) = &mut config_map else {
        return Err(miette::miette!(
            "Config file is not a YAML mapping: {}",
            config_path.display()
        ));
    };
    map.insert(
        serde_yml::Value::String(args.key.clone()),
        serde_yml::Value::String(args.value.clone()),
    );

    // Ensure parent directory exists
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }

    // Write back
    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    println!(
        "{} Set {} {} {} in {}",
        style("✓").green(),
        style(&args.key).cyan(),
        style("→").dim(),
        style(&args.value).yellow(),
        config_path.display()
    );

    Ok(())
}

fn run_unset(args: UnsetArgs) -> Result<()> {
    validate_key(&args.key)?;
    let config_path = get_config_path()?;

    if !config_path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            config_path.display()
        ));
    }

    let content = fs::read_to_string(&config_path).into_diagnostic()?;
    let mut config_map: serde_yml::Value =
        serde_yml::from_str(&content).unwrap_or(serde_yml::Value::Mapping(Default::default()));

    let removed = match &mut config_map {
        serde_yml::Value::Mapping(map) => map
            .remove(&serde_yml::Value::String(args.key.clone()))
            .is_some(),
        _ => false,
    };

    if !removed {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }

    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    println!(
        "{} Removed {} from {}",
        style("✓").green(),
        style(&args.key).cyan(),
        config_path.display()
    );

    Ok(())
}

fn run_path() -> Result<()> {
    let path = get_config_path()?;
    println!("{}", path.display());
    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<20} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style("Use 'pdecalc config set <key> <value>' to set a value.").dim()
    );

    Ok(())
}

// Helper functions

/// File that `set`/`unset` edit: PDECALC_CONFIG if given, else the global config
fn get_config_path() -> Result<PathBuf> {
    Config::env_config_path()
        .or_else(Config::global_config_path)
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))
}

fn validate_key(key: &str) -> Result<()> {
    if VALID_KEYS.iter().any(|(k, _)| *k == key) {
        Ok(())
    } else {
        let known: Vec<&str> = VALID_KEYS.iter().map(|(k, _)| *k).collect();
        Err(miette::miette!(
            "Unknown config key '{}'. Known: {}",
            key,
            known.join(", ")
        ))
    }
}

fn validate_value(key: &str, value: &str) -> Result<()> {
    if key == "default_format" {
        use clap::ValueEnum;
        OutputFormat::from_str(value, true)
            .map_err(|_| miette::miette!("'{}' is not an output format", value))?;
    }
    Ok(())
}

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "bind" => config.bind.clone(),
        "default_format" => config.default_format.clone(),
        "log" => config.log.clone(),
        _ => None,
    }
}

fn print_config_value(key: &str, value: Option<&str>, default: Option<&str>) {
    match (value, default) {
        (Some(v), _) => println!("  {}: {}", style(key).cyan(), style(v).yellow()),
        (None, Some(d)) => println!(
            "  {}: {} {}",
            style(key).cyan(),
            d,
            style("(default)").dim()
        ),
        (None, None) => println!("  {}: {}", style(key).cyan(), style("(not set)").dim()),
    }
}
