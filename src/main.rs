use clap::Parser;
use miette::Result;
use pdecalc::cli::{Cli, Commands, GlobalOpts};
use pdecalc::core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    let (config, config_warnings) = Config::load();

    let default_level = match cli.command {
        Commands::Serve(_) => "info",
        _ => "warn",
    };
    init_logging(&global, &config, default_level);
    for warning in &config_warnings {
        warning.log();
    }

    match cli.command {
        Commands::Calc(args) => pdecalc::cli::commands::calc::run(args, &global, &config),
        Commands::Batch(args) => pdecalc::cli::commands::batch::run(args, &global, &config),
        Commands::Factors(args) => pdecalc::cli::commands::factors::run(args, &global, &config),
        Commands::Serve(args) => pdecalc::cli::commands::serve::run(args, &global, &config),
        Commands::Config(cmd) => pdecalc::cli::commands::config::run(cmd, &global, &config),
        Commands::Completions(args) => pdecalc::cli::commands::completions::run(args),
    }
}

/// Log to stderr so command output on stdout stays pipeable.
///
/// Filter priority: --verbose, then `log` from config (PDECALC_LOG), then RUST_LOG.
fn init_logging(global: &GlobalOpts, config: &Config, default_level: &str) {
    let filter = if global.verbose {
        EnvFilter::new("debug")
    } else if let Some(directive) = config.log.as_deref() {
        EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(default_level))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
