//! `pdecalc serve` command - run the HTTP API

use console::style;
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::server::{self, Api, ServerError};

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (default: config `bind`, then 127.0.0.1:5000)
    #[arg(long, short = 'b')]
    pub bind: Option<String>,
}

pub fn run(args: ServeArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let addr = args.bind.unwrap_or_else(|| config.bind());
    let quiet = global.quiet;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;

    runtime.block_on(async move {
        let api = Arc::new(Api::new()?);
        let listener = server::bind(&addr).await?;
        if !quiet {
            println!(
                "{} PDE calculator API on {} (Ctrl-C to stop)",
                style("✓").green(),
                style(format!("http://{}", listener.local_addr()?)).cyan()
            );
        }
        server::serve(listener, api, server::shutdown_signal()).await?;
        Ok::<(), ServerError>(())
    })?;

    Ok(())
}
