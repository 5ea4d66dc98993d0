mod cli;
mod commands;
mod config;
mod context;
mod error;
mod output;

use crate::{
    cli::{Args, Commands},
    commands::CommandExecutor,
    config::AppConfig,
    context::AppContext,
    error::Result,
    output::OutputManager,
};
use clap::Parser;
use std::{io::IsTerminal, process};
use tracing::{Level, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let format = args.output;

    if let Err(e) = run(args).await {
        error!("Application error: {}", e);
        let output = OutputManager::new(std::io::stderr().is_terminal());
        match format {
            cli::OutputFormat::Json => println!("{}", output.format_error(&e.to_string(), format)),
            cli::OutputFormat::Pretty => eprintln!("{}", output.format_error(&e.to_string(), format)),
        }
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    init_logging(args.verbose, args.quiet)?;

    let config_path = args.config.as_deref();
    let format = args.output;

    match args.command {
        Commands::Config { show, reset } => {
            if reset {
                let path = AppConfig::reset(config_path)?;
                println!("✓ Configuration reset to defaults ({})", path.display());
            } else if show {
                let config = AppConfig::load(config_path)?;
                println!("{}", config.show()?);
            } else {
                println!(
                    "Use --show to display current configuration or --reset to reset to defaults"
                );
            }
            return Ok(());
        }
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Args::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let config = AppConfig::load(config_path)?;
    let context = AppContext::new(&config)?;
    let executor = CommandExecutor::new(context, format, std::io::stdout().is_terminal());

    match args.command {
        Commands::Resolve { content_id, tv } => executor.resolve(&content_id, tv).await?,
        Commands::Extract { imdb_id, tv } => executor.extract(&imdb_id, tv).await?,
        Commands::Capture {
            url,
            timeout,
            user_agent,
            no_wait,
        } => executor.capture(&url, timeout, user_agent, no_wait).await?,
        Commands::Subtitles {
            imdb_id,
            lang,
            tv,
            download,
            output_file,
        } => {
            executor
                .subtitles(
                    &imdb_id,
                    &lang,
                    tv,
                    download.as_deref(),
                    output_file.as_deref(),
                )
                .await?
        }
        Commands::Levels { manifest_url } => executor.levels(&manifest_url).await?,
        Commands::Config { .. } | Commands::Completions { .. } => {}
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .init();
    Ok(())
}
