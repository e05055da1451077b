mod cli;
mod commands;
mod config;
mod error;

use std::process;

use clap::Parser;
use tracing::{Level, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::{
    cli::{Args, Commands},
    commands::CommandExecutor,
    config::AppConfig,
    error::Result,
};

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(args).await {
        error!("Application error: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::Config { show, reset } => {
            if reset {
                let path = AppConfig::reset(args.config.as_deref())?;
                println!("Configuration reset to defaults: {}", path.display());
            } else if show {
                let config = AppConfig::load(args.config.as_deref())?;
                println!("{}", config.show()?);
            } else {
                println!(
                    "Use --show to display current configuration or --reset to reset to defaults"
                );
            }
        }

        Commands::Count {
            user_id,
            data_dir,
            output,
            policy,
            decay_rate,
        } => {
            let executor = CommandExecutor::new(AppConfig::load(args.config.as_deref())?)?;
            executor
                .count(&user_id, &data_dir, &output, policy, decay_rate)
                .await?;
        }

        Commands::Download {
            instance,
            channel,
            start_date,
            end_date,
            data_dir,
        } => {
            let executor = CommandExecutor::new(AppConfig::load(args.config.as_deref())?)?;
            executor
                .download(
                    &instance,
                    &channel,
                    &start_date,
                    end_date.as_deref(),
                    &data_dir,
                )
                .await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(verbose))
        .init();
}
