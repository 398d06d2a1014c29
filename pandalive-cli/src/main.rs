mod cli;
mod commands;
mod config;
mod error;
mod output;

use crate::{
    cli::{Args, Commands, OutputFormat},
    commands::{CommandExecutor, ExtractOptions},
    config::AppConfig,
    error::{CliError, Result},
};
use clap::Parser;
#[cfg(feature = "colored-output")]
use colored::*;
use pandalive_parser::extractor::install_rustls_provider;
use std::{process, time::Duration};
use tracing::{Level, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);
    install_rustls_provider();

    let config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            report_error(&e, false);
            process::exit(e.exit_code());
        }
    };

    let json_errors = output_format(&args.command, &config).is_some_and(|o| o.is_json());

    if let Err(e) = run(args, config).await {
        report_error(&e, json_errors);
        process::exit(e.exit_code());
    }
}

/// Effective output format of commands that print results: the flag if given,
/// else the configured default.
fn output_format(command: &Commands, config: &AppConfig) -> Option<OutputFormat> {
    match command {
        Commands::Extract { output, .. } | Commands::Platforms { output } => {
            Some(output.unwrap_or(config.output))
        }
        _ => None,
    }
}

async fn run(args: Args, config: AppConfig) -> Result<()> {
    let format = output_format(&args.command, &config).unwrap_or_default();

    match args.command {
        Commands::Extract {
            url,
            output_file,
            cookies,
            extras,
            timeout,
            ..
        } => {
            let timeout = Duration::from_secs(timeout.unwrap_or(config.timeout));
            let executor = CommandExecutor::new(config, args.proxy);
            executor
                .extract_single(ExtractOptions {
                    url: &url,
                    cookies: cookies.as_deref(),
                    extras: extras.as_deref(),
                    output: format,
                    output_file: output_file.as_deref(),
                    timeout,
                })
                .await?;
        }

        Commands::Platforms { .. } => {
            CommandExecutor::new(config, args.proxy).list_platforms(&format)?;
        }

        Commands::Completions { shell } => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Args::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        }

        Commands::Config { show, reset } => {
            if reset {
                AppConfig::reset(args.config.as_deref())?;
                println!("Configuration reset to defaults");
            } else if show {
                println!("{}", config.show()?);
            } else {
                println!(
                    "Use --show to display current configuration or --reset to reset to defaults"
                );
            }
        }
    }

    Ok(())
}

fn report_error(e: &CliError, json: bool) {
    let status = if e.exit_code() == 2 { "not_live" } else { "error" };

    if json {
        let error_json = serde_json::json!({
            "status": status,
            "message": e.to_string(),
        });
        println!("{error_json}");
        return;
    }

    if status == "not_live" {
        eprintln!("{e}");
        return;
    }

    error!("Application error: {}", e);
    #[cfg(feature = "colored-output")]
    {
        eprintln!("{} {}", "Error:".red().bold(), e);
    }
    #[cfg(not(feature = "colored-output"))]
    {
        eprintln!("Error: {}", e);
    }
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
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .init();
}
