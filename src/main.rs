use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use between::build::{self, BuildReport, GenerateRequest};
use between::config::Config;
use between::generator::SumStyle;
use between::logging::{self, LogMode};
use between::lsp;
use between::watch::{SourceEvent, SourceWatcher};

#[derive(Parser)]
#[command(name = "bt")]
#[command(about = "Generate TypeScript and Go types from between schemas")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a .ts or .go file from a schema
    Generate {
        /// Schema file (.bt)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file; the extension picks the target language
        #[arg(short, long)]
        output: PathBuf,

        /// Go package name (default: output file name up to its first dot)
        #[arg(long)]
        go_package_name: Option<String>,

        /// How sum types are discriminated
        #[arg(long, value_enum)]
        sum_style: Option<SumStyle>,

        /// Regenerate whenever the input changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Check schema files and print diagnostics
    Check {
        /// Files or glob patterns
        #[arg(required = true)]
        patterns: Vec<String>,
    },

    /// Run the language server on stdio
    Lsp,

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let mode = match cli.command {
        Commands::Lsp => LogMode::LanguageServer,
        _ => LogMode::Cli,
    };
    let logging_handle = logging::init_logging(&config, mode, cli.debug)?;

    match cli.command {
        Commands::Generate {
            input,
            output,
            go_package_name,
            sum_style,
            watch,
        } => {
            let request = GenerateRequest {
                input,
                output,
                go_package_name,
                sum_style,
            };
            if watch {
                cmd_generate_watch(config, request).await?;
            } else {
                cmd_generate(&config, &request)?;
            }
        }
        Commands::Check { patterns } => {
            cmd_check(&config, &patterns)?;
        }
        Commands::Lsp => {
            let exit = lsp::serve_stdio(&config).await?;
            drop(logging_handle);
            std::process::exit(exit.code());
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn print_report(report: &BuildReport) {
    for line in report.rendered() {
        eprintln!("{line}");
    }
}

fn cmd_generate(config: &Config, request: &GenerateRequest) -> Result<()> {
    let report = build::generate(request, config)?;
    print_report(&report);

    match &report.output {
        Some(output) => {
            println!("Generated {}", output.display());
            Ok(())
        }
        None => bail!(
            "{} has errors; {} was not written",
            request.input.display(),
            request.output.display()
        ),
    }
}

async fn cmd_generate_watch(config: Config, request: GenerateRequest) -> Result<()> {
    // Errors are reported but keep the watch alive
    if let Err(e) = cmd_generate(&config, &request) {
        eprintln!("Error: {e:#}");
    }

    tokio::task::spawn_blocking(move || -> Result<()> {
        let watcher = SourceWatcher::new(&request.input)?;
        println!("Watching {} for changes", request.input.display());

        while let Some(event) = watcher.next() {
            match event {
                SourceEvent::Changed(path) => {
                    tracing::info!(input = %path.display(), "Input changed");
                    if let Err(e) = cmd_generate(&config, &request) {
                        eprintln!("Error: {e:#}");
                    }
                }
                SourceEvent::Removed(path) => {
                    eprintln!("{} was removed; waiting for it to return", path.display());
                }
            }
        }
        Ok(())
    })
    .await
    .context("Watch task panicked")?
}

fn cmd_check(config: &Config, patterns: &[String]) -> Result<()> {
    let reports = build::check_files(patterns, config)?;

    let mut failed = 0;
    for report in &reports {
        print_report(report);
        if report.has_errors() {
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{failed} of {} files have errors", reports.len());
    }
    println!("Checked {} files, no errors", reports.len());
    Ok(())
}
