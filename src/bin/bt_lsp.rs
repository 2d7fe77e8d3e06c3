//! Standalone language server, equivalent to `bt lsp`.

use anyhow::Result;
use clap::Parser;

use between::config::Config;
use between::logging::{self, LogMode};
use between::lsp;

#[derive(Parser)]
#[command(name = "bt-lsp")]
#[command(about = "Language server for between schemas (stdio)")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Accepted for compatibility with clients that pass it; stdio is the only transport
    #[arg(long, hide = true)]
    stdio: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let logging_handle = logging::init_logging(&config, LogMode::LanguageServer, cli.debug)?;
    tracing::debug!(stdio = cli.stdio, "Starting bt-lsp");

    let exit = lsp::serve_stdio(&config).await?;
    drop(logging_handle);
    std::process::exit(exit.code());
}
