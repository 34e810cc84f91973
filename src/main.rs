use clap::Parser;
use tower_lsp::{LspService, Server};
use tracing::info;

use gas_macro_lsp::backend::Backend;

/// Language server for GNU assembler sources with C preprocessor macros.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Minimum level of log lines written to stderr
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,

    /// Talk over stdin/stdout. This is the only transport; the flag is
    /// accepted because most clients pass it.
    #[arg(long)]
    stdio: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;

    info!("stopped");
    Ok(())
}
