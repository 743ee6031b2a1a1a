mod config_cmd;
mod extract_cmd;
mod map_cmd;
mod runtime;
mod status_cmd;
mod terminal_output;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lcforge_gateway::{start_server, AppState};
use tracing::info;

use config_cmd::ConfigCommands;
use runtime::Runtime;

#[derive(Parser)]
#[command(name = "lcforge")]
#[command(about = "LcForge: fill letter-of-credit request forms from document images")]
#[command(version)]
struct Cli {
    /// Config file (default: $LCFORGE_CONFIG_DIR/config.yaml or ~/.lcforge/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run one image through OCR, mapping and merge, then print the form
    Extract {
        image: PathBuf,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Map raw text (a file, or stdin) to form fields
    Map {
        file: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Query a running server's health endpoint
    Status {
        /// Server base URL (default: http://127.0.0.1:<configured port>)
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let runtime = Runtime::load(cli.config.as_deref()).await?;

    let ok = match cli.command {
        Commands::Serve { port } => {
            run_server(&runtime, port).await?;
            true
        }
        Commands::Extract { image, json } => extract_cmd::run(&runtime, &image, json).await?,
        Commands::Map { file, json } => map_cmd::run(&runtime, file.as_deref(), json).await?,
        Commands::Config { command } => config_cmd::run(command, &runtime).await?,
        Commands::Status { url } => {
            let url = url.unwrap_or_else(|| {
                format!("http://127.0.0.1:{}", runtime.config.server().port_or_default())
            });
            status_cmd::run(&url).await?
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn run_server(runtime: &Runtime, port: Option<u16>) -> Result<()> {
    let server = runtime.config.server();
    let port = port.unwrap_or_else(|| server.port_or_default());
    let addr: SocketAddr = format!("{}:{}", server.bind_or_default(), port)
        .parse()
        .context("Invalid bind address")?;

    let extractor = runtime.extractor().await?;
    let mapper = runtime.mapper();
    info!(
        addr = %addr,
        ocr = %extractor.name(),
        engine = %mapper.provider_name(),
        model = %mapper.model(),
        "Starting LcForge"
    );

    let state = Arc::new(
        AppState::new(extractor, mapper, runtime.timeouts()).with_session_ttl(server.session_ttl()),
    );
    start_server(addr, state, server.max_upload_bytes_or_default()).await
}
