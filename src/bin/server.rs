use clap::Parser;
use docsdoc::api::{self, AppState};
use docsdoc::{logging, Config, DocsService};
use std::path::PathBuf;
use tracing::{error, info};

/// Docs' Doc HTTP server
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overrides the configuration
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("server failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> docsdoc::Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    logging::init(&config.server.log_level)?;

    info!("Docs' Doc server starting");
    info!("Health check: http://{}/health", config.server.bind_addr);

    let service = DocsService::from_config(&config)?;
    api::serve(AppState::new(service), &config.server.bind_addr).await
}
