use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use filmotheque_server::config::{ConfigOverrides, ServerConfig};
use filmotheque_server::routes::create_router;
use filmotheque_server::state::AppState;

/// Personal film catalog web server with face detection on film images.
#[derive(Parser)]
#[command(name = "filmotheque", version)]
struct Cli {
    /// JSON config file (defaults to ./filmotheque.json when present).
    #[arg(long, env = "FILMOTHEQUE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind.
    #[arg(long, env = "FILMOTHEQUE_HOST")]
    host: Option<String>,

    /// Port to listen on.
    #[arg(long, env = "FILMOTHEQUE_PORT")]
    port: Option<u16>,

    /// Catalog file, one film per line.
    #[arg(long, env = "FILMOTHEQUE_CATALOG_FILE")]
    catalog_file: Option<PathBuf>,

    /// Directory served under /static; uploads go to its images/ folder.
    #[arg(long, env = "FILMOTHEQUE_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Serve film pages without face detection.
    #[arg(long, env = "FILMOTHEQUE_NO_DETECTION")]
    no_detection: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            catalog_file: self.catalog_file.clone(),
            static_dir: self.static_dir.clone(),
            disable_detection: self.no_detection,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = ServerConfig::load(cli.config.as_deref())?;
    cli.overrides().apply(&mut config);
    config.validate()?;

    // model download uses a blocking HTTP client, so build before the runtime
    let state = Arc::new(AppState::from_config(&config)?);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(state, config.bind_address()))
}

async fn serve(state: Arc<AppState>, address: String) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}
