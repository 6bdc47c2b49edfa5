mod replication;
mod server_config;
mod session_registry;
mod snek_service;

use std::path::PathBuf;
use clap::Parser;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use common::{config::{ConfigManager, Validate}, log, logger, snek_server::SnekServer};
use server_config::{ServerConfig, DEFAULT_CONFIG_FILE};
use session_registry::SessionRegistry;
use snek_service::SnekService;

#[derive(Parser)]
#[command(name = "snek_server")]
struct Args {
    /// YAML configuration file; missing means defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Overrides `listen_address` from the configuration.
    #[arg(long)]
    listen: Option<String>,

    #[arg(long)]
    use_log_prefix: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Server".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    let mut config: ServerConfig = ConfigManager::from_yaml_file(&args.config).load()?;
    if let Some(listen) = args.listen {
        config.listen_address = listen;
        config.validate()?;
    }

    let addr = config.socket_address()?;
    let listener = TcpListener::bind(addr).await?;
    log!("Snek server listening on tcp://{}", listener.local_addr()?);

    let service = SnekService::new(SessionRegistry::new(), config.outbound_buffer);
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        log!("Shutdown signal received");
    };

    Server::builder()
        .add_service(SnekServer::new(service))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown_signal)
        .await?;

    log!("Server shut down gracefully");

    Ok(())
}
