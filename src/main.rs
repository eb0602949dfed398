use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use vexgate_api::RestApi;
use vexgate_core::Gateway;
use vexgate_store::RemoteStore;

/// A schema-less JSON gateway for a vector-search document store
#[derive(Parser, Debug)]
#[command(name = "vexgate")]
#[command(about = "JSON marshaling gateway for a vector-search store", long_about = None)]
struct Args {
    /// HTTP API port
    #[arg(long, default_value_t = 8080)]
    http_port: u16,

    /// Address of the backend document store
    #[arg(long, default_value = "http://127.0.0.1:10000")]
    store_addr: String,

    /// Timeout for each backend call, in milliseconds
    #[arg(long, default_value_t = 1000)]
    store_timeout_ms: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting vexgate v{}", env!("CARGO_PKG_VERSION"));
    info!("Backend store: {}", args.store_addr);
    info!("HTTP API port: {}", args.http_port);

    let store = RemoteStore::connect_lazy(&args.store_addr)?
        .with_timeout(Duration::from_millis(args.store_timeout_ms));
    let gateway = Arc::new(Gateway::new(store));

    info!("HTTP API: http://localhost:{}/", args.http_port);
    RestApi::start(gateway, args.http_port).await?;

    info!("Shutting down...");
    Ok(())
}
