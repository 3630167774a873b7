use bike_flow::config::{Config, REQUIRED_VARIABLES};
use bike_flow::server::Server;
use bike_flow::shutdown;
use bike_flow::store::Store;

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        log::error!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::env().inspect_err(|e| {
        log::error!(
            "config: {e}. Check all required environment variables ({}) are set.",
            REQUIRED_VARIABLES.join(", ")
        );
    })?;

    config.log();

    let store = Store::load_dir(&config.data_dir)?;
    log::info!(
        "Loaded {} instances from {}",
        store.len(),
        config.data_dir.display()
    );

    let listen_addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    log::info!("Server listening on {listen_addr}");

    let server = Server::new(listener, store);

    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(shutdown::watch(server.shutdown_handle(), done_tx));

    server.serve().await?;

    // Exit only after the watcher finished the drain and its logging.
    let _ = done_rx.await;
    log::info!("Graceful shutdown complete.");

    Ok(())
}
