use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::shutdown::Shutdown;
use crate::store::Store;

/// One request per connection: the client sends an instance key, the
/// server answers with the stored payload and closes.
pub struct Server {
    listener: TcpListener,
    store: Arc<Store>,
    shutdown: Shutdown,
}

impl Server {
    pub fn new(listener: TcpListener, store: Store) -> Self {
        Self {
            listener,
            store: Arc::new(store),
            shutdown: Shutdown::new(),
        }
    }

    /// Handle for the signal watcher. Draining it stops the accept loop
    /// and waits for connections already being served.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Accepts connections until shutdown is requested. Returns as soon as
    /// the request arrives; in-flight handlers keep running and are waited
    /// on by the drain.
    pub async fn serve(&self) -> anyhow::Result<()> {
        loop {
            tokio::select! {
                _ = self.shutdown.requested() => break,
                accepted = self.listener.accept() => {
                    let (stream, addr) = accepted?;
                    log::info!("Connected by {addr}");

                    let store = self.store.clone();
                    self.shutdown.track(async move {
                        if let Err(e) = handle_client(stream, store).await {
                            log::error!("client {addr}: {e}");
                        }
                    });
                }
            }
        }

        Ok(())
    }
}

async fn handle_client(mut stream: TcpStream, store: Arc<Store>) -> std::io::Result<()> {
    // The key arrives in one short write from the client.
    let mut buffer = [0u8; 1024];
    let n = stream.read(&mut buffer).await?;
    if n == 0 {
        return Ok(());
    }

    let key = std::str::from_utf8(&buffer[..n])
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?
        .trim();
    if key.is_empty() {
        return Ok(());
    }

    match store.get(key) {
        Some(payload) => stream.write_all(payload.as_bytes()).await?,
        None => {
            log::error!("Instance {key} not found.");
            stream
                .write_all(format!("Instance {key} not found.").as_bytes())
                .await?;
        }
    }

    // Closing the write side is the end-of-message signal; there is no
    // length framing on the wire.
    stream.shutdown().await
}
