use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::model::FlowData;

pub const DEFAULT_ADDR: &str = "localhost:65432";

#[derive(Debug, thiserror::Error)]
pub enum RetrieveError {
    #[error("error connecting to server: {0}")]
    Connect(#[source] std::io::Error),

    #[error("error reading input: {0}")]
    Input(#[source] std::io::Error),

    #[error("error sending data: {0}")]
    Send(#[source] std::io::Error),

    #[error("error reading response: {0}")]
    Read(#[source] std::io::Error),

    #[error("error decoding response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Opens the stream to the flow server. No retry: an unreachable or
/// refusing endpoint fails the invocation.
pub async fn connect(address: &str) -> Result<TcpStream, RetrieveError> {
    TcpStream::connect(address)
        .await
        .map_err(RetrieveError::Connect)
}

/// Prompts for and reads one line from stdin, trimmed of surrounding
/// whitespace. The key format is not validated here.
pub fn read_key(prompt: &str) -> Result<String, RetrieveError> {
    println!("{prompt}");

    let mut line = String::new();
    let n = std::io::stdin()
        .read_line(&mut line)
        .map_err(RetrieveError::Input)?;

    if n == 0 {
        return Err(RetrieveError::Input(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "end of input",
        )));
    }

    Ok(line.trim().to_string())
}

/// Sends the instance key as raw bytes, no terminator. Loops until every
/// byte is written.
pub async fn send_key(stream: &mut TcpStream, key: &str) -> Result<(), RetrieveError> {
    stream
        .write_all(key.as_bytes())
        .await
        .map_err(RetrieveError::Send)?;
    stream.flush().await.map_err(RetrieveError::Send)
}

/// Accumulates the whole response. The wire carries no length framing; the
/// server signals end-of-message by closing the connection, so end of
/// stream is the only termination condition.
pub async fn read_response(stream: &mut TcpStream) -> Result<Vec<u8>, RetrieveError> {
    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .await
        .map_err(RetrieveError::Read)?;
    Ok(response)
}

/// Runs the full retrieval protocol for one key.
pub async fn retrieve(address: &str, key: &str) -> Result<FlowData, RetrieveError> {
    let mut stream = connect(address).await?;

    send_key(&mut stream, key).await?;
    let response = read_response(&mut stream).await?;

    Ok(crate::decode::decode(&response)?)
}
