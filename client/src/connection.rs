use std::error::Error;
use std::fmt;

use common::snek_client::SnekClient;
use common::{log, MoveDelta, MoveUpdate};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::Status;

#[derive(Debug)]
pub enum ConnectionError {
    Transport(tonic::transport::Error),
    Rejected(Status),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::Transport(e) => write!(f, "failed to connect: {}", e),
            ConnectionError::Rejected(status) => write!(f, "server refused the stream: {}", status),
        }
    }
}

impl Error for ConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConnectionError::Transport(e) => Some(e),
            ConnectionError::Rejected(status) => Some(status),
        }
    }
}

impl From<tonic::transport::Error> for ConnectionError {
    fn from(e: tonic::transport::Error) -> Self {
        ConnectionError::Transport(e)
    }
}

impl From<Status> for ConnectionError {
    fn from(status: Status) -> Self {
        ConnectionError::Rejected(status)
    }
}

/// Both directions of the relay stream, as seen by the game loop.
pub struct Connection {
    pub deltas: mpsc::Sender<MoveDelta>,
    pub updates: mpsc::Receiver<MoveUpdate>,
}

/// Accepts bare `host:port` as well as full URIs.
pub fn normalize_address(address: &str) -> String {
    if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    }
}

/// Opens the relay stream. Relayed updates are forwarded by a background task
/// until the server ends the stream or the game loop stops listening.
pub async fn connect(address: &str, buffer: usize) -> Result<Connection, ConnectionError> {
    let address = normalize_address(address);
    log!("Connecting to {}", address);
    let mut client = SnekClient::connect(address.clone()).await?;

    let (delta_tx, delta_rx) = mpsc::channel(buffer);
    let mut inbound = client.update(ReceiverStream::new(delta_rx)).await?.into_inner();
    log!("Connected to {}", address);

    let (update_tx, update_rx) = mpsc::channel(buffer);
    tokio::spawn(async move {
        loop {
            match inbound.message().await {
                Ok(Some(update)) => {
                    if update_tx.send(update).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    log!("Server closed the stream");
                    break;
                }
                Err(status) => {
                    log!("Error receiving from server: {}", status);
                    break;
                }
            }
        }
    });

    Ok(Connection {
        deltas: delta_tx,
        updates: update_rx,
    })
}
