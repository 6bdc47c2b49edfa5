use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status, Streaming};
use common::{log, snek_server::Snek, MoveDelta, MoveUpdate};

use crate::replication::run_session;
use crate::session_registry::SessionRegistry;

#[derive(Debug)]
pub struct SnekService {
    registry: SessionRegistry,
    outbound_buffer: usize,
}

impl SnekService {
    pub fn new(registry: SessionRegistry, outbound_buffer: usize) -> Self {
        Self {
            registry,
            outbound_buffer,
        }
    }
}

#[tonic::async_trait]
impl Snek for SnekService {
    type UpdateStream = ReceiverStream<Result<MoveUpdate, Status>>;

    async fn update(
        &self,
        request: Request<Streaming<MoveDelta>>,
    ) -> Result<Response<Self::UpdateStream>, Status> {
        let in_stream = request.into_inner();
        let (tx, rx) = mpsc::channel(self.outbound_buffer);

        let snake_id = self.registry.register(tx).await;
        log!("Started stream for snake {} ({} connected)", snake_id, self.registry.len().await);

        let registry = self.registry.clone();
        tokio::spawn(async move {
            if let Err(status) = run_session(registry, snake_id, in_stream).await {
                log!("Stream for snake {} failed: {}", snake_id, status);
            }
        });

        Ok(Response::new(ReceiverStream::new(rx)))
    }
}
