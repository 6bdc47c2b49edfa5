use tokio_stream::{Stream, StreamExt};
use tonic::Status;
use common::{log, MoveDelta, MoveUpdate, SnakeId};

use crate::session_registry::SessionRegistry;

/// Turns a client's raw delta into the relayed form, with the identity taken
/// from the connection rather than from the client.
pub fn stamp(sender: SnakeId, delta: MoveDelta) -> Option<MoveUpdate> {
    let sender_id = sender.to_wire()?;
    Some(MoveUpdate {
        sender_id,
        new_head: delta.new_head,
        old_tail: delta.old_tail,
    })
}

/// Relays one delta to every other session. Delivery failures are logged and
/// otherwise ignored.
pub async fn relay(registry: &SessionRegistry, sender: SnakeId, delta: MoveDelta) {
    let Some(update) = stamp(sender, delta) else {
        log!("Snake {} does not fit the wire id, dropping its delta", sender);
        return;
    };

    let failures = registry.broadcast(sender, update).await;
    if !failures.is_empty() {
        let failed: Vec<String> = failures.iter().map(ToString::to_string).collect();
        log!("Relaying delta from snake {} failed for {}", sender, failed.join(", "));
    }
}

/// Receive loop of one session: relays every delta until the stream ends and
/// then unregisters the session. A transport error ends the session too and is
/// handed back to the caller for logging.
pub async fn run_session<S>(registry: SessionRegistry, sender: SnakeId, mut deltas: S) -> Result<(), Status>
where
    S: Stream<Item = Result<MoveDelta, Status>> + Unpin,
{
    let result = loop {
        match deltas.next().await {
            Some(Ok(delta)) => relay(&registry, sender, delta).await,
            Some(Err(status)) => break Err(status),
            None => break Ok(()),
        }
    };

    registry.unregister(sender).await;
    if result.is_ok() {
        log!("Stream ended for snake {}", sender);
    }
    result
}
