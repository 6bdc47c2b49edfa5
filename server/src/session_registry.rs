use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tonic::Status;
use common::{MoveUpdate, SnakeId};

pub type SessionSender = mpsc::Sender<Result<MoveUpdate, Status>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// The session's outbound stream is gone; its receive loop will clean up.
    Disconnected,
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::Disconnected => write!(f, "outbound stream closed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub recipient: SnakeId,
    pub reason: DeliveryError,
}

impl fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "snake {}: {}", self.recipient, self.reason)
    }
}

impl std::error::Error for DeliveryFailure {}

struct Sessions {
    highest_id: SnakeId,
    senders: HashMap<SnakeId, SessionSender>,
}

/// Every connected snake and the channel feeding its outbound stream.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<Sessions>>,
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry").finish()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(Sessions {
                highest_id: SnakeId::new(0),
                senders: HashMap::new(),
            })),
        }
    }

    /// Hands out the next identity and stores the session under it.
    pub async fn register(&self, sender: SessionSender) -> SnakeId {
        let mut sessions = self.sessions.lock().await;
        let id = sessions.highest_id.next();
        sessions.highest_id = id;
        sessions.senders.insert(id, sender);
        id
    }

    /// Returns whether the session was still registered.
    pub async fn unregister(&self, id: SnakeId) -> bool {
        self.sessions.lock().await.senders.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.senders.len()
    }

    #[cfg(test)]
    pub async fn is_registered(&self, id: SnakeId) -> bool {
        self.sessions.lock().await.senders.contains_key(&id)
    }

    /// Sends `update` to every session except `origin`.
    ///
    /// The lock is held for the whole fan-out. A failed recipient does not stop
    /// delivery to the rest and is not removed here.
    pub async fn broadcast(&self, origin: SnakeId, update: MoveUpdate) -> Vec<DeliveryFailure> {
        let sessions = self.sessions.lock().await;
        let mut failures = Vec::new();
        for (&recipient, sender) in &sessions.senders {
            if recipient == origin {
                continue;
            }
            if sender.send(Ok(update.clone())).await.is_err() {
                failures.push(DeliveryFailure {
                    recipient,
                    reason: DeliveryError::Disconnected,
                });
            }
        }
        failures
    }
}
