use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::types::WsMessage;

pub type WsSender = mpsc::UnboundedSender<WsMessage>;

/// Registry of live WebSocket sessions, keyed by user id. A second login
/// replaces the previous session's sender.
#[derive(Clone)]
pub struct ConnectionManager {
    connections: Arc<DashMap<Uuid, WsSender>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(DashMap::new()),
        }
    }

    pub fn add_connection(&self, user_id: Uuid, sender: WsSender) {
        self.connections.insert(user_id, sender);
        tracing::info!("User {} connected via WebSocket", user_id);
    }

    pub fn remove_connection(&self, user_id: &Uuid) {
        self.connections.remove(user_id);
        tracing::info!("User {} disconnected from WebSocket", user_id);
    }

    /// Best-effort delivery to one user. Returns false when the user has no
    /// live session or the session's channel is closed.
    pub fn send_to_user(&self, user_id: &Uuid, message: WsMessage) -> bool {
        if let Some(sender) = self.connections.get(user_id) {
            sender.send(message).is_ok()
        } else {
            false
        }
    }

    /// Broadcast a message to all connected users
    pub fn broadcast(&self, message: WsMessage) {
        for entry in self.connections.iter() {
            let _ = entry.value().send(message.clone());
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_to_user_is_best_effort() {
        let manager = ConnectionManager::new();
        let user_id = Uuid::new_v4();

        // No session registered yet.
        assert!(!manager.send_to_user(&user_id, WsMessage::Pong));

        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.add_connection(user_id, tx);
        assert!(manager.send_to_user(&user_id, WsMessage::Pong));
        assert!(matches!(rx.recv().await, Some(WsMessage::Pong)));

        manager.remove_connection(&user_id);
        assert!(!manager.send_to_user(&user_id, WsMessage::Pong));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_session() {
        let manager = ConnectionManager::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        manager.add_connection(Uuid::new_v4(), tx_a);
        manager.add_connection(Uuid::new_v4(), tx_b);

        manager.broadcast(WsMessage::Pong);

        assert!(matches!(rx_a.recv().await, Some(WsMessage::Pong)));
        assert!(matches!(rx_b.recv().await, Some(WsMessage::Pong)));
    }
}
