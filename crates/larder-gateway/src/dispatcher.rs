use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use larder_types::events::ServerEvent;

use crate::outcome::Delivery;

/// Per-connection state. Never persisted; dropped with the connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated { nickname: String },
}

impl Session {
    pub fn nickname(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { nickname } => Some(nickname),
        }
    }

    /// True when this session is signed in as exactly `nickname`.
    pub fn owns(&self, nickname: &str) -> bool {
        self.nickname() == Some(nickname)
    }
}

struct ConnectionEntry {
    session: Session,
    tx: mpsc::UnboundedSender<ServerEvent>,
}

/// Registry of live connections and their sessions.
///
/// Every connection gets its own unbounded channel, so a single connection
/// sees events in the order they were delivered. Announcements are plain
/// broadcasts: no history, a late joiner misses earlier ones.
#[derive(Clone, Default)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

#[derive(Default)]
struct DispatcherInner {
    connections: RwLock<HashMap<Uuid, ConnectionEntry>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new anonymous connection. Returns (conn_id, receiver).
    pub async fn register(&self) -> (Uuid, mpsc::UnboundedReceiver<ServerEvent>) {
        let conn_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.connections.write().await.insert(
            conn_id,
            ConnectionEntry {
                session: Session::Anonymous,
                tx,
            },
        );
        (conn_id, rx)
    }

    /// Remove a connection, returning the session it held.
    /// Its receiver closes once the last queued event is read.
    pub async fn unregister(&self, conn_id: Uuid) -> Option<Session> {
        self.inner
            .connections
            .write()
            .await
            .remove(&conn_id)
            .map(|entry| entry.session)
    }

    /// Session for `conn_id`; unknown connections are anonymous.
    pub async fn session(&self, conn_id: Uuid) -> Session {
        self.inner
            .connections
            .read()
            .await
            .get(&conn_id)
            .map(|entry| entry.session.clone())
            .unwrap_or_default()
    }

    pub async fn set_session(&self, conn_id: Uuid, session: Session) {
        if let Some(entry) = self.inner.connections.write().await.get_mut(&conn_id) {
            entry.session = session;
        }
    }

    /// Send to one connection.
    pub async fn send_to(&self, conn_id: Uuid, event: ServerEvent) {
        let connections = self.inner.connections.read().await;
        if let Some(entry) = connections.get(&conn_id) {
            let _ = entry.tx.send(event);
        }
    }

    /// Send to every connection except `conn_id`.
    pub async fn send_to_others(&self, conn_id: Uuid, event: ServerEvent) {
        let connections = self.inner.connections.read().await;
        for (id, entry) in connections.iter() {
            if *id != conn_id {
                let _ = entry.tx.send(event.clone());
            }
        }
    }

    /// Send to every connection.
    pub async fn broadcast(&self, event: ServerEvent) {
        let connections = self.inner.connections.read().await;
        for entry in connections.values() {
            let _ = entry.tx.send(event.clone());
        }
    }

    /// Post a status line to every connection.
    pub async fn announce(&self, text: impl Into<String>) {
        self.broadcast(ServerEvent::Announcement { text: text.into() })
            .await;
    }

    /// Fan out the deliveries of one handled command, in order.
    pub async fn deliver(&self, conn_id: Uuid, deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            match delivery {
                Delivery::Caller(event) => self.send_to(conn_id, event).await,
                Delivery::Others(event) => self.send_to_others(conn_id, event).await,
                Delivery::All(event) => self.broadcast(event).await,
                Delivery::Announcement(text) => self.announce(text).await,
            }
        }
    }
}
