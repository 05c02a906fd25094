//! Shared state for the development server.
//!
//! Tracks connected SSE clients behind a parking_lot RwLock and fans events
//! out to all of them.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::dev::DevEvent;

/// Client connection tracker for Server-Sent Events.
pub type ClientRegistry = Arc<RwLock<HashMap<usize, mpsc::Sender<String>>>>;

/// Shared development server state.
pub struct DevServerState {
    /// Connected SSE clients
    pub clients: ClientRegistry,

    /// Next client ID
    next_client_id: RwLock<usize>,

    /// Generated site served from disk
    site_dir: PathBuf,
}

impl DevServerState {
    pub fn new(site_dir: PathBuf) -> Self {
        Self {
            clients: Arc::new(RwLock::new(HashMap::new())),
            next_client_id: RwLock::new(0),
            site_dir,
        }
    }

    /// Register a new SSE client.
    ///
    /// # Returns
    ///
    /// Client ID and receiver for serialized events
    pub fn register_client(&self) -> (usize, mpsc::Receiver<String>) {
        let id = {
            let mut next_id = self.next_client_id.write();
            let id = *next_id;
            *next_id += 1;
            id
        };

        let (tx, rx) = mpsc::channel(100);
        self.clients.write().insert(id, tx);

        (id, rx)
    }

    /// Unregister an SSE client.
    pub fn unregister_client(&self, id: usize) {
        self.clients.write().remove(&id);
    }

    /// Send an event to every connected client without waiting.
    ///
    /// Clients whose channel is closed or full are dropped from the registry;
    /// a stalled page reconnects and reloads on its own.
    pub fn broadcast(&self, event: &DevEvent) {
        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("failed to serialize dev event: {e}");
                return;
            }
        };

        let clients = self.clients.read().clone();
        tracing::debug!(clients = clients.len(), event = %json, "broadcasting");

        let mut failed_ids = Vec::new();
        for (id, tx) in clients {
            match tx.try_send(json.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::debug!("Client {id} is not keeping up, dropping it");
                    failed_ids.push(id);
                }
                Err(TrySendError::Closed(_)) => failed_ids.push(id),
            }
        }

        for id in failed_ids {
            self.unregister_client(id);
        }
    }

    /// Get number of connected clients.
    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    pub fn site_dir(&self) -> &Path {
        &self.site_dir
    }
}

/// Shared state handle.
pub type SharedState = Arc<DevServerState>;
