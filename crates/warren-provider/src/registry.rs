//! Token to client registry shared by concurrent reconciliations

use crate::client::WarrenClient;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Cloneable handle to the process-wide client map
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    clients: Arc<RwLock<HashMap<String, Arc<WarrenClient>>>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, token: &str) -> Option<Arc<WarrenClient>> {
        let clients = self.clients.read().unwrap_or_else(|e| e.into_inner());
        clients.get(token).cloned()
    }

    /// Register a client, returning the one it replaces
    pub fn insert(&self, token: impl Into<String>, client: Arc<WarrenClient>) -> Option<Arc<WarrenClient>> {
        let mut clients = self.clients.write().unwrap_or_else(|e| e.into_inner());
        clients.insert(token.into(), client)
    }

    pub fn remove(&self, token: &str) -> Option<Arc<WarrenClient>> {
        let mut clients = self.clients.write().unwrap_or_else(|e| e.into_inner());
        clients.remove(token)
    }

    pub fn len(&self) -> usize {
        self.clients.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
