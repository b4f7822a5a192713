//! Application state shared across routes

use std::sync::Arc;

use dashmap::DashSet;

use crate::config::Config;
use crate::game::WorldHandle;
use crate::ws::protocol::SessionId;

/// Connected WebSocket sessions, whether or not they have joined the game.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashSet<SessionId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashSet::new(),
        }
    }

    pub fn insert(&self, session: SessionId) {
        self.sessions.insert(session);
    }

    pub fn remove(&self, session: SessionId) {
        self.sessions.remove(&session);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub world: WorldHandle,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(config: Config, world: WorldHandle) -> Self {
        Self {
            config: Arc::new(config),
            world,
            sessions: Arc::new(SessionRegistry::new()),
        }
    }
}
