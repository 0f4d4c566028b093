//! HTTP API: one agent turn per chat request

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::agent::Agent;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
}

impl AppState {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent: Arc::new(agent),
        }
    }
}
