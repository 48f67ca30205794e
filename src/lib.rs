//! Crate entrypoint wiring together zone editing, persistence and the HTTP API.

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod exec;
pub mod manager;
pub mod store;
pub mod validation;
pub mod zone;

#[cfg(test)]
mod testing;

use manager::ZoneManager;

use std::sync::Arc;
use tokio::sync::Mutex;

/// Complete application dependencies shared across handlers.
pub struct AppState {
    pub manager: ZoneManager,
    /// Held for the whole of every add/remove so requests never interleave
    /// on the zone file.
    pub write_lock: Mutex<()>,
}

impl AppState {
    pub fn new(manager: ZoneManager) -> Self {
        Self {
            manager,
            write_lock: Mutex::new(()),
        }
    }
}

/// Arc-wrapped version of `AppState` passed into Axum extensions.
pub type SharedState = Arc<AppState>;
