//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the loaded
//! configuration and the room directory used for occupancy checks.

use crate::{config::Config, occupancy::RoomDirectory};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub directory: Arc<dyn RoomDirectory>,
}
