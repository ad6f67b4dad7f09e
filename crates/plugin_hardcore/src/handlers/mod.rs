//! # Event Handlers
//!
//! One module per kind of host notification. Each handler asks the
//! [`HardcoreSystem`] for a [`Decision`](hardcore_system::Decision) and applies it
//! through the [`PlayerHost`]:
//!
//! - [`death`] - records the death, defers the outcome to respawn
//! - [`respawn`] - spectator in place or survival at the hub
//! - [`connection`] - joins and completed world changes
//! - [`movement`] - cancellable teleports between dimensions

use crate::host::PlayerHost;
use crate::messages::MessageCatalog;
use hardcore_system::{DimensionName, HardcoreSystem};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod connection;
pub mod death;
pub mod movement;
pub mod respawn;

pub use connection::*;
pub use death::*;
pub use movement::*;
pub use respawn::*;

/// Everything a handler needs, shared by the plugin across handlers.
pub struct HandlerContext {
    pub system: Arc<HardcoreSystem>,
    pub host: Arc<dyn PlayerHost>,
    pub messages: MessageCatalog,
}

/// What the host must do with the event that triggered a handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerOutcome {
    /// Cancel the triggering move.
    pub cancelled: bool,
    /// Respawn the player at this dimension's spawn instead of where the host
    /// resolved the respawn point.
    pub respawn_dimension: Option<DimensionName>,
}

impl HandlerOutcome {
    pub fn proceed() -> Self {
        Self::default()
    }

    pub fn cancel() -> Self {
        Self {
            cancelled: true,
            respawn_dimension: None,
        }
    }

    pub fn respawn_at(dimension: DimensionName) -> Self {
        Self {
            cancelled: false,
            respawn_dimension: Some(dimension),
        }
    }
}
