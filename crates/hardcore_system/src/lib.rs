//! # Hardcore System
//!
//! Per-world hardcore tracking for a multi-world game server. A hardcore world is
//! a group of dimensions (overworld, nether, end) that share one hardcore status:
//! dying in any of them makes the player dead in the whole world, while the rest
//! of the server keeps playing normally.
//!
//! ## Components
//!
//! - **World Group Registry** ([`WorldGroupRegistry`]): maps dimensions to their
//!   hardcore world and holds per-world policy, backed by a TOML configuration
//! - **Player State Store** ([`PlayerWorldStateStore`]): which dimensions each
//!   player visited and died in, persisted as JSON after every change
//! - **Culling** ([`find_cullable`]): worlds whose every visitor is dead
//! - **Transition State Machine** ([`TransitionStateMachine`]): the decision for
//!   each death, respawn, join and teleport
//! - **World Orchestration** ([`WorldOrchestrator`]): the boundary to whatever
//!   physically creates and deletes worlds
//!
//! [`HardcoreSystem`] ties these together and is what hosts talk to.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hardcore_system::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), HardcoreError> {
//!     let system = HardcoreSystem::open(
//!         Arc::new(TomlConfigFile::new("config.toml")),
//!         Arc::new(JsonStateFile::new("data.json")),
//!         Arc::new(ConsoleOrchestrator::stdout()),
//!     )?;
//!
//!     let player = PlayerId::new();
//!     system.on_join_or_world_change(player, &"hc-1".into());
//!
//!     match system.on_death(player, &"hc-1_nether".into()) {
//!         Decision::HandleOnRespawn { world } => println!("{player} is now dead in {world}"),
//!         _ => println!("not a hardcore dimension"),
//!     }
//!
//!     let report = system.cull(false);
//!     println!("{} worlds can be culled", report.cullable.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod culling;
pub mod error;
pub mod events;
pub mod orchestration;
pub mod registry;
pub mod store;
pub mod system;
pub mod transitions;
pub mod types;

pub use config::{ConfigBackend, ConfigDocument, MemoryConfig, TomlConfigFile};
pub use culling::find_cullable;
pub use error::{HardcoreError, Result};
pub use events::{
    PlayerDeathEvent, PlayerJoinEvent, PlayerRespawnEvent, PlayerTeleportEvent,
    PlayerWorldChangeEvent,
};
pub use orchestration::{ConsoleOrchestrator, WorldCommand, WorldOrchestrator};
pub use registry::WorldGroupRegistry;
pub use store::{
    JsonStateFile, MemoryState, PlayerWorldState, PlayerWorldStateStore, StateBackend,
    StateSnapshot,
};
pub use system::{CullReport, DimensionStatus, HardcoreSystem, WorldStatus};
pub use transitions::{Decision, TransitionStateMachine};
pub use types::*;
