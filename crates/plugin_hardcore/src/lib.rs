//! # Hardcore Plugin
//!
//! Connects the per-world hardcore rules of [`hardcore_system`] to a running game
//! server. The host forwards player notifications to the plugin and carries out
//! the returned [`HandlerOutcome`]; everything players see or experience goes
//! through the [`PlayerHost`] trait.
//!
//! ## Notifications
//!
//! | Event name            | Payload                  | Cancellable |
//! |-----------------------|--------------------------|-------------|
//! | `player_death`        | `PlayerDeathEvent`       | no          |
//! | `player_respawn`      | `PlayerRespawnEvent`     | no          |
//! | `player_join`         | `PlayerJoinEvent`        | no          |
//! | `player_world_change` | `PlayerWorldChangeEvent` | no          |
//! | `player_teleport`     | `PlayerTeleportEvent`    | yes         |
//!
//! Payloads arrive as JSON and are decoded into the typed events before dispatch.
//!
//! ## Module Organization
//!
//! - [`handlers`] - one handler per notification
//! - [`host`] - the [`PlayerHost`] trait and game modes
//! - [`messages`] - player-facing message catalog

use hardcore_system::config::MESSAGES;
use hardcore_system::{
    ConfigBackend, HardcoreSystem, JsonStateFile, TomlConfigFile, WorldOrchestrator,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub mod error;
pub mod handlers;
pub mod host;
pub mod messages;

#[cfg(test)]
mod testing;

pub use error::PluginError;
pub use handlers::{HandlerContext, HandlerOutcome};
pub use host::{GameMode, PlayerHost};
pub use messages::MessageCatalog;

use handlers::*;

pub const CONFIG_FILE: &str = "config.toml";

pub struct HardcorePlugin {
    name: String,
    ctx: HandlerContext,
}

impl HardcorePlugin {
    pub fn new(
        system: Arc<HardcoreSystem>,
        host: Arc<dyn PlayerHost>,
        messages: MessageCatalog,
    ) -> Self {
        debug!("💀 HardcorePlugin: Creating new instance");
        Self {
            name: "HardcorePlugin".to_string(),
            ctx: HandlerContext {
                system,
                host,
                messages,
            },
        }
    }

    /// Opens configuration and player state from the plugin's data directory,
    /// creating the directory and a default configuration when missing.
    pub fn open(
        data_dir: impl AsRef<Path>,
        host: Arc<dyn PlayerHost>,
        worlds: Arc<dyn WorldOrchestrator>,
    ) -> Result<Self, PluginError> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)?;

        let config = Arc::new(TomlConfigFile::new(data_dir.join(CONFIG_FILE)));
        let document = config.load()?;
        let messages = MessageCatalog::from_table(document.get_table_in(&[MESSAGES]));
        let state = Arc::new(JsonStateFile::new(data_dir.join(document.data_file())));

        let system = HardcoreSystem::open(config, state, worlds)?;
        Ok(Self::new(Arc::new(system), host, messages))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    pub fn system(&self) -> &Arc<HardcoreSystem> {
        &self.ctx.system
    }

    /// Called once the host has loaded its worlds.
    pub fn on_init(&self) -> Result<(), PluginError> {
        let registry = self.ctx.system.registry();
        if registry.is_empty() {
            warn!("💀 HardcorePlugin: No hardcore worlds configured");
        }
        self.ctx.system.enforce_hard_difficulty();
        info!(
            "💀 HardcorePlugin: ✅ Tracking {} hardcore worlds, hub '{}'",
            registry.len(),
            registry.hub_world()
        );
        Ok(())
    }

    pub fn on_shutdown(&self) -> Result<(), PluginError> {
        self.ctx.system.store().persist()?;
        info!(
            "💀 HardcorePlugin: Shutting down. Tracked {} players",
            self.ctx.system.store().player_count()
        );
        Ok(())
    }

    /// Re-reads the world configuration. Player state stays as tracked in memory.
    pub fn reload(&self) -> Result<(), PluginError> {
        let worlds = self.ctx.system.reload()?;
        info!("💀 HardcorePlugin: Reloaded configuration ({} hardcore worlds)", worlds);
        Ok(())
    }

    /// Decodes a JSON notification and runs its handler.
    pub fn handle_event(
        &self,
        event_name: &str,
        payload: serde_json::Value,
    ) -> Result<HandlerOutcome, PluginError> {
        let ctx = &self.ctx;
        let outcome = match event_name {
            "player_death" => handle_player_death(serde_json::from_value(payload)?, ctx),
            "player_respawn" => handle_player_respawn(serde_json::from_value(payload)?, ctx),
            "player_join" => handle_player_join(serde_json::from_value(payload)?, ctx),
            "player_world_change" => handle_world_change(serde_json::from_value(payload)?, ctx),
            "player_teleport" => handle_player_teleport(serde_json::from_value(payload)?, ctx),
            other => return Err(PluginError::UnknownEvent(other.to_string())),
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockHost;
    use hardcore_system::{ConsoleOrchestrator, PlayerId};
    use serde_json::json;
    use tempfile::TempDir;

    fn open_plugin(dir: &TempDir) -> (Arc<MockHost>, HardcorePlugin) {
        let host = Arc::new(MockHost::default());
        let plugin = HardcorePlugin::open(
            dir.path(),
            host.clone(),
            Arc::new(ConsoleOrchestrator::new(|_| {})),
        )
        .unwrap();
        (host, plugin)
    }

    #[test]
    fn test_open_creates_default_configuration() {
        let dir = TempDir::new().unwrap();
        let (_, plugin) = open_plugin(&dir);

        assert!(dir.path().join(CONFIG_FILE).exists());
        assert!(plugin.system().registry().is_empty());
        assert_eq!(plugin.name(), "HardcorePlugin");
        plugin.on_init().unwrap();
    }

    #[test]
    fn test_json_events_drive_handlers_and_persist() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "hub-world = \"world\"\n[hardcore-worlds.hc-1]\ndimensions = [\"hc-1\", \"hc-1_nether\"]\n",
        )
        .unwrap();
        let (_, plugin) = open_plugin(&dir);
        let player = PlayerId::new();

        plugin
            .handle_event(
                "player_death",
                json!({ "player_id": player, "dimension": "hc-1_nether" }),
            )
            .unwrap();
        let outcome = plugin
            .handle_event(
                "player_teleport",
                json!({ "player_id": player, "from": "world", "to": "hc-1" }),
            )
            .unwrap();
        assert!(outcome.cancelled);
        plugin.on_shutdown().unwrap();

        let (_, reopened) = open_plugin(&dir);
        assert!(reopened.system().is_dead_in_world(player, "hc-1"));
    }

    #[test]
    fn test_bad_events_are_errors() {
        let dir = TempDir::new().unwrap();
        let (_, plugin) = open_plugin(&dir);

        assert!(matches!(
            plugin.handle_event("player_sneeze", json!({})),
            Err(PluginError::UnknownEvent(_))
        ));
        assert!(matches!(
            plugin.handle_event("player_death", json!({ "dimension": 3 })),
            Err(PluginError::Payload(_))
        ));
    }
}
