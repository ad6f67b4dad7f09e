//! # Hardcore System
//!
//! The host-facing surface of the crate. [`HardcoreSystem`] owns the registry, the
//! player state store and the transition state machine, and exposes the player
//! notifications plus the administrative operations (add, remove, reload, cull,
//! create, status).

use crate::config::ConfigBackend;
use crate::culling::find_cullable;
use crate::error::{HardcoreError, Result};
use crate::orchestration::{WorldCommand, WorldOrchestrator};
use crate::registry::WorldGroupRegistry;
use crate::store::{PlayerWorldStateStore, StateBackend};
use crate::transitions::{Decision, TransitionStateMachine};
use crate::types::{
    DimensionName, HardcoreDimension, HardcoreWorldId, PlayerId, PolicyOverride, WorldGroup,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of a cull run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CullReport {
    /// Every world found fully dead, in id order.
    pub cullable: Vec<HardcoreWorldId>,
    /// Worlds whose deletion was dispatched and whose registration was removed.
    pub deleted: Vec<HardcoreWorldId>,
    /// Worlds left alone because players were online in them, with the count.
    pub skipped_online: Vec<(HardcoreWorldId, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionStatus {
    pub name: DimensionName,
    pub exists: bool,
    pub online_players: usize,
}

/// Administrative view of one world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldStatus {
    pub id: HardcoreWorldId,
    /// `None` when the id is not a registered hardcore world.
    pub group: Option<WorldGroup>,
    pub dimensions: Vec<DimensionStatus>,
    pub visitors: usize,
    pub dead_visitors: usize,
}

pub struct HardcoreSystem {
    registry: Arc<WorldGroupRegistry>,
    store: Arc<PlayerWorldStateStore>,
    worlds: Arc<dyn WorldOrchestrator>,
    transitions: TransitionStateMachine,
}

impl HardcoreSystem {
    pub fn new(
        registry: Arc<WorldGroupRegistry>,
        store: Arc<PlayerWorldStateStore>,
        worlds: Arc<dyn WorldOrchestrator>,
    ) -> Self {
        let transitions =
            TransitionStateMachine::new(Arc::clone(&registry), Arc::clone(&store), Arc::clone(&worlds));
        Self {
            registry,
            store,
            worlds,
            transitions,
        }
    }

    /// Loads configuration and player state from their backends.
    pub fn open(
        config: Arc<dyn ConfigBackend>,
        state: Arc<dyn StateBackend>,
        worlds: Arc<dyn WorldOrchestrator>,
    ) -> Result<Self> {
        let registry = Arc::new(WorldGroupRegistry::open(config)?);
        let store = Arc::new(PlayerWorldStateStore::open(state)?);
        Ok(Self::new(registry, store, worlds))
    }

    pub fn registry(&self) -> &Arc<WorldGroupRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<PlayerWorldStateStore> {
        &self.store
    }

    // ------------------------------------------------------------------------
    // Player notifications
    // ------------------------------------------------------------------------

    pub fn on_death(&self, player: PlayerId, dimension: &DimensionName) -> Decision {
        self.transitions.on_death(player, dimension)
    }

    pub fn on_respawn(&self, player: PlayerId, death_dimension: &DimensionName) -> Decision {
        self.transitions.on_respawn(player, death_dimension)
    }

    pub fn on_join_or_world_change(&self, player: PlayerId, dimension: &DimensionName) -> Decision {
        self.transitions.on_join_or_world_change(player, dimension)
    }

    pub fn on_teleport_attempt(
        &self,
        player: PlayerId,
        from: &DimensionName,
        to: &DimensionName,
    ) -> Decision {
        self.transitions.on_teleport_attempt(player, from, to)
    }

    pub fn is_dead_in_world(&self, player: PlayerId, world: &str) -> bool {
        self.store.is_dead_in_world(player, world, &self.registry)
    }

    // ------------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------------

    pub fn find_cullable_worlds(&self, hub_world: &str) -> HashSet<HardcoreWorldId> {
        find_cullable(&self.registry, &self.store, hub_world)
    }

    pub fn add_world(
        &self,
        world: HardcoreWorldId,
        dimensions: Vec<DimensionName>,
        policy_override: PolicyOverride,
    ) -> Result<WorldGroup> {
        self.registry.add(world, dimensions, policy_override)
    }

    /// Unregisters a world and prunes its dimensions from every player record.
    ///
    /// # Returns
    ///
    /// The dimensions that backed the world.
    ///
    /// # Errors
    ///
    /// `UnknownWorld`, or the configuration backend's error. Player state is only
    /// pruned once the world is unregistered.
    pub fn remove_world(&self, world: &str) -> Result<Vec<DimensionName>> {
        let freed = self.registry.remove(world)?;
        for dimension in &freed {
            self.store.remove_dimension(dimension.as_str());
        }
        Ok(freed)
    }

    /// Re-reads the world configuration, then re-applies hard difficulty.
    ///
    /// Player state is not re-read: the in-memory records are authoritative while
    /// the system runs, and may hold deaths that have not reached the backend yet.
    ///
    /// # Errors
    ///
    /// Returns the configuration backend's error; the current worlds stay loaded.
    pub fn reload(&self) -> Result<usize> {
        let count = self.registry.reload()?;
        self.enforce_hard_difficulty();
        Ok(count)
    }

    /// Registers a world built from `kinds` (overworld when empty), then asks the
    /// orchestrator to create each dimension and set it to hard difficulty.
    ///
    /// # Arguments
    ///
    /// * `world` - Id of the new world, also the overworld's dimension name
    /// * `kinds` - Dimensions to create; order and duplicates are ignored
    /// * `policy_override` - Settings that differ from `[defaults]`
    ///
    /// # Errors
    ///
    /// `WorldLimitReached` when `max-open-hardcore-worlds` worlds are registered,
    /// plus every error of [`WorldGroupRegistry::add`]. No world command is
    /// dispatched on error.
    pub fn create_world(
        &self,
        world: HardcoreWorldId,
        kinds: &[HardcoreDimension],
        policy_override: PolicyOverride,
    ) -> Result<WorldGroup> {
        let limit = self.registry.max_open_worlds();
        if self.registry.len() >= limit {
            return Err(HardcoreError::WorldLimitReached { limit });
        }

        let kinds: Vec<HardcoreDimension> = if kinds.is_empty() {
            vec![HardcoreDimension::Overworld]
        } else {
            HardcoreDimension::ALL
                .into_iter()
                .filter(|kind| kinds.contains(kind))
                .collect()
        };
        let dimensions = kinds.iter().map(|kind| kind.dimension_name_for(&world)).collect();
        let group = self.registry.add(world, dimensions, policy_override)?;

        for (kind, dimension) in kinds.iter().zip(&group.dimensions) {
            self.worlds.dispatch(WorldCommand::Create {
                dimension: dimension.clone(),
                kind: *kind,
            });
        }
        self.enforce_hard_difficulty_for(&group);

        info!("🌱 Created hardcore world '{}'", group.id);
        Ok(group)
    }

    pub fn enforce_hard_difficulty(&self) {
        for group in self.registry.groups() {
            self.enforce_hard_difficulty_for(&group);
        }
    }

    fn enforce_hard_difficulty_for(&self, group: &WorldGroup) {
        for dimension in &group.dimensions {
            self.worlds.dispatch(WorldCommand::SetHardDifficulty {
                dimension: dimension.clone(),
            });
        }
    }

    /// Finds fully dead worlds and, with `delete`, reclaims the ones nobody is in.
    ///
    /// Worlds with connected players are skipped and reported; players are never
    /// disconnected to make a world cullable. A world is unregistered before its
    /// dimensions are deleted, so a failed configuration write deletes nothing.
    ///
    /// # Arguments
    ///
    /// * `delete` - When false only reports what could be culled
    ///
    /// # Returns
    ///
    /// A [`CullReport`] listing cullable, deleted and skipped worlds.
    pub fn cull(&self, delete: bool) -> CullReport {
        let hub = self.registry.hub_world();
        let mut cullable: Vec<HardcoreWorldId> =
            self.find_cullable_worlds(hub.as_str()).into_iter().collect();
        cullable.sort();

        let mut report = CullReport {
            cullable: cullable.clone(),
            ..CullReport::default()
        };
        if !delete {
            return report;
        }

        for world in cullable {
            let dimensions = self.registry.dimensions_of(world.as_str());
            let online: usize = dimensions
                .iter()
                .map(|dimension| self.worlds.online_players(dimension.as_str()))
                .sum();
            if online > 0 {
                warn!("Skipping cull of '{}': {} players online", world, online);
                report.skipped_online.push((world, online));
                continue;
            }

            let freed = match self.remove_world(world.as_str()) {
                Ok(freed) => freed,
                Err(e) => {
                    warn!("Could not unregister '{}', leaving it in place: {}", world, e);
                    continue;
                }
            };
            for dimension in freed {
                self.worlds.dispatch(WorldCommand::Delete { dimension });
            }
            info!("🗑️ Culled hardcore world '{}'", world);
            report.deleted.push(world);
        }

        report
    }

    pub fn world_status(&self, world: &str) -> WorldStatus {
        let group = self.registry.group(world);
        let names = match &group {
            Some(group) => group.dimensions.clone(),
            None => vec![DimensionName::from(world)],
        };
        let dimensions = names
            .iter()
            .map(|name| DimensionStatus {
                name: name.clone(),
                exists: self.worlds.dimension_exists(name.as_str()),
                online_players: self.worlds.online_players(name.as_str()),
            })
            .collect();

        let (visitors, dead_visitors) = if group.is_some() {
            let visitors = self.store.visitors_of(&names);
            let dead = visitors
                .iter()
                .filter(|player| self.store.is_dead_in_any(**player, &names))
                .count();
            (visitors.len(), dead)
        } else {
            (0, 0)
        };

        WorldStatus {
            id: world.into(),
            group,
            dimensions,
            visitors,
            dead_visitors,
        }
    }
}
