//! # Transition State Machine
//!
//! Decides what happens to a player on death, respawn, join, world change and
//! teleport, and records the deaths and visits that go with each notification.
//!
//! Per (player, hardcore world) the state is implicit in the store:
//!
//! ```text
//! never-visited ──join/move──▶ visited-alive ──death──▶ visited-dead
//! ```
//!
//! Every decision first resolves the dimension to its hardcore world, so a death in
//! `hc-1_nether` and a respawn reported in `hc-1` are judged against the same world.
//! Dimensions that belong to no hardcore world are always allowed. When the hub
//! cannot be resolved, no decision relocates the player.

use crate::orchestration::WorldOrchestrator;
use crate::registry::WorldGroupRegistry;
use crate::store::PlayerWorldStateStore;
use crate::types::{DimensionName, HardcoreWorldId, PlayerId, WorldGroup};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// What the host adapter should do in response to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// Death recorded; the outcome is decided when the player respawns.
    HandleOnRespawn { world: HardcoreWorldId },
    /// Keep the player inside the world in spectator mode. `spawn_dimension` is the
    /// world's default spawn, used when the host has no respawn point inside it.
    StayAsSpectator {
        world: HardcoreWorldId,
        spawn_dimension: DimensionName,
    },
    /// Send the player to the hub in survival mode.
    RedirectToHubSurvival { hub: DimensionName },
    /// Cancel the move and send the player to the hub.
    BlockAndRedirectToHub { hub: DimensionName },
    /// Cancel the move and leave the player where they are.
    Block,
    Allow,
}

impl Decision {
    /// Whether the triggering move must be cancelled.
    pub fn cancels_move(&self) -> bool {
        matches!(self, Self::BlockAndRedirectToHub { .. } | Self::Block)
    }
}

pub struct TransitionStateMachine {
    registry: Arc<WorldGroupRegistry>,
    store: Arc<PlayerWorldStateStore>,
    worlds: Arc<dyn WorldOrchestrator>,
}

impl TransitionStateMachine {
    pub fn new(
        registry: Arc<WorldGroupRegistry>,
        store: Arc<PlayerWorldStateStore>,
        worlds: Arc<dyn WorldOrchestrator>,
    ) -> Self {
        Self {
            registry,
            store,
            worlds,
        }
    }

    /// Records the death (visit first, then death) for hardcore dimensions.
    pub fn on_death(&self, player: PlayerId, dimension: &DimensionName) -> Decision {
        let Some(world) = self.registry.resolve(dimension.as_str()) else {
            return Decision::Allow;
        };

        self.store.mark_visited(player, dimension);
        self.store.mark_dead(player, dimension);
        debug!("Player {} died in '{}' (world '{}')", player, dimension, world);

        Decision::HandleOnRespawn { world }
    }

    pub fn on_respawn(&self, player: PlayerId, death_dimension: &DimensionName) -> Decision {
        let Some(group) = self.group_for(death_dimension) else {
            return Decision::Allow;
        };
        if !self.is_dead_in(player, &group) {
            return Decision::Allow;
        }

        let decision = self.dead_player_decision(&group);
        debug!("Respawn of {} after death in '{}': {:?}", player, group.id, decision);
        decision
    }

    /// Join, or arrival in a new dimension. Records the visit.
    pub fn on_join_or_world_change(&self, player: PlayerId, dimension: &DimensionName) -> Decision {
        let Some(group) = self.group_for(dimension) else {
            return Decision::Allow;
        };

        self.store.mark_visited(player, dimension);
        if !self.is_dead_in(player, &group) {
            return Decision::Allow;
        }

        let decision = self.dead_player_decision(&group);
        debug!("Dead player {} entered '{}': {:?}", player, group.id, decision);
        decision
    }

    /// A teleport or move that has not happened yet.
    ///
    /// A dead player moving into a world that forbids it is sent to the hub, even
    /// when the move starts in the hub. Without a hub the move is allowed and the
    /// player is treated as a spectating entry on arrival.
    pub fn on_teleport_attempt(
        &self,
        player: PlayerId,
        from: &DimensionName,
        to: &DimensionName,
    ) -> Decision {
        let Some(group) = self.group_for(to) else {
            return Decision::Allow;
        };
        if self.registry.resolve(from.as_str()).as_ref() == Some(&group.id) {
            return Decision::Allow;
        }
        if !self.is_dead_in(player, &group) || group.policy.allow_teleport_after_death {
            return Decision::Allow;
        }

        let decision = match self.resolve_hub() {
            Some(hub) => Decision::BlockAndRedirectToHub { hub },
            None => {
                warn!(
                    "Hub world '{}' is missing, letting dead player {} enter '{}' as a spectator",
                    self.registry.hub_world(),
                    player,
                    group.id
                );
                Decision::Allow
            }
        };
        debug!(
            "Dead player {} tried to enter '{}' from '{}': {:?}",
            player, group.id, from, decision
        );
        decision
    }

    fn group_for(&self, dimension: &DimensionName) -> Option<WorldGroup> {
        let world = self.registry.resolve(dimension.as_str())?;
        // The world may have been removed between the two lookups.
        self.registry.group(world.as_str())
    }

    fn is_dead_in(&self, player: PlayerId, group: &WorldGroup) -> bool {
        self.store.is_dead_in_any(player, &group.dimensions)
    }

    fn dead_player_decision(&self, group: &WorldGroup) -> Decision {
        let spectate = Decision::StayAsSpectator {
            world: group.id.clone(),
            spawn_dimension: group.primary_dimension().clone(),
        };
        if group.policy.allow_spectator_on_death {
            return spectate;
        }
        match self.resolve_hub() {
            Some(hub) => Decision::RedirectToHubSurvival { hub },
            None => {
                warn!(
                    "Hub world '{}' not found; keeping player in '{}' as spectator",
                    self.registry.hub_world(),
                    group.id
                );
                spectate
            }
        }
    }

    fn resolve_hub(&self) -> Option<DimensionName> {
        let hub = self.registry.hub_world();
        self.worlds.dimension_exists(hub.as_str()).then_some(hub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfig;
    use crate::orchestration::WorldCommand;
    use crate::store::MemoryState;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Worlds {
        hub_present: AtomicBool,
    }

    impl WorldOrchestrator for Worlds {
        fn dimension_exists(&self, _dimension: &str) -> bool {
            self.hub_present.load(Ordering::Acquire)
        }

        fn online_players(&self, _dimension: &str) -> usize {
            0
        }

        fn dispatch(&self, _command: WorldCommand) {}
    }

    const CONFIG: &str = r#"
hub-world = "world"

[hardcore-worlds.spectate]
dimensions = ["spectate", "spectate_nether"]
settings = { allow-spectator-on-death = true, allow-tp-after-death = false }

[hardcore-worlds.hc-1]
dimensions = ["hc-1", "hc-1_nether"]
settings = { allow-spectator-on-death = false, allow-tp-after-death = false }

[hardcore-worlds.open]
settings = { allow-spectator-on-death = false, allow-tp-after-death = true }
"#;

    struct Fixture {
        machine: TransitionStateMachine,
        store: Arc<PlayerWorldStateStore>,
        worlds: Arc<Worlds>,
    }

    fn fixture() -> Fixture {
        let registry =
            Arc::new(WorldGroupRegistry::open(Arc::new(MemoryConfig::from_toml(CONFIG).unwrap())).unwrap());
        let store = Arc::new(PlayerWorldStateStore::open(Arc::new(MemoryState::new())).unwrap());
        let worlds = Arc::new(Worlds {
            hub_present: AtomicBool::new(true),
        });
        let machine = TransitionStateMachine::new(registry, Arc::clone(&store), worlds.clone());
        Fixture {
            machine,
            store,
            worlds,
        }
    }

    fn dim(name: &str) -> DimensionName {
        DimensionName::from(name)
    }

    #[test]
    fn test_death_marks_visit_and_death() {
        let f = fixture();
        let player = PlayerId::new();

        let decision = f.machine.on_death(player, &dim("hc-1_nether"));

        assert_eq!(decision, Decision::HandleOnRespawn { world: "hc-1".into() });
        assert!(f.store.has_visited(player, "hc-1_nether"));
        assert!(f.store.is_dead(player, "hc-1_nether"));
    }

    #[test]
    fn test_death_outside_hardcore_world_is_ignored() {
        let f = fixture();
        let player = PlayerId::new();
        assert_eq!(f.machine.on_death(player, &dim("world")), Decision::Allow);
        assert!(f.store.state_of(player).is_none());
    }

    #[test]
    fn test_respawn_with_spectator_policy() {
        let f = fixture();
        let player = PlayerId::new();
        f.machine.on_death(player, &dim("spectate_nether"));

        assert_eq!(
            f.machine.on_respawn(player, &dim("spectate_nether")),
            Decision::StayAsSpectator {
                world: "spectate".into(),
                spawn_dimension: dim("spectate"),
            }
        );
    }

    #[test]
    fn test_respawn_without_spectator_policy_redirects() {
        let f = fixture();
        let player = PlayerId::new();
        f.machine.on_death(player, &dim("hc-1"));

        assert_eq!(
            f.machine.on_respawn(player, &dim("hc-1")),
            Decision::RedirectToHubSurvival { hub: dim("world") }
        );
    }

    #[test]
    fn test_respawn_resolves_whole_world() {
        let f = fixture();
        let player = PlayerId::new();
        f.machine.on_death(player, &dim("hc-1_nether"));

        // Host reports the overworld of the same hardcore world.
        assert_eq!(
            f.machine.on_respawn(player, &dim("hc-1")),
            Decision::RedirectToHubSurvival { hub: dim("world") }
        );
    }

    #[test]
    fn test_respawn_of_living_player_is_allowed() {
        let f = fixture();
        assert_eq!(f.machine.on_respawn(PlayerId::new(), &dim("hc-1")), Decision::Allow);
    }

    #[test]
    fn test_missing_hub_degrades_to_spectator() {
        let f = fixture();
        let player = PlayerId::new();
        f.machine.on_death(player, &dim("hc-1"));
        f.worlds.hub_present.store(false, Ordering::Release);

        assert_eq!(
            f.machine.on_respawn(player, &dim("hc-1")),
            Decision::StayAsSpectator {
                world: "hc-1".into(),
                spawn_dimension: dim("hc-1"),
            }
        );
    }

    #[test]
    fn test_join_marks_visit_and_allows_living_player() {
        let f = fixture();
        let player = PlayerId::new();

        assert_eq!(f.machine.on_join_or_world_change(player, &dim("hc-1_nether")), Decision::Allow);
        assert!(f.store.has_visited(player, "hc-1_nether"));
    }

    #[test]
    fn test_join_of_dead_player_follows_policy() {
        let f = fixture();
        let player = PlayerId::new();
        f.machine.on_death(player, &dim("hc-1_nether"));
        f.machine.on_death(player, &dim("spectate"));

        assert_eq!(
            f.machine.on_join_or_world_change(player, &dim("hc-1")),
            Decision::RedirectToHubSurvival { hub: dim("world") }
        );
        assert!(matches!(
            f.machine.on_join_or_world_change(player, &dim("spectate_nether")),
            Decision::StayAsSpectator { .. }
        ));
        assert_eq!(f.machine.on_join_or_world_change(player, &dim("world")), Decision::Allow);
    }

    #[test]
    fn test_teleport_from_hub_into_dead_world_redirects() {
        let f = fixture();
        let player = PlayerId::new();
        f.machine.on_death(player, &dim("hc-1"));

        let decision = f.machine.on_teleport_attempt(player, &dim("world"), &dim("hc-1"));
        assert_eq!(decision, Decision::BlockAndRedirectToHub { hub: dim("world") });
        assert!(decision.cancels_move());
    }

    #[test]
    fn test_teleport_from_elsewhere_redirects_to_hub() {
        let f = fixture();
        let player = PlayerId::new();
        f.machine.on_death(player, &dim("hc-1"));

        assert_eq!(
            f.machine.on_teleport_attempt(player, &dim("spectate"), &dim("hc-1_nether")),
            Decision::BlockAndRedirectToHub { hub: dim("world") }
        );

    }

    #[test]
    fn test_teleport_without_hub_lets_dead_player_in() {
        let f = fixture();
        let player = PlayerId::new();
        f.machine.on_death(player, &dim("hc-1"));
        f.worlds.hub_present.store(false, Ordering::Release);

        let decision = f.machine.on_teleport_attempt(player, &dim("spectate"), &dim("hc-1_nether"));
        assert_eq!(decision, Decision::Allow);
        assert!(!decision.cancels_move());
        assert!(f.store.is_dead(player, "hc-1"));
    }

    #[test]
    fn test_teleport_within_same_world_is_allowed() {
        let f = fixture();
        let player = PlayerId::new();
        f.machine.on_death(player, &dim("hc-1"));
        assert_eq!(
            f.machine.on_teleport_attempt(player, &dim("hc-1"), &dim("hc-1_nether")),
            Decision::Allow
        );
    }

    #[test]
    fn test_teleport_allowed_by_policy_or_when_alive() {
        let f = fixture();
        let player = PlayerId::new();
        f.machine.on_death(player, &dim("open"));

        assert_eq!(f.machine.on_teleport_attempt(player, &dim("world"), &dim("open")), Decision::Allow);
        assert_eq!(f.machine.on_teleport_attempt(player, &dim("world"), &dim("hc-1")), Decision::Allow);
        assert!(!f.machine.on_teleport_attempt(player, &dim("world"), &dim("nowhere")).cancels_move());
    }

    #[test]
    fn test_decision_serializes_with_tag() {
        let json = serde_json::to_value(Decision::RedirectToHubSurvival { hub: dim("world") }).unwrap();
        assert_eq!(json["decision"], "redirect_to_hub_survival");
        assert_eq!(json["hub"], "world");
    }
}
