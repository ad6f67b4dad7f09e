//! Culling: which hardcore worlds can be reclaimed.
//!
//! A world is cullable when it has at least one visitor and every visitor is dead
//! in the world, using the same any-dimension rule as respawn handling
//! ([`PlayerWorldStateStore::is_dead_in_world`]). A world nobody visited is never
//! cullable. The hub is excluded by id regardless of its computed status.

use crate::registry::WorldGroupRegistry;
use crate::store::PlayerWorldStateStore;
use crate::types::HardcoreWorldId;
use std::collections::HashSet;
use tracing::debug;

/// Collects the cullable worlds.
///
/// # Arguments
///
/// * `registry` - The registered worlds and their dimensions
/// * `store` - Player visit and death records
/// * `hub_world` - Never reported, even when fully dead
pub fn find_cullable(
    registry: &WorldGroupRegistry,
    store: &PlayerWorldStateStore,
    hub_world: &str,
) -> HashSet<HardcoreWorldId> {
    let mut result = HashSet::new();

    for group in registry.groups() {
        if group.id.as_str().eq_ignore_ascii_case(hub_world) {
            continue;
        }

        let visitors = store.visitors_of(&group.dimensions);
        if visitors.is_empty() {
            continue;
        }

        let all_dead = visitors
            .iter()
            .all(|player| store.is_dead_in_world(*player, group.id.as_str(), registry));
        debug!(
            "Cull check '{}': {} visitors, all dead = {}",
            group.id,
            visitors.len(),
            all_dead
        );

        if all_dead {
            result.insert(group.id);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfig;
    use crate::store::MemoryState;
    use crate::types::{DimensionName, PlayerId};
    use std::sync::Arc;

    fn setup() -> (WorldGroupRegistry, PlayerWorldStateStore) {
        let config = MemoryConfig::from_toml(
            r#"
hub-world = "world"

[hardcore-worlds.hc-1]
dimensions = ["hc-1", "hc-1_nether"]

[hardcore-worlds.hc-2]

[hardcore-worlds.unvisited]
"#,
        )
        .unwrap();
        let registry = WorldGroupRegistry::open(Arc::new(config)).unwrap();
        let store = PlayerWorldStateStore::open(Arc::new(MemoryState::new())).unwrap();
        (registry, store)
    }

    fn die(store: &PlayerWorldStateStore, player: PlayerId, dimension: &str) {
        let dimension = DimensionName::from(dimension);
        store.mark_visited(player, &dimension);
        store.mark_dead(player, &dimension);
    }

    #[test]
    fn test_unvisited_world_never_cullable() {
        let (registry, store) = setup();
        // A death record without a visit does not make anyone a visitor.
        store.mark_dead(PlayerId::new(), &"unvisited".into());
        assert!(find_cullable(&registry, &store, "world").is_empty());
    }

    #[test]
    fn test_death_in_any_dimension_culls_world() {
        let (registry, store) = setup();
        let a = PlayerId::new();
        store.mark_visited(a, &"hc-1".into());
        die(&store, a, "hc-1_nether");

        let cullable = find_cullable(&registry, &store, "world");
        assert_eq!(cullable, HashSet::from([HardcoreWorldId::from("hc-1")]));
    }

    #[test]
    fn test_one_living_visitor_blocks_culling() {
        let (registry, store) = setup();
        let a = PlayerId::new();
        let b = PlayerId::new();
        die(&store, a, "hc-2");
        store.mark_visited(b, &"hc-2".into());

        assert!(find_cullable(&registry, &store, "world").is_empty());

        die(&store, b, "hc-2");
        assert!(find_cullable(&registry, &store, "world").contains("hc-2"));
    }

    #[test]
    fn test_hub_is_excluded_by_id() {
        let (registry, store) = setup();
        die(&store, PlayerId::new(), "hc-2");
        assert!(find_cullable(&registry, &store, "HC-2").is_empty());
    }
}
