//! # World Group Registry
//!
//! Maps hardcore world ids to their ordered backing dimensions and per-world
//! policy, and answers the reverse question of which world owns a dimension.
//!
//! The registry is built from the `hardcore-worlds` section of the configuration
//! document. Loading fails soft: a bad definition is skipped with a warning and the
//! remaining worlds still load. `add`, `remove` and `set_policy` write the document
//! back through the [`ConfigBackend`] before the in-memory view changes, so a
//! registration that returned `Ok` is already on disk.

use crate::config::{
    ConfigBackend, ConfigDocument, ALLOW_SPECTATOR, ALLOW_TP, DIMENSIONS, HARDCORE_WORLDS,
    SETTINGS,
};
use crate::error::{HardcoreError, Result};
use crate::types::{
    DimensionName, HardcoreDimension, HardcoreWorldId, PolicyOverride, WorldGroup, WorldPolicy,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use toml::{Table, Value};
use tracing::{info, warn};

/// Parses every world definition in `document`.
///
/// Definitions are validated against each other in id order: the first world to
/// claim a dimension keeps it and later claimants are skipped.
pub fn load(document: &ConfigDocument) -> Vec<WorldGroup> {
    let Some(section) = document.get_table_in(&[HARDCORE_WORLDS]) else {
        warn!("No {} defined in configuration", HARDCORE_WORLDS);
        return Vec::new();
    };

    let hub = document.hub_world();
    let defaults = document.default_policy();
    let mut owners: HashMap<DimensionName, HardcoreWorldId> = HashMap::new();
    let mut groups = Vec::new();

    for (key, value) in section {
        let group = match parse_definition(key, value, defaults) {
            Ok(group) => group,
            Err(e) => {
                warn!("Skipping hardcore world definition '{}': {}", key, e);
                continue;
            }
        };
        if let Err(e) = check_placement(&group.id, &group.dimensions, &hub, &owners) {
            warn!("Skipping hardcore world definition '{}': {}", key, e);
            continue;
        }
        for dimension in &group.dimensions {
            owners.insert(dimension.clone(), group.id.clone());
        }
        groups.push(group);
    }

    groups
}

fn parse_definition(key: &str, value: &Value, defaults: WorldPolicy) -> Result<WorldGroup> {
    let id = HardcoreWorldId::from(key);
    if id.is_blank() {
        return Err(HardcoreError::InvalidId(key.to_string()));
    }
    let Some(section) = value.as_table() else {
        return Err(HardcoreError::InvalidId(format!("{key} is not a section")));
    };

    let dimensions = match section.get(DIMENSIONS) {
        None => vec![id.legacy_dimension()],
        Some(Value::Table(table)) if table.is_empty() => vec![id.legacy_dimension()],
        Some(Value::Table(table)) => dimensions_from_table(table),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(DimensionName::from)
            .collect(),
        Some(_) => return Err(HardcoreError::InvalidId(format!("{key}.{DIMENSIONS}"))),
    };
    let dimensions = normalize_dimensions(dimensions);
    if dimensions.is_empty() {
        return Err(HardcoreError::EmptyDimensions(id));
    }

    let settings = section
        .get(SETTINGS)
        .and_then(Value::as_table)
        .unwrap_or(section);
    let policy = PolicyOverride {
        allow_spectator_on_death: settings.get(ALLOW_SPECTATOR).and_then(Value::as_bool),
        allow_teleport_after_death: settings.get(ALLOW_TP).and_then(Value::as_bool),
    }
    .apply_to(defaults);

    Ok(WorldGroup {
        id,
        dimensions,
        policy,
    })
}

/// Known kinds first (overworld, nether, end), then any other keys.
fn dimensions_from_table(table: &Table) -> Vec<DimensionName> {
    let known = HardcoreDimension::ALL
        .into_iter()
        .filter_map(|kind| table.get(kind.config_key()));
    let others = table
        .iter()
        .filter(|(k, _)| HardcoreDimension::from_config_key(k).is_none())
        .map(|(_, v)| v);

    known
        .chain(others)
        .filter_map(Value::as_str)
        .map(DimensionName::from)
        .collect()
}

/// Drops blank names and duplicates, keeping first-seen order.
fn normalize_dimensions(dimensions: Vec<DimensionName>) -> Vec<DimensionName> {
    let mut result: Vec<DimensionName> = Vec::with_capacity(dimensions.len());
    for dimension in dimensions {
        if !dimension.is_blank() && !result.contains(&dimension) {
            result.push(dimension);
        }
    }
    result
}

fn check_placement(
    id: &HardcoreWorldId,
    dimensions: &[DimensionName],
    hub: &DimensionName,
    owners: &HashMap<DimensionName, HardcoreWorldId>,
) -> Result<()> {
    let is_hub = |name: &str| name.eq_ignore_ascii_case(hub.as_str());
    if is_hub(id.as_str()) || dimensions.iter().any(|d| is_hub(d.as_str())) {
        return Err(HardcoreError::HubCollision(id.clone()));
    }
    for dimension in dimensions {
        if let Some(owner) = owners.get(dimension).filter(|owner| *owner != id) {
            return Err(HardcoreError::DimensionConflict {
                dimension: dimension.clone(),
                owner: owner.clone(),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
struct RegistryState {
    document: ConfigDocument,
    groups: BTreeMap<HardcoreWorldId, WorldGroup>,
    owners: HashMap<DimensionName, HardcoreWorldId>,
}

impl RegistryState {
    fn build(document: ConfigDocument) -> Self {
        let mut state = Self {
            document,
            ..Self::default()
        };
        for group in load(&state.document) {
            state.insert(group);
        }
        state
    }

    fn insert(&mut self, group: WorldGroup) {
        for dimension in &group.dimensions {
            self.owners.insert(dimension.clone(), group.id.clone());
        }
        self.groups.insert(group.id.clone(), group);
    }
}

/// Registry of hardcore world groups, backed by the configuration document.
pub struct WorldGroupRegistry {
    backend: Arc<dyn ConfigBackend>,
    state: RwLock<RegistryState>,
}

impl WorldGroupRegistry {
    /// Loads the configuration through `backend` and builds the registry.
    pub fn open(backend: Arc<dyn ConfigBackend>) -> Result<Self> {
        let document = backend.load()?;
        let state = RegistryState::build(document);
        info!(
            "🌍 Loaded {} hardcore worlds: {:?}",
            state.groups.len(),
            state.groups.keys().collect::<Vec<_>>()
        );
        Ok(Self {
            backend,
            state: RwLock::new(state),
        })
    }

    /// Re-reads the configuration and rebuilds every group.
    ///
    /// On a load failure the current view is kept and the error returned.
    pub fn reload(&self) -> Result<usize> {
        let document = self.backend.load()?;
        let state = RegistryState::build(document);
        let count = state.groups.len();
        *self.write() = state;
        info!("🔄 Reloaded hardcore worlds ({} registered)", count);
        Ok(count)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// The world owning `dimension`, if any.
    pub fn resolve(&self, dimension: &str) -> Option<HardcoreWorldId> {
        self.read().owners.get(dimension).cloned()
    }

    /// Backing dimensions of `world`; empty for an unknown id.
    pub fn dimensions_of(&self, world: &str) -> Vec<DimensionName> {
        self.read()
            .groups
            .get(world)
            .map(|group| group.dimensions.clone())
            .unwrap_or_default()
    }

    pub fn group(&self, world: &str) -> Option<WorldGroup> {
        self.read().groups.get(world).cloned()
    }

    pub fn policy_of(&self, world: &str) -> Option<WorldPolicy> {
        self.read().groups.get(world).map(|group| group.policy)
    }

    pub fn contains(&self, world: &str) -> bool {
        self.read().groups.contains_key(world)
    }

    pub fn is_hardcore_dimension(&self, dimension: &str) -> bool {
        self.read().owners.contains_key(dimension)
    }

    /// All groups, ordered by id.
    pub fn groups(&self) -> Vec<WorldGroup> {
        self.read().groups.values().cloned().collect()
    }

    pub fn world_ids(&self) -> Vec<HardcoreWorldId> {
        self.read().groups.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().groups.is_empty()
    }

    pub fn hub_world(&self) -> DimensionName {
        self.read().document.hub_world()
    }

    pub fn max_open_worlds(&self) -> usize {
        self.read().document.max_open_worlds()
    }

    pub fn default_policy(&self) -> WorldPolicy {
        self.read().document.default_policy()
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Registers a new world and persists it.
    ///
    /// # Arguments
    ///
    /// * `world` - The new world id
    /// * `dimensions` - Backing dimensions; an empty list registers a legacy
    ///   single-dimension world named after `world`
    /// * `policy_override` - Settings that differ from `[defaults]`
    ///
    /// # Returns
    ///
    /// The registered group with its effective policy.
    ///
    /// # Errors
    ///
    /// `InvalidId` for blank names, `AlreadyExists`, `HubCollision`,
    /// `DimensionConflict` when another world owns a dimension, or the backend's
    /// error when saving fails. Nothing changes in memory on error.
    pub fn add(
        &self,
        world: HardcoreWorldId,
        dimensions: Vec<DimensionName>,
        policy_override: PolicyOverride,
    ) -> Result<WorldGroup> {
        if world.is_blank() {
            return Err(HardcoreError::InvalidId(world.to_string()));
        }
        if let Some(blank) = dimensions.iter().find(|d| d.is_blank()) {
            return Err(HardcoreError::InvalidId(blank.to_string()));
        }

        let mut state = self.write();
        if state.groups.contains_key(&world) {
            return Err(HardcoreError::AlreadyExists(world));
        }

        let dimensions = if dimensions.is_empty() {
            vec![world.legacy_dimension()]
        } else {
            normalize_dimensions(dimensions)
        };
        check_placement(&world, &dimensions, &state.document.hub_world(), &state.owners)?;

        let group = WorldGroup {
            policy: policy_override.apply_to(state.document.default_policy()),
            id: world,
            dimensions,
        };

        let mut document = state.document.clone();
        write_group(&mut document, &group);
        self.backend.save(&document)?;

        state.document = document;
        state.insert(group.clone());
        info!(
            "➕ Registered hardcore world '{}' with dimensions {:?}",
            group.id, group.dimensions
        );
        Ok(group)
    }

    /// Removes a world and persists the change, returning the freed dimensions.
    ///
    /// # Errors
    ///
    /// `UnknownWorld` when `world` is not registered. A failed save leaves the
    /// world registered.
    pub fn remove(&self, world: &str) -> Result<Vec<DimensionName>> {
        let mut state = self.write();
        let Some(group) = state.groups.get(world).cloned() else {
            return Err(HardcoreError::UnknownWorld(world.into()));
        };

        let mut document = state.document.clone();
        document.remove_in(&[HARDCORE_WORLDS, world]);
        self.backend.save(&document)?;

        state.document = document;
        state.groups.remove(world);
        for dimension in &group.dimensions {
            state.owners.remove(dimension);
        }
        info!(
            "➖ Removed hardcore world '{}', freed dimensions {:?}",
            group.id, group.dimensions
        );
        Ok(group.dimensions)
    }

    /// Replaces the policy of an existing world and persists it.
    pub fn set_policy(&self, world: &str, policy: WorldPolicy) -> Result<WorldGroup> {
        let mut state = self.write();
        let Some(mut group) = state.groups.get(world).cloned() else {
            return Err(HardcoreError::UnknownWorld(world.into()));
        };
        group.policy = policy;

        let mut document = state.document.clone();
        write_settings(&mut document, &group);
        self.backend.save(&document)?;

        state.document = document;
        state.groups.insert(group.id.clone(), group.clone());
        info!("⚙️ Updated policy of hardcore world '{}': {:?}", group.id, policy);
        Ok(group)
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn write_group(document: &mut ConfigDocument, group: &WorldGroup) {
    let dimensions = group
        .dimensions
        .iter()
        .map(|d| Value::String(d.to_string()))
        .collect();
    document.set_in(
        &[HARDCORE_WORLDS, group.id.as_str(), DIMENSIONS],
        Value::Array(dimensions),
    );
    write_settings(document, group);
}

fn write_settings(document: &mut ConfigDocument, group: &WorldGroup) {
    let mut settings = Table::new();
    settings.insert(
        ALLOW_SPECTATOR.to_string(),
        Value::Boolean(group.policy.allow_spectator_on_death),
    );
    settings.insert(
        ALLOW_TP.to_string(),
        Value::Boolean(group.policy.allow_teleport_after_death),
    );
    document.set_in(&[HARDCORE_WORLDS, group.id.as_str(), SETTINGS], Value::Table(settings));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfig;

    const CONFIG: &str = r#"
hub-world = "world"

[defaults]
allow-spectator-on-death = true
allow-tp-after-death = false

[hardcore-worlds.hc-1.dimensions]
nether = "hc-1_nether"
overworld = "hc-1"

[hardcore-worlds.hc-1.settings]
allow-spectator-on-death = false

[hardcore-worlds.legacy]

[hardcore-worlds.flat]
allow-tp-after-death = true
"#;

    fn registry(config: &str) -> (Arc<MemoryConfig>, WorldGroupRegistry) {
        let backend = Arc::new(MemoryConfig::from_toml(config).unwrap());
        let registry = WorldGroupRegistry::open(backend.clone()).unwrap();
        (backend, registry)
    }

    #[test]
    fn test_load_groups_and_policies() {
        let (_, registry) = registry(CONFIG);
        assert_eq!(registry.len(), 3);

        let hc1 = registry.group("hc-1").unwrap();
        assert_eq!(hc1.dimensions, vec![DimensionName::from("hc-1"), "hc-1_nether".into()]);
        assert!(!hc1.policy.allow_spectator_on_death);
        assert!(!hc1.policy.allow_teleport_after_death);

        // Legacy world: its only dimension is its own id.
        assert_eq!(registry.dimensions_of("legacy"), vec![DimensionName::from("legacy")]);
        assert_eq!(registry.policy_of("legacy"), Some(WorldPolicy::default()));

        // Settings may sit directly on the world section.
        assert!(registry.policy_of("flat").unwrap().allow_teleport_after_death);
    }

    #[test]
    fn test_resolve_and_unknown_lookups() {
        let (_, registry) = registry(CONFIG);
        assert_eq!(registry.resolve("hc-1_nether"), Some("hc-1".into()));
        assert_eq!(registry.resolve("world"), None);
        assert!(registry.dimensions_of("nope").is_empty());
        assert!(registry.policy_of("nope").is_none());
    }

    #[test]
    fn test_malformed_definitions_are_skipped() {
        let (_, registry) = registry(
            r#"
hub-world = "world"

[hardcore-worlds]
scalar = 5
" " = {}

[hardcore-worlds.bad-dims]
dimensions = 42

[hardcore-worlds.blank-dims.dimensions]
overworld = ""

[hardcore-worlds.world]

[hardcore-worlds.uses-hub]
dimensions = ["World"]

[hardcore-worlds.a]
dimensions = ["shared", "a_nether"]

[hardcore-worlds.b]
dimensions = ["shared"]

[hardcore-worlds.good]
"#,
        );

        assert_eq!(registry.world_ids(), vec![HardcoreWorldId::from("a"), "good".into()]);
        assert_eq!(registry.resolve("shared"), Some("a".into()));
    }

    #[test]
    fn test_missing_section_loads_empty() {
        let (_, registry) = registry("hub-world = \"lobby\"");
        assert!(registry.is_empty());
        assert_eq!(registry.hub_world().as_str(), "lobby");
    }

    #[test]
    fn test_add_persists_before_returning() {
        let (backend, registry) = registry(CONFIG);
        let group = registry
            .add(
                "hc-2".into(),
                vec!["hc-2".into(), "hc-2_nether".into(), "hc-2".into()],
                PolicyOverride {
                    allow_spectator_on_death: None,
                    allow_teleport_after_death: Some(true),
                },
            )
            .unwrap();

        assert_eq!(group.dimensions.len(), 2);
        assert!(group.policy.allow_spectator_on_death);
        assert!(group.policy.allow_teleport_after_death);
        assert_eq!(registry.resolve("hc-2_nether"), Some("hc-2".into()));

        let saved = backend.snapshot();
        assert!(saved.get_bool("hardcore-worlds.hc-2.settings.allow-tp-after-death", false));
        let reloaded = load(&saved);
        assert!(reloaded.iter().any(|g| g == &group));
    }

    #[test]
    fn test_add_conflicts() {
        let (_, registry) = registry(CONFIG);

        assert!(matches!(
            registry.add("hc-1".into(), vec![], PolicyOverride::default()),
            Err(HardcoreError::AlreadyExists(_))
        ));
        assert!(matches!(
            registry.add("world".into(), vec![], PolicyOverride::default()),
            Err(HardcoreError::HubCollision(_))
        ));
        assert!(matches!(
            registry.add("hc-3".into(), vec!["hc-1_nether".into()], PolicyOverride::default()),
            Err(HardcoreError::DimensionConflict { .. })
        ));
        assert!(matches!(
            registry.add("".into(), vec![], PolicyOverride::default()),
            Err(HardcoreError::InvalidId(_))
        ));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_add_legacy_world() {
        let (_, registry) = registry(CONFIG);
        let group = registry.add("solo".into(), vec![], PolicyOverride::default()).unwrap();
        assert_eq!(group.dimensions, vec![DimensionName::from("solo")]);
    }

    #[test]
    fn test_remove_frees_dimensions() {
        let (backend, registry) = registry(CONFIG);
        let freed = registry.remove("hc-1").unwrap();

        assert_eq!(freed, vec![DimensionName::from("hc-1"), "hc-1_nether".into()]);
        assert_eq!(registry.resolve("hc-1_nether"), None);
        assert!(backend.snapshot().get("hardcore-worlds.hc-1").is_none());
        assert!(matches!(registry.remove("hc-1"), Err(HardcoreError::UnknownWorld(_))));
    }

    #[test]
    fn test_set_policy_and_reload() {
        let (_, registry) = registry(CONFIG);
        let policy = WorldPolicy {
            allow_spectator_on_death: true,
            allow_teleport_after_death: true,
        };
        registry.set_policy("legacy", policy).unwrap();

        assert_eq!(registry.reload().unwrap(), 3);
        assert_eq!(registry.policy_of("legacy"), Some(policy));
        assert_eq!(registry.dimensions_of("legacy"), vec![DimensionName::from("legacy")]);
    }
}
