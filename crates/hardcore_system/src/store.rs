//! # Player World State Store
//!
//! Durable per-player record of the dimensions each player has died in and the
//! dimensions they have visited.
//!
//! ## Concurrency
//!
//! Records live in a `DashMap` keyed by [`PlayerId`]; get-or-create happens under the
//! shard lock so two notifications for the same new player never create two records.
//! Persistence is serialized by a separate mutex and always writes a fresh snapshot,
//! so later writes win and no write ever contains half a record.
//!
//! ## Persistence
//!
//! Every mutation that changes a record writes the whole state through the
//! [`StateBackend`]. A failed write is logged, the store is flagged dirty, and the
//! next mutating call retries. In-memory state stays authoritative for the session.

use crate::config::write_atomically;
use crate::error::Result;
use crate::registry::WorldGroupRegistry;
use crate::types::{DimensionName, PlayerId};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Death and visit record of one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerWorldState {
    pub player_id: PlayerId,
    pub dead_in: BTreeSet<DimensionName>,
    pub visited_in: BTreeSet<DimensionName>,
}

impl PlayerWorldState {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            dead_in: BTreeSet::new(),
            visited_in: BTreeSet::new(),
        }
    }

    pub fn is_dead_in(&self, dimension: &str) -> bool {
        self.dead_in.contains(dimension)
    }

    pub fn has_visited(&self, dimension: &str) -> bool {
        self.visited_in.contains(dimension)
    }

    /// Returns true if either set changed.
    fn remove_dimension(&mut self, dimension: &str) -> bool {
        let dead = self.dead_in.remove(dimension);
        let visited = self.visited_in.remove(dimension);
        dead || visited
    }
}

// ============================================================================
// Persisted layout
// ============================================================================

/// On-disk layout: player id string → `{ dead, visited }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub players: BTreeMap<String, PersistedPlayer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedPlayer {
    #[serde(default)]
    pub dead: Vec<DimensionName>,
    #[serde(default)]
    pub visited: Vec<DimensionName>,
}

/// Durable storage for [`StateSnapshot`]s.
pub trait StateBackend: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<StateSnapshot>>;
    fn save(&self, snapshot: &StateSnapshot) -> Result<()>;
}

/// Snapshot stored as a JSON file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct JsonStateFile {
    path: PathBuf,
}

impl JsonStateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateBackend for JsonStateFile {
    fn load(&self) -> Result<Option<StateSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, snapshot: &StateSnapshot) -> Result<()> {
        write_atomically(&self.path, &serde_json::to_vec_pretty(snapshot)?)
    }
}

/// Snapshot kept in memory; can be switched into a failing mode.
#[derive(Debug, Default)]
pub struct MemoryState {
    snapshot: Mutex<Option<StateSnapshot>>,
    failing: AtomicBool,
}

impl MemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<StateSnapshot> {
        self.snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// While failing, every save returns an I/O error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }
}

impl StateBackend for MemoryState {
    fn load(&self) -> Result<Option<StateSnapshot>> {
        Ok(self.snapshot())
    }

    fn save(&self, snapshot: &StateSnapshot) -> Result<()> {
        if self.failing.load(Ordering::Acquire) {
            return Err(std::io::Error::other("state backend unavailable").into());
        }
        *self
            .snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(snapshot.clone());
        Ok(())
    }
}

// ============================================================================
// Store
// ============================================================================

pub struct PlayerWorldStateStore {
    players: DashMap<PlayerId, PlayerWorldState>,
    backend: Arc<dyn StateBackend>,
    persist_lock: Mutex<()>,
    dirty: AtomicBool,
}

impl PlayerWorldStateStore {
    /// Creates a store and loads whatever `backend` already holds.
    pub fn open(backend: Arc<dyn StateBackend>) -> Result<Self> {
        let store = Self {
            players: DashMap::new(),
            backend,
            persist_lock: Mutex::new(()),
            dirty: AtomicBool::new(false),
        };
        store.reload()?;
        Ok(store)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// False when the player has no record.
    pub fn is_dead(&self, player: PlayerId, dimension: &str) -> bool {
        self.players
            .get(&player)
            .is_some_and(|state| state.is_dead_in(dimension))
    }

    pub fn has_visited(&self, player: PlayerId, dimension: &str) -> bool {
        self.players
            .get(&player)
            .is_some_and(|state| state.has_visited(dimension))
    }

    /// Dead in any of `dimensions`.
    pub fn is_dead_in_any(&self, player: PlayerId, dimensions: &[DimensionName]) -> bool {
        self.players.get(&player).is_some_and(|state| {
            dimensions
                .iter()
                .any(|dimension| state.is_dead_in(dimension.as_str()))
        })
    }

    /// Dead in any dimension of `world`. Dying in one dimension of a hardcore world
    /// counts for the whole world; unknown worlds have no dimensions and yield false.
    pub fn is_dead_in_world(
        &self,
        player: PlayerId,
        world: &str,
        registry: &WorldGroupRegistry,
    ) -> bool {
        self.is_dead_in_any(player, &registry.dimensions_of(world))
    }

    /// Players that visited at least one of `dimensions`, in id order.
    pub fn visitors_of(&self, dimensions: &[DimensionName]) -> Vec<PlayerId> {
        let mut visitors: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|entry| {
                dimensions
                    .iter()
                    .any(|dimension| entry.has_visited(dimension.as_str()))
            })
            .map(|entry| *entry.key())
            .collect();
        visitors.sort();
        visitors
    }

    pub fn state_of(&self, player: PlayerId) -> Option<PlayerWorldState> {
        self.players.get(&player).map(|state| state.clone())
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Records a death. Idempotent; creates the record if absent.
    ///
    /// The store does not imply a visit: callers record the visit first.
    pub fn mark_dead(&self, player: PlayerId, dimension: &DimensionName) {
        let changed = self
            .players
            .entry(player)
            .or_insert_with(|| PlayerWorldState::new(player))
            .dead_in
            .insert(dimension.clone());

        if changed {
            info!("💀 Marked {} as dead in '{}'", player, dimension);
        }
        self.after_mutation(changed);
    }

    /// Records a visit. Idempotent; creates the record if absent.
    pub fn mark_visited(&self, player: PlayerId, dimension: &DimensionName) {
        let changed = self
            .players
            .entry(player)
            .or_insert_with(|| PlayerWorldState::new(player))
            .visited_in
            .insert(dimension.clone());

        if changed {
            debug!("Marked {} as visited '{}'", player, dimension);
        }
        self.after_mutation(changed);
    }

    /// Prunes `dimension` from every player's sets. Records themselves are kept.
    pub fn remove_dimension(&self, dimension: &str) {
        let mut changed = false;
        for mut entry in self.players.iter_mut() {
            changed |= entry.remove_dimension(dimension);
        }
        if changed {
            info!("🧹 Removed stored state for dimension '{}'", dimension);
        }
        self.after_mutation(changed);
    }

    fn after_mutation(&self, changed: bool) {
        if changed || self.dirty.load(Ordering::Acquire) {
            if let Err(e) = self.persist() {
                warn!("Could not save player state, will retry on next change: {}", e);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------------

    /// Writes the current state through the backend.
    pub fn persist(&self) -> Result<()> {
        let _guard = self
            .persist_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match self.backend.save(&self.snapshot()) {
            Ok(()) => {
                self.dirty.store(false, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                self.dirty.store(true, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Replaces the in-memory state with what the backend holds.
    ///
    /// Entries whose key is not a valid player id are skipped with a warning.
    ///
    /// # Returns
    ///
    /// The number of player records loaded.
    ///
    /// # Errors
    ///
    /// Fails without touching memory when the backend cannot be read, or when an
    /// earlier write is still pending and flushing it fails again.
    pub fn reload(&self) -> Result<usize> {
        let _guard = self
            .persist_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Unsaved records must reach the backend before memory is replaced.
        if self.dirty.load(Ordering::Acquire) {
            self.backend.save(&self.snapshot())?;
            self.dirty.store(false, Ordering::Release);
        }

        let snapshot = self.backend.load()?.unwrap_or_default();
        self.players.clear();
        for (key, persisted) in snapshot.players {
            let Ok(player) = key.parse::<PlayerId>() else {
                warn!("Invalid player id in stored state: {}", key);
                continue;
            };
            let mut state = PlayerWorldState::new(player);
            state.dead_in.extend(persisted.dead);
            state.visited_in.extend(persisted.visited);
            self.players.insert(player, state);
        }
        self.dirty.store(false, Ordering::Release);

        let count = self.players.len();
        info!("📂 Loaded dead/visited data for {} players", count);
        Ok(count)
    }

    fn snapshot(&self) -> StateSnapshot {
        let players = self
            .players
            .iter()
            .map(|entry| {
                (
                    entry.key().to_string(),
                    PersistedPlayer {
                        dead: entry.dead_in.iter().cloned().collect(),
                        visited: entry.visited_in.iter().cloned().collect(),
                    },
                )
            })
            .collect();
        StateSnapshot { players }
    }
}
