//! # Core Type Definitions
//!
//! Identifiers and value types shared by every component of the hardcore system.
//!
//! ## Key Types
//!
//! - [`PlayerId`] - UUID wrapper identifying a player
//! - [`HardcoreWorldId`] - player-facing hardcore world ("hc-1")
//! - [`DimensionName`] - a single backing dimension ("hc-1_nether")
//! - [`WorldPolicy`] / [`WorldGroup`] - registered world definitions
//! - [`HardcoreDimension`] - the three dimension kinds and their naming rules

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a player.
///
/// Wraps a UUID so player ids cannot be confused with world or dimension ids.
///
/// ```rust
/// use hardcore_system::PlayerId;
///
/// let player_id: PlayerId = "550e8400-e29b-41d4-a716-446655440000".parse()?;
/// println!("Player ID: {}", player_id);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Creates a new random player ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::str::FromStr for PlayerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Blank ids never name a real world or dimension.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a player-facing hardcore world, e.g. `"hc-1"`.
    HardcoreWorldId
);

string_id!(
    /// Name of a single physically addressable dimension, e.g. `"hc-1_nether"`.
    ///
    /// Each dimension belongs to at most one [`HardcoreWorldId`].
    DimensionName
);

impl HardcoreWorldId {
    /// The dimension a legacy single-dimension world is backed by.
    pub fn legacy_dimension(&self) -> DimensionName {
        DimensionName(self.0.clone())
    }
}

// ============================================================================
// Policy and world groups
// ============================================================================

/// Post-death behaviour of a hardcore world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldPolicy {
    /// Dead players stay inside the world as spectators instead of going to the hub.
    pub allow_spectator_on_death: bool,
    /// Dead players may still teleport into the world (as spectators).
    pub allow_teleport_after_death: bool,
}

impl Default for WorldPolicy {
    fn default() -> Self {
        Self {
            allow_spectator_on_death: true,
            allow_teleport_after_death: false,
        }
    }
}

/// Per-field overrides applied on top of the configured default policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyOverride {
    pub allow_spectator_on_death: Option<bool>,
    pub allow_teleport_after_death: Option<bool>,
}

impl PolicyOverride {
    pub fn apply_to(&self, defaults: WorldPolicy) -> WorldPolicy {
        WorldPolicy {
            allow_spectator_on_death: self
                .allow_spectator_on_death
                .unwrap_or(defaults.allow_spectator_on_death),
            allow_teleport_after_death: self
                .allow_teleport_after_death
                .unwrap_or(defaults.allow_teleport_after_death),
        }
    }
}

/// A registered hardcore world and its backing dimensions.
///
/// `dimensions` is never empty; the first entry is the world's primary (spawn)
/// dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldGroup {
    pub id: HardcoreWorldId,
    pub dimensions: Vec<DimensionName>,
    pub policy: WorldPolicy,
}

impl WorldGroup {
    pub fn contains(&self, dimension: &str) -> bool {
        self.dimensions.iter().any(|d| d.as_str() == dimension)
    }

    /// Dimension used as the world's default spawn.
    pub fn primary_dimension(&self) -> &DimensionName {
        &self.dimensions[0]
    }
}

// ============================================================================
// Dimension kinds
// ============================================================================

/// The dimension kinds a hardcore world can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardcoreDimension {
    Overworld,
    Nether,
    End,
}

impl HardcoreDimension {
    pub const ALL: [HardcoreDimension; 3] = [Self::Overworld, Self::Nether, Self::End];

    /// Key used under `hardcore-worlds.<id>.dimensions`.
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::Overworld => "overworld",
            Self::Nether => "nether",
            Self::End => "end",
        }
    }

    pub const fn name_suffix(self) -> &'static str {
        match self {
            Self::Overworld => "",
            Self::Nether => "_nether",
            Self::End => "_the_end",
        }
    }

    /// Environment name understood by the world orchestrator.
    pub const fn environment(self) -> &'static str {
        match self {
            Self::Overworld => "normal",
            Self::Nether => "nether",
            Self::End => "the_end",
        }
    }

    pub fn from_config_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.config_key() == key)
    }

    /// `hc-1` + nether → `hc-1_nether`.
    pub fn dimension_name_for(self, world: &HardcoreWorldId) -> DimensionName {
        DimensionName(format!("{}{}", world.as_str(), self.name_suffix()))
    }
}

impl fmt::Display for HardcoreDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}
