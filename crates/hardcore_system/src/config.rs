//! Configuration document for hardcore worlds.
//!
//! The configuration is a TOML document addressed by nested key paths, e.g.
//! `hardcore-worlds.hc-1.settings.allow-tp-after-death`. Sections this crate does
//! not own (such as `[logging]`) are carried through every save untouched.
//!
//! ```toml
//! hub-world = "world"
//! max-open-hardcore-worlds = 3
//!
//! [defaults]
//! allow-spectator-on-death = true
//! allow-tp-after-death = false
//!
//! [hardcore-worlds.hc-1.dimensions]
//! overworld = "hc-1"
//! nether = "hc-1_nether"
//!
//! [hardcore-worlds.hc-1.settings]
//! allow-spectator-on-death = false
//! ```

use crate::error::Result;
use crate::types::{DimensionName, WorldPolicy};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use toml::{Table, Value};
use tracing::info;

pub const HUB_WORLD: &str = "hub-world";
pub const MAX_OPEN_WORLDS: &str = "max-open-hardcore-worlds";
pub const DEFAULTS: &str = "defaults";
pub const HARDCORE_WORLDS: &str = "hardcore-worlds";
pub const DIMENSIONS: &str = "dimensions";
pub const SETTINGS: &str = "settings";
pub const ALLOW_SPECTATOR: &str = "allow-spectator-on-death";
pub const ALLOW_TP: &str = "allow-tp-after-death";

pub const DEFAULT_HUB_WORLD: &str = "world";
pub const DEFAULT_MAX_OPEN_WORLDS: usize = 3;
pub const DATA_FILE: &str = "storage.data-file";
pub const DEFAULT_DATA_FILE: &str = "data.json";
pub const MESSAGES: &str = "messages";

/// A TOML table with nested-path accessors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    root: Table,
}

impl ConfigDocument {
    pub fn new(root: Table) -> Self {
        Self { root }
    }

    /// The document written when no configuration file exists yet.
    pub fn with_defaults() -> Self {
        let mut doc = Self::default();
        doc.set(HUB_WORLD, Value::String(DEFAULT_HUB_WORLD.to_string()));
        doc.set(MAX_OPEN_WORLDS, Value::Integer(DEFAULT_MAX_OPEN_WORLDS as i64));
        doc.set(&format!("{DEFAULTS}.{ALLOW_SPECTATOR}"), Value::Boolean(true));
        doc.set(&format!("{DEFAULTS}.{ALLOW_TP}"), Value::Boolean(false));
        doc.set(HARDCORE_WORLDS, Value::Table(Table::new()));
        doc
    }

    pub fn parse(content: &str) -> Result<Self> {
        let root: Table = toml::from_str(content)?;
        Ok(Self { root })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self.root)?)
    }

    pub fn root(&self) -> &Table {
        &self.root
    }

    /// Looks up a dotted path such as `defaults.allow-tp-after-death`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let segments: Vec<&str> = path.split('.').collect();
        self.get_in(&segments)
    }

    /// Looks up a path given as separate segments, for keys that may contain dots.
    pub fn get_in(&self, segments: &[&str]) -> Option<&Value> {
        let (last, parents) = segments.split_last()?;
        let mut table = &self.root;
        for segment in parents {
            table = table.get(*segment)?.as_table()?;
        }
        table.get(*last)
    }

    pub fn get_table_in(&self, segments: &[&str]) -> Option<&Table> {
        self.get_in(segments)?.as_table()
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path)?.as_str()
    }

    pub fn get_bool(&self, path: &str, default: bool) -> bool {
        self.get(path).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn set(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        self.set_in(&segments, value);
    }

    /// Writes a value, creating (or replacing non-table) intermediate sections.
    pub fn set_in(&mut self, segments: &[&str], value: Value) {
        let Some((last, parents)) = segments.split_last() else {
            return;
        };
        let mut table = &mut self.root;
        for segment in parents {
            let entry = table
                .entry(segment.to_string())
                .or_insert(Value::Table(Table::new()));
            if !entry.is_table() {
                *entry = Value::Table(Table::new());
            }
            let Some(inner) = entry.as_table_mut() else {
                return;
            };
            table = inner;
        }
        table.insert(last.to_string(), value);
    }

    pub fn remove_in(&mut self, segments: &[&str]) -> Option<Value> {
        let (last, parents) = segments.split_last()?;
        let mut table = &mut self.root;
        for segment in parents {
            table = table.get_mut(*segment)?.as_table_mut()?;
        }
        table.remove(*last)
    }

    // ------------------------------------------------------------------------
    // Typed accessors
    // ------------------------------------------------------------------------

    pub fn hub_world(&self) -> DimensionName {
        self.get_str(HUB_WORLD)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_HUB_WORLD)
            .into()
    }

    pub fn max_open_worlds(&self) -> usize {
        self.get(MAX_OPEN_WORLDS)
            .and_then(Value::as_integer)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(DEFAULT_MAX_OPEN_WORLDS)
    }

    /// Player state file, relative to the configuration directory.
    pub fn data_file(&self) -> &str {
        self.get_str(DATA_FILE).unwrap_or(DEFAULT_DATA_FILE)
    }

    /// Global default policy from `[defaults]`.
    pub fn default_policy(&self) -> WorldPolicy {
        let fallback = WorldPolicy::default();
        WorldPolicy {
            allow_spectator_on_death: self.get_bool(
                &format!("{DEFAULTS}.{ALLOW_SPECTATOR}"),
                fallback.allow_spectator_on_death,
            ),
            allow_teleport_after_death: self.get_bool(
                &format!("{DEFAULTS}.{ALLOW_TP}"),
                fallback.allow_teleport_after_death,
            ),
        }
    }
}

/// Load/save facility for the configuration document.
pub trait ConfigBackend: Send + Sync {
    fn load(&self) -> Result<ConfigDocument>;
    fn save(&self, document: &ConfigDocument) -> Result<()>;
}

/// Configuration stored as a TOML file on disk.
///
/// A missing file is created with [`ConfigDocument::with_defaults`].
#[derive(Debug, Clone)]
pub struct TomlConfigFile {
    path: PathBuf,
}

impl TomlConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigBackend for TomlConfigFile {
    fn load(&self) -> Result<ConfigDocument> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            ConfigDocument::parse(&content)
        } else {
            let document = ConfigDocument::with_defaults();
            self.save(&document)?;
            info!("Created default configuration file: {}", self.path.display());
            Ok(document)
        }
    }

    fn save(&self, document: &ConfigDocument) -> Result<()> {
        write_atomically(&self.path, document.to_toml_string()?.as_bytes())
    }
}

/// In-memory configuration, used by embedders that keep configuration elsewhere
/// and by tests.
#[derive(Debug, Default)]
pub struct MemoryConfig {
    document: Mutex<ConfigDocument>,
}

impl MemoryConfig {
    pub fn new(document: ConfigDocument) -> Self {
        Self {
            document: Mutex::new(document),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(Self::new(ConfigDocument::parse(content)?))
    }

    /// Snapshot of the last saved document.
    pub fn snapshot(&self) -> ConfigDocument {
        lock(&self.document).clone()
    }
}

impl ConfigBackend for MemoryConfig {
    fn load(&self) -> Result<ConfigDocument> {
        Ok(self.snapshot())
    }

    fn save(&self, document: &ConfigDocument) -> Result<()> {
        *lock(&self.document) = document.clone();
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Writes through a sibling temp file and renames it into place, so readers never
/// observe a partially written file.
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
