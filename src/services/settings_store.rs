use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::models::Settings;

/// Current settings schema version. Migrations below must stay strictly
/// ordered and idempotent; bump this when adding a rung.
pub const SETTINGS_VERSION: u64 = 2;

/// Apply the version-gated migration ladder to a raw settings blob.
///
/// Any non-object input (corrupt blob, wrong type) restarts from version-0
/// defaults. Each rung sets its target version and the fields it introduces;
/// running the ladder on an already-current object changes nothing, so
/// `migrate(migrate(x)) == migrate(x)` for every `x`.
pub fn migrate(value: Value) -> Value {
    let mut obj = match value {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let mut version = obj.get("version").and_then(Value::as_u64).unwrap_or(0);

    if version < 1 {
        obj.insert("version".to_string(), json!(1));
        obj.insert("pinnedTeamIds".to_string(), json!([]));
        version = 1;
    }
    if version < 2 {
        obj.insert("version".to_string(), json!(2));
        obj.insert("invertColor".to_string(), json!(false));
        obj.insert("autoscroll".to_string(), json!(false));
    }

    Value::Object(obj)
}

/// Field-level settings mutation. Everything the UI can do to settings is
/// one of these; there is no whole-record write path.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsPatch {
    TogglePin(String),
    ToggleInvertColor,
    ToggleAutoscroll,
    SetInvertColor(bool),
    SetAutoscroll(bool),
}

/// One named durable slot holding the serialized settings record.
pub trait SettingsStorage {
    /// `Ok(None)` when the slot has never been written.
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, serialized: &str) -> Result<()>;
}

/// File-backed storage slot.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsStorage for FileStorage {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("reading {}", self.path.display())),
        }
    }

    fn save(&self, serialized: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&self.path, serialized)
            .with_context(|| format!("writing {}", self.path.display()))
    }
}

/// Loads, migrates, mutates, and persists the settings record. Storage
/// failures are logged and the session continues in memory only; they never
/// reach the rendering path.
pub struct SettingsStore<S> {
    storage: S,
    settings: Settings,
}

impl<S: SettingsStorage> SettingsStore<S> {
    pub fn open(storage: S) -> Self {
        let blob = match storage.load() {
            Ok(Some(raw)) => match serde_json::from_str::<Value>(&raw) {
                Ok(value) => value,
                Err(err) => {
                    warn!("Corrupt settings blob, rebuilding from defaults: {err}");
                    json!({})
                }
            },
            Ok(None) => {
                info!("No persisted settings, starting from defaults");
                json!({})
            }
            Err(err) => {
                warn!("Settings load failed, this session is not persisted: {err:#}");
                json!({})
            }
        };

        let settings = deserialize_migrated(migrate(blob));
        Self { storage, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Apply one field-level patch and persist the full record.
    pub fn apply(&mut self, patch: SettingsPatch) {
        match patch {
            SettingsPatch::TogglePin(team_id) => {
                if let Some(pos) = self
                    .settings
                    .pinned_team_ids
                    .iter()
                    .position(|id| id == &team_id)
                {
                    self.settings.pinned_team_ids.remove(pos);
                } else {
                    self.settings.pinned_team_ids.push(team_id);
                }
            }
            SettingsPatch::ToggleInvertColor => {
                self.settings.invert_color = !self.settings.invert_color;
            }
            SettingsPatch::ToggleAutoscroll => {
                self.settings.autoscroll = !self.settings.autoscroll;
            }
            SettingsPatch::SetInvertColor(on) => self.settings.invert_color = on,
            SettingsPatch::SetAutoscroll(on) => self.settings.autoscroll = on,
        }
        self.persist();
    }

    fn persist(&self) {
        let serialized = match serde_json::to_string(&self.settings) {
            Ok(serialized) => serialized,
            Err(err) => {
                warn!("Failed to serialize settings: {err}");
                return;
            }
        };
        if let Err(err) = self.storage.save(&serialized) {
            warn!("Failed to save settings, this session is not persisted: {err:#}");
        }
    }
}

/// After the ladder every known field is present, so deserialization can
/// only fail on hostile field types; fall back through a clean ladder run.
fn deserialize_migrated(value: Value) -> Settings {
    match serde_json::from_value::<Settings>(value) {
        Ok(settings) => settings,
        Err(err) => {
            warn!("Migrated settings still malformed, using defaults: {err}");
            serde_json::from_value(migrate(json!({})))
                .unwrap_or_else(|_| unreachable!("default settings ladder must deserialize"))
        }
    }
}
