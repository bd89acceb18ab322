use crate::{BoardError, BoardResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which board the mirror should display.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoardReference {
    /// A canonical entity reference, e.g. `sensor.trello_board_roadmap`.
    Entity(String),
    /// A raw board identifier as used by older configurations.
    LegacyBoardId(String),
}

impl BoardReference {
    pub fn identifier(&self) -> &str {
        match self {
            Self::Entity(id) | Self::LegacyBoardId(id) => id,
        }
    }
}

impl fmt::Display for BoardReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(id) => write!(f, "entity {}", id),
            Self::LegacyBoardId(id) => write!(f, "board {}", id),
        }
    }
}

/// Per-card configuration produced by the configuration editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<String>,
    /// Display and style options. Passed through untouched.
    #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
    pub display: toml::Table,
}

impl CardConfig {
    /// Resolve the configured reference. The canonical entity wins when both are set.
    pub fn reference(&self) -> Option<BoardReference> {
        let non_empty = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(String::from);

        non_empty(&self.entity_id)
            .map(BoardReference::Entity)
            .or_else(|| non_empty(&self.board_id).map(BoardReference::LegacyBoardId))
    }

    /// Select a canonical entity. Clears any legacy board id.
    pub fn set_entity_id(&mut self, entity_id: Option<String>) {
        match entity_id.filter(|s| !s.is_empty()) {
            Some(id) => {
                self.entity_id = Some(id);
                self.board_id = None;
            }
            None => self.entity_id = None,
        }
    }

    /// Set a legacy board id. Clears any selected entity.
    pub fn set_board_id(&mut self, board_id: Option<String>) {
        match board_id.filter(|s| !s.is_empty()) {
            Some(id) => {
                self.board_id = Some(id);
                self.entity_id = None;
            }
            None => self.board_id = None,
        }
    }
}

/// Timings for the optimistic mutation protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// How long a confirmed temporary card stays visible before it is purged.
    #[serde(default = "default_temp_card_purge_ms")]
    pub temp_card_purge_ms: u64,
    /// How long a fire-and-forget command is given before it is assumed to have succeeded.
    #[serde(default = "default_command_grace_ms")]
    pub command_grace_ms: u64,
}

fn default_temp_card_purge_ms() -> u64 {
    3000
}

fn default_command_grace_ms() -> u64 {
    1000
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            temp_card_purge_ms: default_temp_card_purge_ms(),
            command_grace_ms: default_command_grace_ms(),
        }
    }
}

impl SyncSettings {
    pub fn temp_card_purge_delay(&self) -> Duration {
        Duration::from_millis(self.temp_card_purge_ms)
    }

    pub fn command_grace_delay(&self) -> Duration {
        Duration::from_millis(self.command_grace_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub card: CardConfig,
    #[serde(default)]
    pub sync: SyncSettings,
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/mirrorboard/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("mirrorboard/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("mirrorboard\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        if let Some(config_path) = Self::config_path() {
            if config_path.exists() {
                match Self::load_from(&config_path) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Ignoring config at {}: {}", config_path.display(), e);
                    }
                }
            }
        }
        Self::default()
    }

    /// Load from an explicit path. Unlike [`AppConfig::load`], errors are reported.
    pub fn load_from(path: &Path) -> BoardResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> BoardResult<Self> {
        toml::from_str(content).map_err(|e| BoardError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> BoardResult<String> {
        toml::to_string_pretty(self).map_err(|e| BoardError::Config(e.to_string()))
    }

    pub fn save_to(&self, path: &Path) -> BoardResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// The stub configuration offered when a new board card is added.
    pub fn stub() -> Self {
        Self::default()
    }
}
