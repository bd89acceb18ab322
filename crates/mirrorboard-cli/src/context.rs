use crate::cli::ReferenceArgs;
use mirrorboard_core::{AppConfig, BoardReference, BoardResult};
use mirrorboard_domain::RecordSet;
use mirrorboard_source::{DataSource, JsonFileSource};
use std::path::{Path, PathBuf};

pub struct CliContext {
    pub config: AppConfig,
    config_path: Option<PathBuf>,
}

impl CliContext {
    /// An explicit path must parse; the default location falls back to defaults.
    pub fn load(explicit: Option<PathBuf>) -> BoardResult<Self> {
        match explicit {
            Some(path) => {
                let config = if path.exists() {
                    AppConfig::load_from(&path)?
                } else {
                    AppConfig::stub()
                };
                Ok(Self {
                    config,
                    config_path: Some(path),
                })
            }
            None => Ok(Self {
                config: AppConfig::load(),
                config_path: AppConfig::config_path(),
            }),
        }
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn reference(&self, flags: &ReferenceArgs) -> anyhow::Result<BoardReference> {
        flags.resolve(&self.config.card).ok_or_else(|| {
            anyhow::anyhow!(
                "No board selected: pass --entity-id or --board-id, or run `mirrorboard config set`"
            )
        })
    }

    pub fn save(&self) -> anyhow::Result<&Path> {
        let path = self
            .config_path()
            .ok_or_else(|| anyhow::anyhow!("No config location on this platform, pass --config"))?;
        self.config.save_to(path)?;
        Ok(path)
    }
}

pub async fn load_records(states: &Path) -> BoardResult<RecordSet> {
    JsonFileSource::new(states).load().await
}
