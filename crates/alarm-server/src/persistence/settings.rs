//! JSON-file settings store.
//!
//! Holds the live [`AlarmSettings`] and writes every accepted change through
//! to disk before it becomes visible to the scan loop. Writers are serialized
//! so the file and the live copy always agree, and the file is replaced by
//! rename so a reader never sees a half-written document.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use alarm_core::{AlarmSettings, SettingsError, SettingsWarning};
use anyhow::{Context, Result};
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SettingsUpdateError {
    #[error(transparent)]
    Invalid(#[from] SettingsError),
    #[error("failed to persist settings: {0:#}")]
    Persist(anyhow::Error),
}

pub struct SettingsStore {
    path: PathBuf,
    current: RwLock<AlarmSettings>,
    /// Held across persist and swap.
    write_lock: Mutex<()>,
}

impl SettingsStore {
    /// Load settings from `path`.
    ///
    /// A missing, unreadable or invalid file is replaced by the defaults,
    /// which are written back immediately. Returns the warnings for the
    /// settings that ended up live.
    pub async fn load(path: impl Into<PathBuf>) -> Result<(Self, Vec<SettingsWarning>)> {
        let path = path.into();

        let loaded = match read_settings(&path).await {
            Ok(Some(settings)) => match settings.validate() {
                Ok(_) => Some(settings),
                Err(err) => {
                    warn!("Stored settings rejected ({}), using defaults", err);
                    None
                }
            },
            Ok(None) => {
                info!("No settings at {}, using defaults", path.display());
                None
            }
            Err(err) => {
                warn!("Failed to read settings at {}: {:#}", path.display(), err);
                None
            }
        };

        let settings = match loaded {
            Some(settings) => {
                info!("Settings loaded from {}", path.display());
                settings
            }
            None => {
                let defaults = AlarmSettings::default();
                persist_settings(&path, &defaults).await?;
                defaults
            }
        };

        let warnings = settings.validate().unwrap_or_default();
        let store = Self {
            path,
            current: RwLock::new(settings),
            write_lock: Mutex::new(()),
        };
        Ok((store, warnings))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the live settings.
    pub fn current(&self) -> AlarmSettings {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Validate, persist, then swap in `settings`.
    pub async fn update(
        &self,
        settings: AlarmSettings,
    ) -> Result<Vec<SettingsWarning>, SettingsUpdateError> {
        let warnings = settings.validate()?;
        let _guard = self.write_lock.lock().await;
        persist_settings(&self.path, &settings)
            .await
            .map_err(SettingsUpdateError::Persist)?;
        self.replace(settings);
        Ok(warnings)
    }

    pub async fn reset_to_defaults(&self) -> Result<AlarmSettings> {
        let defaults = AlarmSettings::default();
        let _guard = self.write_lock.lock().await;
        persist_settings(&self.path, &defaults).await?;
        self.replace(defaults.clone());
        Ok(defaults)
    }

    fn replace(&self, settings: AlarmSettings) {
        match self.current.write() {
            Ok(mut guard) => *guard = settings,
            Err(poisoned) => *poisoned.into_inner() = settings,
        }
    }
}

async fn read_settings(path: &Path) -> Result<Option<AlarmSettings>> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return Ok(None);
    }
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let settings = serde_json::from_slice::<AlarmSettings>(&bytes).context("parsing settings")?;
    Ok(Some(settings))
}

async fn persist_settings(path: &Path, settings: &AlarmSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let payload = serde_json::to_vec_pretty(settings)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, payload)
        .await
        .with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .await
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}
