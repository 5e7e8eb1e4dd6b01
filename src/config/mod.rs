use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::{
    core::{
        errors::LedgerError,
        utils::{canonical_name, ensure_dir, sanitize_note, PathResolver},
    },
    storage::json_backend::{tmp_path, write_atomic},
};

const BACKUP_EXTENSION: &str = "json";
const BACKUP_PREFIX: &str = "config";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const BACKUP_TIMESTAMP_LEN: usize = 15;

/// Names accepted by [`Config::set_value`].
pub const CONFIG_KEYS: &[&str] = &[
    "inventory",
    "ui_color_enabled",
    "screen_reader_mode",
    "high_contrast_mode",
    "backup_retention",
    "dice_seed",
];

/// User preferences for the shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Inventory opened at startup.
    #[serde(default = "Config::default_inventory")]
    pub inventory: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default)]
    pub screen_reader_mode: bool,
    #[serde(default)]
    pub high_contrast_mode: bool,
    /// Automatic inventory backups kept per inventory.
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dice_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inventory: Self::default_inventory(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            screen_reader_mode: false,
            high_contrast_mode: false,
            backup_retention: Self::default_backup_retention(),
            dice_seed: None,
        }
    }
}

impl Config {
    pub fn default_inventory() -> String {
        "items".into()
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    /// Updates one preference from its textual form.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), LedgerError> {
        let value = value.trim();
        match key {
            "inventory" => {
                if value.is_empty() {
                    return Err(LedgerError::ConfigError("inventory name cannot be empty".into()));
                }
                self.inventory = canonical_name(value);
            }
            "ui_color_enabled" => self.ui_color_enabled = parse_flag(key, value)?,
            "screen_reader_mode" => self.screen_reader_mode = parse_flag(key, value)?,
            "high_contrast_mode" => self.high_contrast_mode = parse_flag(key, value)?,
            "backup_retention" => {
                let retention: usize = value.parse().map_err(|_| {
                    LedgerError::ConfigError(format!("`{}` is not a whole number", value))
                })?;
                if retention == 0 {
                    return Err(LedgerError::ConfigError(
                        "backup_retention must be at least 1".into(),
                    ));
                }
                self.backup_retention = retention;
            }
            "dice_seed" => {
                self.dice_seed = match value {
                    "" | "none" | "off" => None,
                    other => Some(other.parse().map_err(|_| {
                        LedgerError::ConfigError(format!("`{}` is not a valid seed", other))
                    })?),
                };
            }
            other => {
                return Err(LedgerError::ConfigError(format!(
                    "unknown setting `{}` (expected one of: {})",
                    other,
                    CONFIG_KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// `(key, value)` pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("inventory", self.inventory.clone()),
            ("ui_color_enabled", self.ui_color_enabled.to_string()),
            ("screen_reader_mode", self.screen_reader_mode.to_string()),
            ("high_contrast_mode", self.high_contrast_mode.to_string()),
            ("backup_retention", self.backup_retention.to_string()),
            (
                "dice_seed",
                self.dice_seed
                    .map(|seed| seed.to_string())
                    .unwrap_or_else(|| "none".into()),
            ),
        ]
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, LedgerError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(LedgerError::ConfigError(format!(
            "`{}` expects true/false, got `{}`",
            key, value
        ))),
    }
}

/// Loads and saves [`Config`] under `<home>/config`, with timestamped backups.
pub struct ConfigManager {
    path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        let backups_dir = PathResolver::config_backup_dir_in(&base);
        ensure_dir(&backups_dir)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            backups_dir,
        })
    }

    pub fn load(&self) -> Result<Config, LedgerError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data).map_err(|err| {
                LedgerError::ConfigError(format!("{}: {}", self.path.display(), err))
            })
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String, LedgerError> {
        ensure_dir(&self.backups_dir)?;
        let mut stem = format!(
            "{}_{}",
            BACKUP_PREFIX,
            Utc::now().format(BACKUP_TIMESTAMP_FORMAT)
        );
        if let Some(label) = sanitize_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let mut name = format!("{}.{}", stem, BACKUP_EXTENSION);
        let mut attempt = 1;
        while self.backups_dir.join(&name).exists() {
            attempt += 1;
            name = format!("{}_{}.{}", stem, attempt, BACKUP_EXTENSION);
        }
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.backups_dir.join(&name), &json)?;
        info!(backup = %name, "configuration backup written");
        Ok(name)
    }

    /// Reads a backup and makes it the live configuration.
    pub fn restore(&self, backup_name: &str) -> Result<Config, LedgerError> {
        let path = self.backups_dir.join(backup_name);
        if !path.exists() {
            return Err(LedgerError::NotFound(format!(
                "configuration backup `{}`",
                backup_name
            )));
        }
        let data = fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&data)?;
        self.save(&config)?;
        info!(backup = %backup_name, "configuration restored");
        Ok(config)
    }

    /// Backup names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>, LedgerError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        entries.sort_by(|a, b| {
            parse_timestamp(b)
                .cmp(&parse_timestamp(a))
                .then_with(|| b.cmp(a))
        });
        Ok(entries)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let rest = name.strip_prefix(BACKUP_PREFIX)?.strip_prefix('_')?;
    let raw = rest.get(..BACKUP_TIMESTAMP_LEN)?;
    NaiveDateTime::parse_from_str(raw, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}
