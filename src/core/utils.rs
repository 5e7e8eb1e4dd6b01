use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::core::errors::Result;

pub const HOME_ENV: &str = "TABLETOP_LEDGER_HOME";

const DEFAULT_DIR_NAME: &str = ".tabletop_ledger";
const INVENTORY_DIR: &str = "inventories";
const BACKUP_DIR: &str = "backups";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const CONFIG_BACKUP_DIR: &str = "backups";

/// Resolves the on-disk layout under the application home directory.
pub struct PathResolver;

impl PathResolver {
    /// Application data directory: `$TABLETOP_LEDGER_HOME`, else `~/.tabletop_ledger`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(custom: Option<PathBuf>) -> PathBuf {
        custom.unwrap_or_else(Self::base_dir)
    }

    pub fn inventory_dir_in(base: &Path) -> PathBuf {
        base.join(INVENTORY_DIR)
    }

    pub fn backup_dir_in(base: &Path) -> PathBuf {
        base.join(BACKUP_DIR)
    }

    pub fn config_dir_in(base: &Path) -> PathBuf {
        base.join(CONFIG_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        Self::config_dir_in(base).join(CONFIG_FILE)
    }

    pub fn config_backup_dir_in(base: &Path) -> PathBuf {
        Self::config_dir_in(base).join(CONFIG_BACKUP_DIR)
    }
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Lowercases a user-supplied name into a filesystem-safe slug.
pub fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "items".into()
    } else {
        sanitized
    }
}

/// Turns a free-form backup note into a dash-separated label.
pub fn sanitize_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_name_replaces_symbols() {
        assert_eq!(canonical_name("Shalizara's Pack"), "shalizara_s_pack");
        assert_eq!(canonical_name("  ???  "), "items");
    }

    #[test]
    fn sanitize_note_collapses_separators() {
        assert_eq!(
            sanitize_note(Some("Before  the. dragon")),
            Some("before-the-dragon".to_string())
        );
        assert_eq!(sanitize_note(Some("   ")), None);
        assert_eq!(sanitize_note(None), None);
    }
}
