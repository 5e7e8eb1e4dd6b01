use chrono::{DateTime, NaiveDateTime, Utc};
use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

use crate::{
    core::{
        errors::{LedgerError, Result},
        utils::{canonical_name, ensure_dir, sanitize_note, PathResolver},
    },
    domain::{Counter, DiceRoll, Inventory, ItemId, ItemStack, NewItem, CURRENT_SCHEMA_VERSION},
};

use super::{ItemQuery, LedgerStore, MemoryStore};

const FILE_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const BACKUP_TIMESTAMP_LEN: usize = 15;
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// File-backed store: one pretty-printed JSON document per inventory.
///
/// Every mutation rewrites the document through a temp file and rename.
/// The file being replaced is first copied into the backup directory.
/// A failed write rolls the in-memory records back, so memory never runs
/// ahead of disk.
pub struct JsonStore {
    records: MemoryStore,
    path: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStore {
    /// Opens (or creates) the inventory `name` under `base`, defaulting to the
    /// application home directory.
    pub fn open(base: Option<PathBuf>, name: &str, retention: Option<usize>) -> Result<Self> {
        let root = PathResolver::resolve_base(base);
        let inventories = PathResolver::inventory_dir_in(&root);
        ensure_dir(&inventories)?;
        let slug = canonical_name(name);
        let path = inventories.join(format!("{}.{}", slug, FILE_EXTENSION));
        let backups_dir = PathResolver::backup_dir_in(&root).join(&slug);

        let (inventory, fresh) = if path.exists() {
            (load_inventory_from_path(&path)?, false)
        } else {
            (Inventory::new(name.trim()), true)
        };

        let mut store = Self {
            records: MemoryStore::from_inventory(inventory),
            path,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        };
        if fresh {
            save_inventory_to_path(store.records.inventory(), &store.path)?;
            info!(path = %store.path.display(), "created inventory file");
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn inventory(&self) -> &Inventory {
        self.records.inventory()
    }

    /// Writes a labelled snapshot of the current document.
    pub fn backup(&self, note: Option<&str>) -> Result<String> {
        ensure_dir(&self.backups_dir)?;
        let mut stem = format!("{}_{}", self.slug(), Utc::now().format(BACKUP_TIMESTAMP_FORMAT));
        if let Some(label) = sanitize_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let (target, file_name) = self.unused_backup_path(&stem);
        let json = serde_json::to_string_pretty(self.records.inventory())?;
        write_atomic(&target, &json)?;
        info!(backup = %file_name, "inventory backup written");
        self.prune_backups()?;
        Ok(file_name)
    }

    /// Backup file names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        let slug = self.slug();
        entries.sort_by_key(|name| {
            Reverse((
                parse_backup_timestamp(&slug, name),
                backup_sequence(&slug, name),
                name.clone(),
            ))
        });
        Ok(entries)
    }

    /// Replaces the live document with a backup snapshot.
    pub fn restore(&mut self, backup_name: &str) -> Result<()> {
        let source = self.backups_dir.join(backup_name);
        if !source.exists() {
            return Err(LedgerError::NotFound(format!("backup `{}`", backup_name)));
        }
        let inventory = load_inventory_from_path(&source)?;
        let snapshot = std::mem::replace(&mut self.records, MemoryStore::from_inventory(inventory));
        self.commit(snapshot, ())?;
        info!(backup = %backup_name, "inventory restored from backup");
        Ok(())
    }

    fn slug(&self) -> String {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| canonical_name(&self.records.inventory().name))
    }

    /// Flushes, or puts `snapshot` back when the write fails.
    fn commit<T>(&mut self, snapshot: MemoryStore, value: T) -> Result<T> {
        match self.flush() {
            Ok(()) => Ok(value),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "write failed, changes rolled back");
                self.records = snapshot;
                Err(err)
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.backup_existing_file()?;
        save_inventory_to_path(self.records.inventory(), &self.path)?;
        debug!(path = %self.path.display(), "inventory saved");
        Ok(())
    }

    fn backup_existing_file(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        ensure_dir(&self.backups_dir)?;
        let stem = format!("{}_{}", self.slug(), Utc::now().format(BACKUP_TIMESTAMP_FORMAT));
        let (target, _) = self.unused_backup_path(&stem);
        fs::copy(&self.path, target)?;
        self.prune_backups()
    }

    /// First free `<stem>[_n].json` in the backup directory.
    fn unused_backup_path(&self, stem: &str) -> (PathBuf, String) {
        let mut file_name = format!("{}.{}", stem, FILE_EXTENSION);
        let mut attempt = 1;
        while self.backups_dir.join(&file_name).exists() {
            attempt += 1;
            file_name = format!("{}_{}.{}", stem, attempt, FILE_EXTENSION);
        }
        (self.backups_dir.join(&file_name), file_name)
    }

    fn prune_backups(&self) -> Result<()> {
        let backups = self.list_backups()?;
        for stale in backups.iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(self.backups_dir.join(stale)) {
                warn!(backup = %stale, error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl LedgerStore for JsonStore {
    fn create_item(&mut self, draft: NewItem) -> Result<ItemStack> {
        let snapshot = self.records.clone();
        let item = self.records.create_item(draft)?;
        self.commit(snapshot, item)
    }

    fn find_items(&self, query: &ItemQuery) -> Result<Vec<ItemStack>> {
        self.records.find_items(query)
    }

    fn save_item(&mut self, item: &ItemStack) -> Result<()> {
        let snapshot = self.records.clone();
        self.records.save_item(item)?;
        self.commit(snapshot, ())
    }

    fn delete_item(&mut self, id: ItemId) -> Result<()> {
        let snapshot = self.records.clone();
        self.records.delete_item(id)?;
        self.commit(snapshot, ())
    }

    fn counter(&self, name: &str) -> Result<Option<Counter>> {
        self.records.counter(name)
    }

    fn create_counter(&mut self, counter: Counter) -> Result<Counter> {
        let snapshot = self.records.clone();
        let counter = self.records.create_counter(counter)?;
        self.commit(snapshot, counter)
    }

    fn save_counter(&mut self, counter: &Counter) -> Result<()> {
        let snapshot = self.records.clone();
        self.records.save_counter(counter)?;
        self.commit(snapshot, ())
    }

    fn record_roll(&mut self, roll: DiceRoll) -> Result<DiceRoll> {
        let snapshot = self.records.clone();
        let roll = self.records.record_roll(roll)?;
        self.commit(snapshot, roll)
    }

    fn rolls(&self) -> Result<Vec<DiceRoll>> {
        self.records.rolls()
    }
}

pub fn save_inventory_to_path(inventory: &Inventory, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(inventory)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_inventory_from_path(path: &Path) -> Result<Inventory> {
    let data = fs::read_to_string(path)?;
    let mut inventory: Inventory = serde_json::from_str(&data)?;
    if inventory.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(LedgerError::StorageError(format!(
            "`{}` was written by a newer schema (v{})",
            path.display(),
            inventory.schema_version
        )));
    }
    inventory.normalize();
    Ok(inventory)
}

fn parse_backup_timestamp(slug: &str, name: &str) -> Option<DateTime<Utc>> {
    let rest = name.strip_prefix(slug)?.strip_prefix('_')?;
    let raw = rest.get(..BACKUP_TIMESTAMP_LEN)?;
    NaiveDateTime::parse_from_str(raw, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// The `_n` suffix added when several backups share a second; 1 otherwise.
fn backup_sequence(slug: &str, name: &str) -> u32 {
    name.strip_prefix(slug)
        .and_then(|rest| rest.get(1 + BACKUP_TIMESTAMP_LEN..))
        .and_then(|rest| rest.strip_suffix(FILE_EXTENSION))
        .and_then(|rest| rest.strip_suffix('.'))
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.parse().ok())
        .unwrap_or(1)
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

pub(crate) fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemAttributes;
    use tempfile::TempDir;

    fn store_in_temp_dir() -> (JsonStore, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let store =
            JsonStore::open(Some(temp.path().to_path_buf()), "Party Loot", Some(3)).expect("store");
        (store, temp)
    }

    fn rope() -> NewItem {
        NewItem {
            name: "Rope".into(),
            quantity: 1,
            was_bought: true,
            attributes: ItemAttributes::default().with_price(1.0),
        }
    }

    #[test]
    fn mutations_survive_reopen() {
        let (mut store, guard) = store_in_temp_dir();
        let item = store.create_item(rope()).expect("create");
        assert!(store.path().ends_with("inventories/party_loot.json"));

        let reopened =
            JsonStore::open(Some(guard.path().to_path_buf()), "Party Loot", None).expect("reopen");
        let loaded = reopened.item(item.id).expect("lookup").expect("item");
        assert_eq!(loaded.name, "Rope");
        assert_eq!(reopened.inventory().name, "Party Loot");
    }

    #[test]
    fn backups_are_listed_and_pruned() {
        let (mut store, _guard) = store_in_temp_dir();
        for _ in 0..5 {
            store.create_item(rope()).expect("create");
        }
        store.backup(Some("before the dragon")).expect("backup");
        let backups = store.list_backups().expect("list");
        assert!(!backups.is_empty());
        assert!(backups.len() <= 3);
    }

    #[test]
    fn restore_replaces_live_records() {
        let (mut store, _guard) = store_in_temp_dir();
        store.create_item(rope()).expect("create");
        let name = store.backup(Some("one rope")).expect("backup");
        store.create_item(rope()).expect("second rope");
        assert_eq!(store.inventory().items.len(), 2);

        store.restore(&name).expect("restore");
        assert_eq!(store.inventory().items.len(), 1);
    }

    #[test]
    fn backup_timestamps_parse_with_notes() {
        let parsed = parse_backup_timestamp("loot", "loot_20240102_030405_camp.json");
        assert_eq!(parsed.map(|at| at.to_rfc3339()).as_deref(), Some("2024-01-02T03:04:05+00:00"));
        assert!(parse_backup_timestamp("loot", "loot_20240102_030405_2.json").is_some());
        assert!(parse_backup_timestamp("loot", "other_20240102_030405.json").is_none());
        assert_eq!(backup_sequence("loot", "loot_20240102_030405_10.json"), 10);
        assert_eq!(backup_sequence("loot", "loot_20240102_030405.json"), 1);
        assert_eq!(backup_sequence("loot", "loot_20240102_030405_camp.json"), 1);
    }

    #[test]
    fn manual_backup_survives_the_next_write() {
        let (mut store, _guard) = store_in_temp_dir();
        let manual = store.backup(None).expect("backup");
        store.create_item(rope()).expect("create");
        store.create_item(rope()).expect("create again");

        let backups = store.list_backups().expect("list");
        assert!(backups.contains(&manual));
        assert_eq!(backups.len(), 3);
        let restored = store.restore(&manual);
        assert!(restored.is_ok());
        assert!(store.inventory().items.is_empty());
    }

    #[test]
    fn failed_write_leaves_records_untouched() {
        let (mut store, _guard) = store_in_temp_dir();
        let item = store.create_item(rope()).expect("create");
        let mut renamed = item.clone();
        renamed.name = "Silk Rope".into();

        // A directory squatting on the temp path makes the write fail.
        let blocker = tmp_path(store.path());
        fs::create_dir(&blocker).expect("blocker");
        assert!(store.save_item(&renamed).is_err());
        assert!(store.create_item(rope()).is_err());
        assert!(store.save_counter(&Counter::new("Total Earned", 5, None)).is_err());
        fs::remove_dir(&blocker).expect("cleanup");

        assert_eq!(store.inventory().items.len(), 1);
        assert_eq!(store.item(item.id).expect("lookup").expect("item").name, "Rope");
        assert!(store.counter("Total Earned").expect("lookup").is_none());

        let reopened = JsonStore::open(
            Some(store.path().parent().and_then(Path::parent).expect("root").to_path_buf()),
            "Party Loot",
            None,
        )
        .expect("reopen");
        assert_eq!(reopened.inventory().items, store.inventory().items);
    }
}
