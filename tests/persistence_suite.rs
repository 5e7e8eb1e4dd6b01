mod common;

use std::fs;

use tabletop_ledger::{
    config::{Config, ConfigManager},
    core::{
        errors::LedgerError,
        services::{GoldService, ItemService, RollService},
        dice::DiceRoller,
    },
    domain::{ItemAttributes, CURRENT_SCHEMA_VERSION},
    storage::{load_inventory_from_path, ItemQuery, JsonStore, LedgerStore},
};

#[test]
fn ledger_survives_reopen() {
    let (mut store, home) = common::open_store("Shalizara");
    GoldService::setup(&mut store, 100).unwrap();
    let rope = ItemService::buy(
        &mut store,
        "Rope",
        2,
        Some(1.0),
        ItemAttributes::default().with_weight(10.0),
    )
    .unwrap();
    let mut roller = DiceRoller::seeded(7);
    RollService::roll(&mut store, &mut roller, "2d6".parse().unwrap()).unwrap();
    drop(store);

    let reopened = JsonStore::open(Some(home), "Shalizara", None).unwrap();
    assert_eq!(reopened.item(rope.id).unwrap().unwrap().remaining_quantity(), 2);
    assert_eq!(GoldService::current_balance(&reopened).unwrap(), 98.0);
    assert_eq!(reopened.rolls().unwrap().len(), 1);
}

#[test]
fn inventories_live_in_separate_files() {
    let (mut store, home) = common::open_store("Shalizara");
    ItemService::buy(&mut store, "Rope", 1, Some(1.0), ItemAttributes::default()).unwrap();

    let other = JsonStore::open(Some(home.clone()), "Party Loot", None).unwrap();
    assert!(other.find_items(&ItemQuery::all()).unwrap().is_empty());
    assert_ne!(store.path(), other.path());
    assert!(home.join("inventories").join("party_loot.json").exists());
}

#[test]
fn saves_leave_no_temp_file_behind() {
    let (mut store, _home) = common::open_store("Shalizara");
    ItemService::buy(&mut store, "Rope", 1, Some(1.0), ItemAttributes::default()).unwrap();
    let dir = store.path().parent().unwrap();
    let leftovers: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn mutations_keep_rolling_backups() {
    let (mut store, _home) = common::open_store("Shalizara");
    for _ in 0..6 {
        ItemService::buy(&mut store, "Torch", 1, Some(0.01), ItemAttributes::default()).unwrap();
    }
    let backups = store.list_backups().unwrap();
    assert!(!backups.is_empty());
    assert!(backups.len() <= 3);
    assert!(backups.iter().all(|name| name.starts_with("shalizara_")));
}

#[test]
fn restore_brings_back_the_snapshot() {
    let (mut store, _home) = common::open_store("Shalizara");
    ItemService::buy(&mut store, "Rope", 1, Some(1.0), ItemAttributes::default()).unwrap();
    let snapshot = store.backup(Some("before the vault")).unwrap();
    assert!(snapshot.contains("before-the-vault"));

    ItemService::buy(&mut store, "Ruby", 1, Some(500.0), ItemAttributes::default()).unwrap();
    store.restore(&snapshot).unwrap();
    let names: Vec<String> = store
        .find_items(&ItemQuery::all())
        .unwrap()
        .into_iter()
        .map(|item| item.name)
        .collect();
    assert_eq!(names, vec!["Rope".to_string()]);

    assert!(matches!(
        store.restore("missing.json"),
        Err(LedgerError::NotFound(_))
    ));
}

#[test]
fn newer_schema_is_rejected() {
    let (store, _home) = common::open_store("Shalizara");
    let path = store.path().to_path_buf();
    let raw = fs::read_to_string(&path).unwrap();
    let mut doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    doc["schema_version"] = serde_json::json!(CURRENT_SCHEMA_VERSION + 1);
    fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();

    let err = load_inventory_from_path(&path).unwrap_err();
    assert!(matches!(err, LedgerError::StorageError(_)));
}

#[test]
fn config_round_trips_and_backs_up() {
    let home = common::temp_home();
    let manager = ConfigManager::with_base_dir(home).unwrap();
    assert_eq!(manager.load().unwrap().inventory, Config::default().inventory);

    let mut config = Config::default();
    config.set_value("inventory", "Party Loot").unwrap();
    config.set_value("dice_seed", "42").unwrap();
    manager.save(&config).unwrap();
    let loaded = manager.load().unwrap();
    assert_eq!(loaded.dice_seed, Some(42));

    let name = manager.backup(&loaded, Some("party")).unwrap();
    assert_eq!(manager.list_backups().unwrap(), vec![name.clone()]);

    let mut changed = loaded.clone();
    changed.set_value("dice_seed", "none").unwrap();
    manager.save(&changed).unwrap();
    let restored = manager.restore(&name).unwrap();
    assert_eq!(restored.dice_seed, Some(42));
    assert_eq!(manager.load().unwrap().dice_seed, Some(42));
}
