#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use once_cell::sync::Lazy;
use tabletop_ledger::{
    core::services::{GainTarget, GoldService, ItemService},
    domain::ItemAttributes,
    storage::{JsonStore, MemoryStore},
};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh application home directory.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn open_store(name: &str) -> (JsonStore, PathBuf) {
    let home = temp_home();
    let store = JsonStore::open(Some(home.clone()), name, Some(3)).expect("open json store");
    (store, home)
}

/// A character who set up gold with 100gp, bought rope and potions, and
/// found a dagger.
pub fn adventurer() -> MemoryStore {
    let mut store = MemoryStore::new("Shalizara");
    GoldService::setup(&mut store, 100).expect("gold setup");
    ItemService::buy(
        &mut store,
        "Rope",
        1,
        Some(1.0),
        ItemAttributes::default().with_weight(10.0),
    )
    .expect("buy rope");
    ItemService::buy(
        &mut store,
        "Potion of Healing",
        2,
        Some(25.0),
        ItemAttributes::default().with_weight(0.5).magical(),
    )
    .expect("buy potions");
    ItemService::gain(
        &mut store,
        GainTarget::New("Dagger".into()),
        1,
        ItemAttributes::default().with_weight(1.0).with_price(2.0),
    )
    .expect("gain dagger");
    store
}
