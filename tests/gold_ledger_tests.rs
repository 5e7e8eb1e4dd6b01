mod common;

use tabletop_ledger::{
    core::{
        errors::LedgerError,
        services::{GoldService, ItemService},
    },
    domain::{ItemAttributes, ItemId, MISC_SPENDING, TOTAL_EARNED},
    storage::{LedgerStore, MemoryStore},
};

#[test]
fn balance_tracks_purchases_and_misc_spending() {
    let mut store = common::adventurer();
    assert_eq!(GoldService::current_balance(&store).unwrap(), 49.0);

    GoldService::record_misc_spend(&mut store, 9).unwrap();
    assert_eq!(GoldService::current_balance(&store).unwrap(), 40.0);

    GoldService::earn(&mut store, 60).unwrap();
    assert_eq!(GoldService::total_earned(&store).unwrap(), 160);
    assert_eq!(GoldService::current_balance(&store).unwrap(), 100.0);
}

#[test]
fn buying_thirty_out_of_a_hundred_leaves_seventy() {
    let mut store = MemoryStore::default();
    GoldService::setup(&mut store, 100).unwrap();
    ItemService::buy(&mut store, "Chain Shirt", 1, Some(30.0), ItemAttributes::default()).unwrap();
    assert_eq!(GoldService::current_balance(&store).unwrap(), 70.0);
}

#[test]
fn second_setup_fails_without_touching_counters() {
    let mut store = common::adventurer();
    let earned = store.counter(TOTAL_EARNED).unwrap().unwrap();
    let misc = store.counter(MISC_SPENDING).unwrap().unwrap();

    assert!(matches!(
        GoldService::setup(&mut store, 1_000),
        Err(LedgerError::AlreadySetup)
    ));
    assert_eq!(store.counter(TOTAL_EARNED).unwrap().unwrap(), earned);
    assert_eq!(store.counter(MISC_SPENDING).unwrap().unwrap(), misc);
}

#[test]
fn partial_sale_lowers_lifetime_spending() {
    let mut store = common::adventurer();
    ItemService::sell(&mut store, ItemId(2), Some(1)).unwrap();
    assert_eq!(GoldService::lifetime_spent(&store).unwrap(), 26.0);
    assert_eq!(GoldService::current_balance(&store).unwrap(), 74.0);
}

#[test]
fn gold_commands_need_setup() {
    let mut store = MemoryStore::default();
    assert!(matches!(
        GoldService::earn(&mut store, 5),
        Err(LedgerError::InvalidState(_))
    ));
    assert!(matches!(
        GoldService::current_balance(&store),
        Err(LedgerError::InvalidState(_))
    ));
}
