use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    counter::Counter,
    item::{ItemId, ItemStack, NewItem},
    roll::DiceRoll,
};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Every record belonging to one character's books.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    pub id: Uuid,
    pub name: String,
    #[serde(default = "Inventory::first_item_id")]
    pub next_item_id: u64,
    #[serde(default)]
    pub items: Vec<ItemStack>,
    #[serde(default)]
    pub counters: Vec<Counter>,
    #[serde(default)]
    pub rolls: Vec<DiceRoll>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Inventory::schema_version_default")]
    pub schema_version: u8,
}

impl Inventory {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            next_item_id: Self::first_item_id(),
            items: Vec::new(),
            counters: Vec::new(),
            rolls: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    /// Assigns the next serial id and stores the stack.
    pub fn insert_item(&mut self, draft: NewItem) -> ItemStack {
        let id = self.allocate_id();
        let item = ItemStack::from_draft(id, draft);
        self.items.push(item.clone());
        self.touch();
        item
    }

    pub fn item(&self, id: ItemId) -> Option<&ItemStack> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut ItemStack> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn remove_item(&mut self, id: ItemId) -> Option<ItemStack> {
        let index = self.items.iter().position(|item| item.id == id)?;
        self.touch();
        Some(self.items.remove(index))
    }

    pub fn counter(&self, name: &str) -> Option<&Counter> {
        self.counters.iter().find(|counter| counter.name == name)
    }

    pub fn counter_mut(&mut self, name: &str) -> Option<&mut Counter> {
        self.counters.iter_mut().find(|counter| counter.name == name)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Repairs the id allocator for documents edited by hand.
    pub fn normalize(&mut self) {
        let highest = self.items.iter().map(|item| item.id.0).max().unwrap_or(0);
        if self.next_item_id <= highest {
            self.next_item_id = highest + 1;
        }
    }

    fn allocate_id(&mut self) -> ItemId {
        self.normalize();
        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        id
    }

    fn first_item_id() -> u64 {
        1
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
