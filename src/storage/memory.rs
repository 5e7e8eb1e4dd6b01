use crate::{
    core::errors::{LedgerError, Result},
    domain::{Counter, DiceRoll, Inventory, ItemId, ItemStack, NewItem},
};

use super::{ItemQuery, LedgerStore};

/// Keeps an [`Inventory`] in memory. Used directly for throwaway sessions and
/// as the record layer underneath [`super::JsonStore`].
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inventory: Inventory,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_inventory(Inventory::new(name))
    }

    pub fn from_inventory(mut inventory: Inventory) -> Self {
        inventory.normalize();
        Self { inventory }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn into_inventory(self) -> Inventory {
        self.inventory
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("items")
    }
}

impl LedgerStore for MemoryStore {
    fn create_item(&mut self, draft: NewItem) -> Result<ItemStack> {
        Ok(self.inventory.insert_item(draft))
    }

    fn find_items(&self, query: &ItemQuery) -> Result<Vec<ItemStack>> {
        Ok(query.select(&self.inventory.items))
    }

    fn save_item(&mut self, item: &ItemStack) -> Result<()> {
        let slot = self
            .inventory
            .item_mut(item.id)
            .ok_or_else(|| LedgerError::NotFound(format!("item #{}", item.id)))?;
        *slot = item.clone();
        self.inventory.touch();
        Ok(())
    }

    fn delete_item(&mut self, id: ItemId) -> Result<()> {
        self.inventory
            .remove_item(id)
            .map(|_| ())
            .ok_or_else(|| LedgerError::NotFound(format!("item #{}", id)))
    }

    fn counter(&self, name: &str) -> Result<Option<Counter>> {
        Ok(self.inventory.counter(name).cloned())
    }

    fn create_counter(&mut self, counter: Counter) -> Result<Counter> {
        if self.inventory.counter(&counter.name).is_some() {
            return Err(LedgerError::InvalidState(format!(
                "counter `{}` already exists",
                counter.name
            )));
        }
        self.inventory.counters.push(counter.clone());
        self.inventory.touch();
        Ok(counter)
    }

    fn save_counter(&mut self, counter: &Counter) -> Result<()> {
        let slot = self
            .inventory
            .counter_mut(&counter.name)
            .ok_or_else(|| LedgerError::NotFound(format!("counter `{}`", counter.name)))?;
        *slot = counter.clone();
        self.inventory.touch();
        Ok(())
    }

    fn record_roll(&mut self, roll: DiceRoll) -> Result<DiceRoll> {
        self.inventory.rolls.push(roll.clone());
        self.inventory.touch();
        Ok(roll)
    }

    fn rolls(&self) -> Result<Vec<DiceRoll>> {
        Ok(self.inventory.rolls.clone())
    }
}
