pub mod json_backend;
pub mod memory;

use crate::{
    core::errors::Result,
    domain::{Counter, DiceRoll, ItemId, ItemStack, NewItem},
};

pub use json_backend::{load_inventory_from_path, save_inventory_to_path, JsonStore};
pub use memory::MemoryStore;

/// Record storage consumed by the services.
///
/// Implementations hand out item identifiers, answer [`ItemQuery`] lookups and
/// persist whole records; they never enforce domain invariants.
pub trait LedgerStore: Send {
    fn create_item(&mut self, draft: NewItem) -> Result<ItemStack>;
    fn find_items(&self, query: &ItemQuery) -> Result<Vec<ItemStack>>;
    fn save_item(&mut self, item: &ItemStack) -> Result<()>;
    fn delete_item(&mut self, id: ItemId) -> Result<()>;

    fn counter(&self, name: &str) -> Result<Option<Counter>>;
    fn create_counter(&mut self, counter: Counter) -> Result<Counter>;
    fn save_counter(&mut self, counter: &Counter) -> Result<()>;

    fn record_roll(&mut self, roll: DiceRoll) -> Result<DiceRoll>;
    fn rolls(&self) -> Result<Vec<DiceRoll>>;

    fn find_first_item(&self, query: &ItemQuery) -> Result<Option<ItemStack>> {
        Ok(self.find_items(query)?.into_iter().next())
    }

    fn item(&self, id: ItemId) -> Result<Option<ItemStack>> {
        self.find_first_item(&ItemQuery::all().with_id(id))
    }
}

/// Result ordering for item lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryOrder {
    /// Ascending identifier, i.e. creation order.
    #[default]
    Id,
    /// Most recently touched first.
    UpdatedDesc,
}

/// Equality and name-pattern predicate over item stacks.
///
/// Unset fields match everything. Queries combine with [`ItemQuery::merge`],
/// where fields set on the argument win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemQuery {
    pub id: Option<ItemId>,
    pub name: Option<String>,
    pub name_like: Option<String>,
    pub held: Option<bool>,
    pub bought: Option<bool>,
    pub magic: Option<bool>,
    pub order: QueryOrder,
}

impl ItemQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn held() -> Self {
        Self {
            held: Some(true),
            ..Self::default()
        }
    }

    pub fn purchased() -> Self {
        Self {
            bought: Some(true),
            ..Self::default()
        }
    }

    pub fn name_like(pattern: impl Into<String>) -> Self {
        Self {
            name_like: Some(pattern.into()),
            order: QueryOrder::UpdatedDesc,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: ItemId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_held(mut self, held: bool) -> Self {
        self.held = Some(held);
        self
    }

    pub fn with_bought(mut self, bought: bool) -> Self {
        self.bought = Some(bought);
        self
    }

    pub fn with_magic(mut self, magic: bool) -> Self {
        self.magic = Some(magic);
        self
    }

    pub fn ordered(mut self, order: QueryOrder) -> Self {
        self.order = order;
        self
    }

    pub fn merge(self, other: &ItemQuery) -> Self {
        Self {
            id: other.id.or(self.id),
            name: other.name.clone().or(self.name),
            name_like: other.name_like.clone().or(self.name_like),
            held: other.held.or(self.held),
            bought: other.bought.or(self.bought),
            magic: other.magic.or(self.magic),
            order: if other.order == QueryOrder::default() {
                self.order
            } else {
                other.order
            },
        }
    }

    pub fn matches(&self, item: &ItemStack) -> bool {
        self.id.map_or(true, |id| item.id == id)
            && self.name.as_deref().map_or(true, |name| item.name == name)
            && self
                .name_like
                .as_deref()
                .map_or(true, |pattern| name_matches(pattern, &item.name))
            && self.held.map_or(true, |held| item.is_held == held)
            && self.bought.map_or(true, |bought| item.was_bought == bought)
            && self.magic.map_or(true, |magic| item.is_magic == magic)
    }

    /// Filters and orders `items` according to this query.
    pub fn select<'a>(&self, items: impl IntoIterator<Item = &'a ItemStack>) -> Vec<ItemStack> {
        let mut selected: Vec<ItemStack> = items
            .into_iter()
            .filter(|item| self.matches(item))
            .cloned()
            .collect();
        match self.order {
            QueryOrder::Id => selected.sort_by_key(|item| item.id),
            QueryOrder::UpdatedDesc => selected.sort_by(|a, b| {
                b.updated_at
                    .cmp(&a.updated_at)
                    .then_with(|| b.id.cmp(&a.id))
            }),
        }
        selected
    }
}

/// Case-sensitive name match. Patterns containing `%` or `_` follow SQL
/// `LIKE` rules; anything else matches as a substring.
pub fn name_matches(pattern: &str, name: &str) -> bool {
    if !pattern.contains(['%', '_']) {
        return name.contains(pattern);
    }
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = name.chars().collect();
    like(&pattern, &text)
}

fn like(pattern: &[char], text: &[char]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while t < text.len() {
        if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if let Some((star, resume)) = backtrack {
            p = star + 1;
            t = resume + 1;
            backtrack = Some((star, resume + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|&c| c == '%')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_patterns_match_substrings_case_sensitively() {
        assert!(name_matches("Potion", "Potion of Healing"));
        assert!(name_matches("Healing", "Potion of Healing"));
        assert!(!name_matches("potion", "Potion of Healing"));
    }

    #[test]
    fn like_wildcards_anchor_the_match() {
        assert!(name_matches("Potion%", "Potion of Healing"));
        assert!(!name_matches("Healing%", "Potion of Healing"));
        assert!(name_matches("%Healing", "Potion of Healing"));
        assert!(name_matches("R_pe", "Rope"));
        assert!(!name_matches("R_pe", "Ropes"));
        assert!(name_matches("%o%o%", "Potion"));
        assert!(name_matches("%", ""));
    }

    #[test]
    fn merge_prefers_fields_from_the_argument() {
        let base = ItemQuery::held();
        let merged = base.merge(&ItemQuery::all().with_held(false).with_magic(true));
        assert_eq!(merged.held, Some(false));
        assert_eq!(merged.magic, Some(true));

        let merged = ItemQuery::name_like("Rope").merge(&ItemQuery::held());
        assert_eq!(merged.order, QueryOrder::UpdatedDesc);
        assert_eq!(merged.held, Some(true));
    }
}
