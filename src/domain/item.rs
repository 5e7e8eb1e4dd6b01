use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::*;

/// Store-assigned serial identifier for an item stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One acquired batch of a named item.
///
/// Quantities are tracked as an initial amount plus a consumed counter so a
/// stack keeps its purchase history after it has been used up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemStack {
    pub id: ItemId,
    pub name: String,
    pub quantity_initial: i64,
    #[serde(default)]
    pub quantity_consumed: i64,
    #[serde(default)]
    pub unit_weight: f64,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub was_bought: bool,
    #[serde(default = "ItemStack::default_held")]
    pub is_held: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_magic: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ItemStack {
    /// Materializes a draft under the identifier handed out by the store.
    pub fn from_draft(id: ItemId, draft: NewItem) -> Self {
        let now = Utc::now();
        let attrs = draft.attributes;
        Self {
            id,
            name: draft.name,
            quantity_initial: draft.quantity,
            quantity_consumed: 0,
            unit_weight: attrs.weight.unwrap_or(0.0),
            unit_price: attrs.price.unwrap_or(0.0),
            was_bought: draft.was_bought,
            is_held: true,
            notes: attrs.notes,
            is_magic: attrs.magic.unwrap_or(false),
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of items left in the stack.
    /// Saturates for hand-edited documents; services reject values that
    /// would not fit.
    pub fn remaining_quantity(&self) -> i64 {
        self.quantity_initial.saturating_sub(self.quantity_consumed)
    }

    pub fn total_weight(&self) -> f64 {
        self.unit_weight * self.remaining_quantity() as f64
    }

    /// Gold committed to this stack. Uses the initial quantity, so consuming
    /// or dropping items never refunds their price.
    pub fn total_cost(&self) -> f64 {
        self.unit_price * self.quantity_initial as f64
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Copies any attribute that was explicitly supplied onto the stack.
    pub fn apply(&mut self, attrs: &ItemAttributes) {
        if let Some(price) = attrs.price {
            self.unit_price = price;
        }
        if let Some(weight) = attrs.weight {
            self.unit_weight = weight;
        }
        if let Some(notes) = attrs.notes.as_ref() {
            self.notes = if notes.trim().is_empty() {
                None
            } else {
                Some(notes.clone())
            };
        }
        if let Some(magic) = attrs.magic {
            self.is_magic = magic;
        }
    }

    fn default_held() -> bool {
        true
    }
}

impl Identifiable for ItemStack {
    type Id = ItemId;

    fn id(&self) -> ItemId {
        self.id
    }
}

impl NamedEntity for ItemStack {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for ItemStack {
    fn display_label(&self) -> String {
        format!("#{} {} x{}", self.id, self.name, self.remaining_quantity())
    }
}

/// Optional extra attributes accepted by buy/gain/edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemAttributes {
    pub price: Option<f64>,
    pub weight: Option<f64>,
    pub notes: Option<String>,
    pub magic: Option<bool>,
}

impl ItemAttributes {
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn magical(mut self) -> Self {
        self.magic = Some(true);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A stack that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub quantity: i64,
    pub was_bought: bool,
    pub attributes: ItemAttributes,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(initial: i64, consumed: i64) -> ItemStack {
        let draft = NewItem {
            name: "Torch".into(),
            quantity: initial,
            was_bought: true,
            attributes: ItemAttributes::default().with_price(0.01).with_weight(1.0),
        };
        let mut item = ItemStack::from_draft(ItemId(1), draft);
        item.quantity_consumed = consumed;
        item
    }

    #[test]
    fn totals_use_remaining_for_weight_and_initial_for_cost() {
        let item = stack(10, 4);
        assert_eq!(item.remaining_quantity(), 6);
        assert_eq!(item.total_weight(), 6.0);
        assert!((item.total_cost() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn apply_clears_blank_notes() {
        let mut item = stack(1, 0);
        item.apply(&ItemAttributes::default().with_notes("smoky"));
        assert_eq!(item.notes.as_deref(), Some("smoky"));
        item.apply(&ItemAttributes::default().with_notes(" "));
        assert_eq!(item.notes, None);
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{
            "id": 7,
            "name": "Rope",
            "quantity_initial": 1,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let item: ItemStack = serde_json::from_str(json).expect("item json");
        assert_eq!(item.id, ItemId(7));
        assert!(item.is_held);
        assert!(!item.was_bought);
        assert_eq!(item.quantity_consumed, 0);
    }
}
