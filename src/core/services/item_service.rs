use tracing::{debug, warn};

use crate::{
    core::errors::LedgerError,
    domain::{ItemAttributes, ItemId, ItemStack, NewItem},
    storage::LedgerStore,
};

use super::{checked, ServiceResult};

/// What a `gain` call adds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GainTarget {
    Existing(ItemId),
    New(String),
}

/// Quantity, price and weight rules for individual item stacks.
pub struct ItemService;

impl ItemService {
    /// Records a purchase as a new held stack.
    pub fn buy<S: LedgerStore + ?Sized>(
        store: &mut S,
        name: &str,
        quantity: i64,
        price: Option<f64>,
        attributes: ItemAttributes,
    ) -> ServiceResult<ItemStack> {
        let price = price.ok_or_else(|| {
            LedgerError::Validation("items you buy must have a price (price=NUM)".into())
        })?;
        let attributes = ItemAttributes {
            price: Some(price),
            ..attributes
        };
        Self::create(store, name, quantity, true, attributes)
    }

    /// Adds items without paying for them, either onto an existing stack or
    /// as a new unbought one. Attributes supplied for an existing stack are
    /// applied to it as well.
    pub fn gain<S: LedgerStore + ?Sized>(
        store: &mut S,
        target: GainTarget,
        quantity: i64,
        attributes: ItemAttributes,
    ) -> ServiceResult<ItemStack> {
        match target {
            GainTarget::Existing(id) => {
                Self::ensure_positive(quantity, "gain")?;
                Self::validate_attributes(&attributes)?;
                let mut item = Self::get(store, id)?;
                item.quantity_consumed =
                    checked(item.quantity_consumed.checked_sub(quantity), "quantity")?;
                item.apply(&attributes);
                Self::persist(store, item)
            }
            GainTarget::New(name) => Self::create(store, &name, quantity, false, attributes),
        }
    }

    /// Without a quantity the stack is soft-dropped: it leaves the inventory
    /// but keeps counting toward lifetime spending. With a quantity the items
    /// are consumed.
    pub fn drop<S: LedgerStore + ?Sized>(
        store: &mut S,
        id: ItemId,
        quantity: Option<i64>,
    ) -> ServiceResult<String> {
        let mut item = Self::get(store, id)?;
        match quantity {
            None => {
                item.is_held = false;
                let message = format!("dropped {} {}", item.remaining_quantity(), item.name);
                Self::persist(store, item)?;
                Ok(message)
            }
            Some(quantity) => {
                Self::ensure_positive(quantity, "drop")?;
                item.quantity_consumed =
                    checked(item.quantity_consumed.checked_add(quantity), "quantity")?;
                let message = format!("dropped {} {}", quantity, item.name);
                Self::persist(store, item)?;
                Ok(message)
            }
        }
    }

    /// Inverse of a quantity drop. There is no upper bound, so a stack can end
    /// up holding more than was originally acquired.
    pub fn add<S: LedgerStore + ?Sized>(
        store: &mut S,
        id: ItemId,
        quantity: i64,
    ) -> ServiceResult<String> {
        Self::ensure_positive(quantity, "add")?;
        let mut item = Self::get(store, id)?;
        item.quantity_consumed =
            checked(item.quantity_consumed.checked_sub(quantity), "quantity")?;
        let message = format!("added {} {}", quantity, item.name);
        Self::persist(store, item)?;
        Ok(message)
    }

    /// Sets the remaining count directly, as if the difference had been
    /// picked up or used.
    pub fn set_remaining<S: LedgerStore + ?Sized>(
        store: &mut S,
        id: ItemId,
        new_quantity: i64,
    ) -> ServiceResult<String> {
        let mut item = Self::get(store, id)?;
        let delta = checked(
            item.remaining_quantity().checked_sub(new_quantity),
            "quantity",
        )?;
        item.quantity_consumed = checked(item.quantity_consumed.checked_add(delta), "quantity")?;
        let message = format!("{} now has {} remaining", item.name, new_quantity);
        Self::persist(store, item)?;
        Ok(message)
    }

    /// Undoes a purchase. Selling the whole stack deletes the record; selling
    /// part of it lowers `quantity_initial`, which also lowers lifetime
    /// spending for that stack.
    pub fn sell<S: LedgerStore + ?Sized>(
        store: &mut S,
        id: ItemId,
        quantity: Option<i64>,
    ) -> ServiceResult<String> {
        let mut item = Self::get(store, id)?;
        match quantity {
            None => {
                let message = format!("sold {} {}", item.remaining_quantity(), item.name);
                store.delete_item(item.id)?;
                debug!(item = %item.id, cost = item.total_cost(), "stack sold and removed");
                Ok(message)
            }
            Some(quantity) => {
                Self::ensure_positive(quantity, "sell")?;
                item.quantity_initial =
                    checked(item.quantity_initial.checked_sub(quantity), "quantity")?;
                let message = format!("sold {} {}", quantity, item.name);
                Self::persist(store, item)?;
                Ok(message)
            }
        }
    }

    /// Updates price, weight, notes or the magic flag.
    pub fn edit<S: LedgerStore + ?Sized>(
        store: &mut S,
        id: ItemId,
        attributes: &ItemAttributes,
    ) -> ServiceResult<ItemStack> {
        if attributes.is_empty() {
            return Err(LedgerError::Validation("nothing to change".into()));
        }
        Self::validate_attributes(attributes)?;
        let mut item = Self::get(store, id)?;
        item.apply(attributes);
        Self::persist(store, item)
    }

    pub fn get<S: LedgerStore + ?Sized>(store: &S, id: ItemId) -> ServiceResult<ItemStack> {
        store
            .item(id)?
            .ok_or_else(|| LedgerError::NotFound(format!("item #{}", id)))
    }

    fn create<S: LedgerStore + ?Sized>(
        store: &mut S,
        name: &str,
        quantity: i64,
        was_bought: bool,
        attributes: ItemAttributes,
    ) -> ServiceResult<ItemStack> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("item name cannot be empty".into()));
        }
        Self::ensure_positive(quantity, if was_bought { "buy" } else { "gain" })?;
        Self::validate_attributes(&attributes)?;
        let item = store.create_item(NewItem {
            name: name.to_string(),
            quantity,
            was_bought,
            attributes,
        })?;
        debug!(item = %item.id, name = %item.name, quantity, was_bought, "stack created");
        Ok(item)
    }

    fn persist<S: LedgerStore + ?Sized>(
        store: &mut S,
        mut item: ItemStack,
    ) -> ServiceResult<ItemStack> {
        let remaining = checked(
            item.quantity_initial.checked_sub(item.quantity_consumed),
            "quantity",
        )?;
        if remaining < 0 {
            warn!(item = %item.id, remaining, "rejected mutation leaving a negative stack");
            return Err(LedgerError::NegativeQuantity {
                name: item.name,
                remaining,
            });
        }
        item.touch();
        store.save_item(&item)?;
        debug!(item = %item.id, remaining, held = item.is_held, "stack updated");
        Ok(item)
    }

    fn ensure_positive(quantity: i64, action: &str) -> ServiceResult<()> {
        if quantity > 0 {
            Ok(())
        } else {
            Err(LedgerError::Validation(format!(
                "{} quantity must be positive (got {})",
                action, quantity
            )))
        }
    }

    fn validate_attributes(attributes: &ItemAttributes) -> ServiceResult<()> {
        for (label, value) in [("price", attributes.price), ("weight", attributes.weight)] {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(LedgerError::Validation(format!(
                        "{} must be a non-negative number (got {})",
                        label, value
                    )));
                }
            }
        }
        Ok(())
    }
}
