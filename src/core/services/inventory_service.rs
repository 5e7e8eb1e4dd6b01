use crate::{
    domain::{ItemId, ItemStack},
    storage::{ItemQuery, LedgerStore},
};

use super::ServiceResult;

/// Status flags shown next to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTag {
    Purchased,
    Magical,
    Dropped,
}

impl StatusTag {
    pub fn label(&self) -> &'static str {
        match self {
            StatusTag::Purchased => "Purchased",
            StatusTag::Magical => "Magical",
            StatusTag::Dropped => "Was Dropped",
        }
    }
}

/// Plain row handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRow {
    pub id: ItemId,
    pub remaining: i64,
    pub description: String,
    pub price_display: String,
    pub weight_display: String,
    pub status: Vec<StatusTag>,
}

impl From<&ItemStack> for ItemRow {
    fn from(item: &ItemStack) -> Self {
        let remaining = item.remaining_quantity();
        let mut description = item.name.clone();
        if let Some(notes) = item.notes.as_deref() {
            description.push('\n');
            description.push_str(notes);
        }

        let (price_display, weight_display) = if remaining > 1 {
            (
                format!(
                    "${}\n${}",
                    format_amount(item.unit_price),
                    format_amount(item.unit_price * remaining as f64)
                ),
                format!(
                    "{}lbs\n{}lbs",
                    format_amount(item.unit_weight),
                    format_amount(item.total_weight())
                ),
            )
        } else {
            (
                format!("${}", format_amount(item.unit_price)),
                format!("{}lbs", format_amount(item.unit_weight)),
            )
        };

        let mut status = Vec::new();
        if item.was_bought {
            status.push(StatusTag::Purchased);
        }
        if item.is_magic {
            status.push(StatusTag::Magical);
        }
        if !item.is_held {
            status.push(StatusTag::Dropped);
        }

        Self {
            id: item.id,
            remaining,
            description,
            price_display,
            weight_display,
            status,
        }
    }
}

/// Cross-stack sums and listings.
pub struct InventoryService;

impl InventoryService {
    /// Weight carried: unit weight times remaining count over held stacks.
    pub fn total_weight<S: LedgerStore + ?Sized>(
        store: &S,
        filter: &ItemQuery,
    ) -> ServiceResult<f64> {
        let items = store.find_items(&ItemQuery::held().merge(filter))?;
        Ok(items.iter().map(ItemStack::total_weight).sum())
    }

    /// Gold committed to purchases: unit price times the initial count of
    /// every bought stack, whether or not it is still held.
    pub fn total_spent<S: LedgerStore + ?Sized>(
        store: &S,
        filter: &ItemQuery,
    ) -> ServiceResult<f64> {
        let items = store.find_items(&ItemQuery::purchased().merge(filter))?;
        Ok(items.iter().map(ItemStack::total_cost).sum())
    }

    pub fn list_held<S: LedgerStore + ?Sized>(
        store: &S,
        filter: &ItemQuery,
    ) -> ServiceResult<Vec<ItemStack>> {
        store.find_items(&ItemQuery::held().merge(filter))
    }

    pub fn list_purchased<S: LedgerStore + ?Sized>(
        store: &S,
        filter: &ItemQuery,
    ) -> ServiceResult<Vec<ItemStack>> {
        store.find_items(&ItemQuery::purchased().merge(filter))
    }

    pub fn list_all<S: LedgerStore + ?Sized>(store: &S) -> ServiceResult<Vec<ItemStack>> {
        store.find_items(&ItemQuery::all())
    }

    /// Stacks whose name matches `pattern`, most recently touched first.
    pub fn find_by_name<S: LedgerStore + ?Sized>(
        store: &S,
        pattern: &str,
    ) -> ServiceResult<Vec<ItemStack>> {
        store.find_items(&ItemQuery::name_like(pattern))
    }

    pub fn rows(items: &[ItemStack]) -> Vec<ItemRow> {
        items.iter().map(ItemRow::from).collect()
    }
}

/// Formats gold and weight amounts without trailing zeros.
pub fn format_amount(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        let text = format!("{:.2}", rounded);
        text.trim_end_matches('0').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::{GainTarget, ItemService};
    use crate::domain::ItemAttributes;
    use crate::storage::MemoryStore;

    fn stocked_store() -> MemoryStore {
        let mut store = MemoryStore::default();
        ItemService::buy(
            &mut store,
            "Rope",
            2,
            Some(1.0),
            ItemAttributes::default().with_weight(10.0),
        )
        .unwrap();
        ItemService::buy(
            &mut store,
            "Potion of Healing",
            3,
            Some(50.0),
            ItemAttributes::default().with_weight(0.5).magical(),
        )
        .unwrap();
        ItemService::gain(
            &mut store,
            GainTarget::New("Goblin Ear".into()),
            4,
            ItemAttributes::default().with_weight(0.1),
        )
        .unwrap();
        store
    }

    #[test]
    fn weight_counts_remaining_held_items() {
        let mut store = stocked_store();
        let total = InventoryService::total_weight(&store, &ItemQuery::all()).unwrap();
        assert!((total - 21.9).abs() < 1e-9);

        ItemService::drop(&mut store, ItemId(1), None).unwrap();
        let total = InventoryService::total_weight(&store, &ItemQuery::all()).unwrap();
        assert!((total - 1.9).abs() < 1e-9);

        let magic_only =
            InventoryService::total_weight(&store, &ItemQuery::all().with_magic(true)).unwrap();
        assert!((magic_only - 1.5).abs() < 1e-9);
    }

    #[test]
    fn spent_ignores_consumption_and_soft_drops() {
        let mut store = stocked_store();
        let before = InventoryService::total_spent(&store, &ItemQuery::all()).unwrap();
        assert_eq!(before, 152.0);

        ItemService::drop(&mut store, ItemId(2), Some(3)).unwrap();
        ItemService::drop(&mut store, ItemId(1), None).unwrap();
        let after = InventoryService::total_spent(&store, &ItemQuery::all()).unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn partial_sell_reduces_spent() {
        let mut store = stocked_store();
        ItemService::sell(&mut store, ItemId(2), Some(1)).unwrap();
        let spent = InventoryService::total_spent(&store, &ItemQuery::all()).unwrap();
        assert_eq!(spent, 102.0);
    }

    #[test]
    fn full_sell_removes_from_listings() {
        let mut store = stocked_store();
        ItemService::sell(&mut store, ItemId(1), None).unwrap();
        let held = InventoryService::list_held(&store, &ItemQuery::all()).unwrap();
        let bought = InventoryService::list_purchased(&store, &ItemQuery::all()).unwrap();
        assert!(held.iter().all(|item| item.id != ItemId(1)));
        assert!(bought.iter().all(|item| item.id != ItemId(1)));
        assert_eq!(bought.len(), 1);
    }

    #[test]
    fn find_by_name_orders_by_last_update() {
        let mut store = MemoryStore::default();
        let first = ItemService::buy(&mut store, "Arrow", 20, Some(0.05), ItemAttributes::default())
            .unwrap();
        let second = ItemService::buy(
            &mut store,
            "Arrow, cold iron",
            5,
            Some(0.1),
            ItemAttributes::default(),
        )
        .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        ItemService::drop(&mut store, first.id, Some(1)).unwrap();

        let found = InventoryService::find_by_name(&store, "Arrow").unwrap();
        let ids: Vec<ItemId> = found.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert!(InventoryService::find_by_name(&store, "arrow").unwrap().is_empty());
    }

    #[test]
    fn rows_show_totals_for_stacks() {
        let store = stocked_store();
        let items = InventoryService::list_all(&store).unwrap();
        let rows = InventoryService::rows(&items);
        assert_eq!(rows[0].price_display, "$1\n$2");
        assert_eq!(rows[0].weight_display, "10lbs\n20lbs");
        assert_eq!(rows[1].status, vec![StatusTag::Purchased, StatusTag::Magical]);
        assert_eq!(rows[2].status, Vec::<StatusTag>::new());
    }

    #[test]
    fn single_items_show_unit_values_only() {
        let mut store = MemoryStore::default();
        let item = ItemService::buy(
            &mut store,
            "Lantern",
            1,
            Some(7.5),
            ItemAttributes::default().with_weight(2.0).with_notes("hooded"),
        )
        .unwrap();
        let row = ItemRow::from(&item);
        assert_eq!(row.description, "Lantern\nhooded");
        assert_eq!(row.price_display, "$7.5");
        assert_eq!(row.weight_display, "2lbs");
    }

    #[test]
    fn format_amount_trims_zeros() {
        assert_eq!(format_amount(3.0), "3");
        assert_eq!(format_amount(0.5), "0.5");
        assert_eq!(format_amount(0.05), "0.05");
        assert_eq!(format_amount(1.0 / 3.0), "0.33");
    }
}
