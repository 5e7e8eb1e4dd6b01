use colored::Colorize;

use crate::{
    cli::output::current_preferences,
    core::services::{InventoryService, ItemRow, StatusTag},
    domain::ItemStack,
};

use super::table_renderer::{Alignment, Table, TableColumn};

pub const HEADINGS: [&str; 6] = [
    "ID",
    "Quantity",
    "Item",
    "Value/Total",
    "Weight/Total",
    "Status",
];

const ITEM_COLUMN_WIDTH: usize = 40;

pub fn item_table(items: &[ItemStack]) -> Table {
    let mut table = Table::new(vec![
        TableColumn::new(HEADINGS[0], Alignment::Right),
        TableColumn::new(HEADINGS[1], Alignment::Right),
        TableColumn::new(HEADINGS[2], Alignment::Left).with_max_width(ITEM_COLUMN_WIDTH),
        TableColumn::new(HEADINGS[3], Alignment::Right),
        TableColumn::new(HEADINGS[4], Alignment::Right),
        TableColumn::new(HEADINGS[5], Alignment::Left),
    ]);
    for row in InventoryService::rows(items) {
        table.push_row(row_cells(&row));
    }
    table
}

pub fn render_items(items: &[ItemStack]) -> String {
    item_table(items).render()
}

fn row_cells(row: &ItemRow) -> Vec<String> {
    let plain = current_preferences().plain_mode();
    let id = row.id.to_string();
    let quantity = row.remaining.to_string();
    let status: Vec<String> = row
        .status
        .iter()
        .map(|tag| styled_tag(*tag, plain))
        .collect();
    vec![
        if plain { id } else { id.blue().to_string() },
        if plain {
            quantity
        } else {
            quantity.bright_blue().to_string()
        },
        row.description.clone(),
        row.price_display.clone(),
        row.weight_display.clone(),
        status.join("\n"),
    ]
}

fn styled_tag(tag: StatusTag, plain: bool) -> String {
    let label = tag.label();
    if plain {
        return label.to_string();
    }
    match tag {
        StatusTag::Purchased => label.red().to_string(),
        StatusTag::Magical => label.on_blue().to_string(),
        StatusTag::Dropped => label.white().on_red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemAttributes, ItemId, NewItem};

    #[test]
    fn table_has_item_headings_and_one_row_per_stack() {
        let mut stack = ItemStack::from_draft(
            ItemId(4),
            NewItem {
                name: "Potion of Healing".into(),
                quantity: 2,
                was_bought: true,
                attributes: ItemAttributes::default().with_price(50.0).magical(),
            },
        );
        stack.is_held = false;
        let table = item_table(&[stack]);
        assert_eq!(table.columns.len(), HEADINGS.len());
        assert_eq!(table.rows.len(), 1);
        let text = table.render();
        assert!(text.contains("Weight/Total"));
        assert!(text.contains("Potion of Healing"));
        assert!(text.contains("Was Dropped"));
        assert!(text.contains("$100"));
    }
}
